//! Progress notification port
//!
//! Defines the interface for reporting progress during deliberation.

/// Callback for progress updates during a deliberation
///
/// Implementations live in the presentation layer and can display progress
/// in various ways (console, progress bars, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a round starts; `total_votes` counts every sample of
    /// every model in the round.
    fn on_round_start(&self, round: u32, total_votes: usize);

    /// Called when one sample invocation resolves.
    fn on_vote_received(&self, round: u32, model: &str, success: bool);

    /// Called when a round's composite has been aggregated.
    fn on_round_complete(&self, round: u32);

    /// Called when the final justification call starts.
    fn on_synthesis_start(&self, _model: &str) {}

    /// Called when the final justification call completes.
    fn on_synthesis_complete(&self) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_round_start(&self, _round: u32, _total_votes: usize) {}
    fn on_vote_received(&self, _round: u32, _model: &str, _success: bool) {}
    fn on_round_complete(&self, _round: u32) {}
}
