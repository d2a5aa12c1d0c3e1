//! Port for structured interaction logging.
//!
//! Separate from `tracing`-based operation logs: tracing carries
//! human-readable diagnostics, while this port captures what was asked and
//! answered in a machine-readable form (JSONL in the default adapter).
//!
//! The engine notifies the logger but never depends on it — `log` is
//! synchronous and non-fallible, and a missing or failing logger cannot
//! disturb a deliberation.

use serde_json::Value;

/// A structured interaction event for logging.
pub struct InteractionEvent {
    /// Event type identifier (e.g. "deliberation_started", "vote_received").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl InteractionEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for recording interaction events.
pub trait InteractionLogger: Send + Sync {
    fn log(&self, event: InteractionEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoInteractionLog;

impl InteractionLogger for NoInteractionLog {
    fn log(&self, _event: InteractionEvent) {}
}
