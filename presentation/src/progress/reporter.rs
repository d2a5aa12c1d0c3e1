//! Progress reporting for deliberation execution

use colored::Colorize;
use conclave_application::ProgressNotifier;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during a deliberation with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    round_bar: Mutex<Option<ProgressBar>>,
    synthesis_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            round_bar: Mutex::new(None),
            synthesis_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap()
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_round_start(&self, round: u32, total_votes: usize) {
        let pb = self.multi.add(ProgressBar::new(total_votes as u64));
        pb.set_style(Self::round_style());
        pb.set_prefix(format!("Round {}", round + 1));
        pb.set_message("Collecting votes...");

        *self.round_bar.lock().unwrap() = Some(pb);
    }

    fn on_vote_received(&self, _round: u32, model: &str, success: bool) {
        if let Some(pb) = self.round_bar.lock().unwrap().as_ref() {
            let status = if success {
                format!("{} {}", "v".green(), model)
            } else {
                format!("{} {}", "x".red(), model)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_round_complete(&self, round: u32) {
        if let Some(pb) = self.round_bar.lock().unwrap().take() {
            pb.finish_with_message(format!("{}", format!("Round {} complete", round + 1).green()));
        }
    }

    fn on_synthesis_start(&self, model: &str) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix("Synthesis");
        pb.set_message(format!("Asking {model} for the final justification..."));

        *self.synthesis_bar.lock().unwrap() = Some(pb);
    }

    fn on_synthesis_complete(&self) {
        if let Some(pb) = self.synthesis_bar.lock().unwrap().take() {
            pb.finish_with_message(format!("{}", "Justification ready".green()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_round_start(&self, round: u32, total_votes: usize) {
        println!("Round {} started ({} votes to collect)", round + 1, total_votes);
    }

    fn on_vote_received(&self, _round: u32, model: &str, success: bool) {
        if success {
            println!("  [OK]   {}", model);
        } else {
            println!("  [FAIL] {}", model);
        }
    }

    fn on_round_complete(&self, round: u32) {
        println!("Round {} complete", round + 1);
    }

    fn on_synthesis_start(&self, model: &str) {
        println!("Synthesizing justification via {}", model);
    }

    fn on_synthesis_complete(&self) {
        println!("Justification ready");
    }
}
