//! Console output formatter for deliberation results

use colored::Colorize;
use conclave_domain::DeliberationResult;

/// Formats deliberation results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Score table plus the full justification
    pub fn format(result: &DeliberationResult) -> String {
        let mut output = Self::format_scores_only(result);

        output.push_str(&format!("\n{}\n", "Justification:".cyan().bold()));
        output.push_str(&format!("{}\n", result.justification));

        output
    }

    /// Score table only
    pub fn format_scores_only(result: &DeliberationResult) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", "Verdict".cyan().bold()));

        let top = result.top_outcome().map(|score| score.outcome.clone());
        let label_width = result
            .scores
            .iter()
            .map(|score| score.outcome.len())
            .max()
            .unwrap_or(0);

        for score in &result.scores {
            let percent = score.score as f64 / 10_000.0;
            let line = format!(
                "  {:<label_width$}  {:>7}  {:>6.2}%",
                score.outcome, score.score, percent
            );
            if top.as_deref() == Some(score.outcome.as_str()) {
                output.push_str(&format!("{}\n", line.green().bold()));
            } else {
                output.push_str(&format!("{}\n", line));
            }
        }

        output
    }

    /// JSON output
    pub fn format_json(result: &DeliberationResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }
}
