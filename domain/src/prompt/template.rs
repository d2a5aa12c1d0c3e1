//! Prompt templates for the deliberation flow

use crate::deliberation::request::Outcomes;

/// Templates for generating prompts at each stage
///
/// Pure string functions — the controller concatenates their output with
/// the caller's prompt; nothing here performs I/O or holds state.
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for voting rounds
    pub fn voting_system() -> &'static str {
        r#"You are one voice on a panel of independent models deliberating a single question.
Your task is to score the possible outcomes and justify your distribution.
Be precise and honest about your uncertainty; do not overstate confidence.
Always answer in the exact machine-readable format you are instructed to use."#
    }

    /// Instructions rendered ahead of the caller's prompt.
    ///
    /// Spells out the fixed-point wire contract so any model family can
    /// comply with integers only.
    pub fn render_initial(outcomes: Option<&Outcomes>) -> String {
        let outcome_block = match outcomes {
            Some(outcomes) => {
                let mut block = String::from("Score the following outcomes, in this exact order:\n");
                for (i, label) in outcomes.labels().iter().enumerate() {
                    block.push_str(&format!("{}. {}\n", i + 1, label));
                }
                block
            }
            None => String::from(
                "Score the possible outcomes positionally (outcome1, outcome2, ...), \
                 keeping the same order in every answer.\n",
            ),
        };

        format!(
            r#"{outcome_block}
Reply with a single JSON object of the form:
{{"score": [<integer per outcome>], "justification": "<your reasoning>"}}

The score entries are non-negative integers in parts per million and must
sum to exactly 1000000. Do not use fractions or percentages.

Question:
"#
        )
    }

    /// Feedback block appended to the prompt in rounds after the first.
    ///
    /// `previous_summaries` is the newline-joined peer summary digest from
    /// the round just completed.
    pub fn render_feedback(previous_summaries: &str) -> String {
        format!(
            r#"

In the previous round the panel voted as follows:
{previous_summaries}

Consider your peers' reasoning. You may revise your distribution or keep it;
either way, answer again in the same JSON format."#
        )
    }

    /// System prompt for the final justification call
    pub fn synthesis_system() -> &'static str {
        r#"You are the designated rapporteur for a panel of independent models.
The panel has finished voting; the weighted result is fixed and not yours to change.
Your task is to write the single justification that best explains the panel's
combined verdict, drawing on the individual justifications you are given.
Be balanced, concrete, and concise."#
    }

    /// User prompt for the final justification call
    pub fn synthesis_prompt(composite: &str, justifications: &[String]) -> String {
        let mut prompt = format!(
            r#"The panel's combined decision vector (parts per million, in outcome order) is:
{composite}

Individual justifications from the final round:
"#
        );

        for (i, justification) in justifications.iter().enumerate() {
            prompt.push_str(&format!("\n--- Justification {} ---\n{}\n", i + 1, justification));
        }

        prompt.push_str(
            r#"
Write one coherent justification for the combined verdict above. Explain what
the panel agreed on, where it split, and why the leading outcome prevailed.
Reply with plain text only."#,
        );

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_lists_named_outcomes_in_order() {
        let outcomes =
            Outcomes::new(vec!["approve".to_string(), "reject".to_string()]).unwrap();
        let rendered = PromptTemplate::render_initial(Some(&outcomes));

        let approve_at = rendered.find("1. approve").unwrap();
        let reject_at = rendered.find("2. reject").unwrap();
        assert!(approve_at < reject_at);
        assert!(rendered.contains("1000000"));
    }

    #[test]
    fn test_initial_positional_when_unnamed() {
        let rendered = PromptTemplate::render_initial(None);
        assert!(rendered.contains("outcome1"));
        assert!(rendered.contains(r#""score""#));
    }

    #[test]
    fn test_feedback_embeds_summaries() {
        let rendered = PromptTemplate::render_feedback(
            "From openai/gpt-4o: vector=[1000000], justification=sure",
        );
        assert!(rendered.contains("openai/gpt-4o"));
        assert!(rendered.contains("previous round"));
    }

    #[test]
    fn test_synthesis_prompt_contains_vector_and_justifications() {
        let prompt = PromptTemplate::synthesis_prompt(
            "[355000, 645000]",
            &["model A reasoning".to_string(), "model B reasoning".to_string()],
        );
        assert!(prompt.contains("[355000, 645000]"));
        assert!(prompt.contains("model A reasoning"));
        assert!(prompt.contains("model B reasoning"));
        assert!(prompt.contains("--- Justification 2 ---"));
    }
}
