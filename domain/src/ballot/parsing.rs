//! Vote response parsing
//!
//! Models differ wildly in how they wrap structured output in prose, so
//! [`parse_vote`] runs an ordered chain of extraction strategies and takes
//! the first structural hit. These functions are pure domain logic — no I/O,
//! no session management, just text pattern matching.
//!
//! # Strategies
//!
//! | Order | Strategy | Accepts |
//! |-------|-----------------------|------------------------------------------|
//! | 1 | [`extract_direct`] | whole trimmed text is the JSON object |
//! | 2 | [`extract_fenced`] | first fenced code block holds the object |
//! | 3 | [`extract_embedded`] | any balanced `{...}` substring, in order |
//! | 4 | [`extract_tagged`] | legacy `SCORE:` / `JUSTIFICATION:` tags |
//!
//! A structural hit is an object with a numeric-array `score` and a string
//! `justification`. Vector validation (arity, sum) happens once, after
//! strategy selection — a structurally sound vote with an invalid vector is
//! a hard parse failure, never a fall-through to later strategies, and never
//! a "close enough" renormalization.

use super::vector::{DecisionVector, VectorError};
use super::vote::Vote;
use thiserror::Error;

/// Failure to reduce a raw model response to a valid vote
///
/// Carries the raw response text so the caller can report exactly what the
/// model produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("No vote found in model response")]
    NoVote { raw: String },

    #[error("Vote has an invalid decision vector: {source}")]
    InvalidVector {
        raw: String,
        #[source]
        source: VectorError,
    },
}

impl ParseError {
    /// The raw response text that failed to parse.
    pub fn raw_response(&self) -> &str {
        match self {
            ParseError::NoVote { raw } | ParseError::InvalidVector { raw, .. } => raw,
        }
    }
}

/// A structural hit before vector validation.
struct RawVote {
    scores: Vec<u64>,
    justification: String,
}

/// Parse one raw model response into a canonical [`Vote`].
///
/// `expected_len` pins the vector arity when the outcome set is named;
/// pass `None` to accept any arity (positional outcomes).
pub fn parse_vote(raw: &str, expected_len: Option<usize>) -> Result<Vote, ParseError> {
    const STRATEGIES: &[fn(&str) -> Option<RawVote>] = &[
        extract_direct,
        extract_fenced,
        extract_embedded,
        extract_tagged,
    ];

    let Some(candidate) = STRATEGIES.iter().find_map(|strategy| strategy(raw)) else {
        return Err(ParseError::NoVote {
            raw: raw.to_string(),
        });
    };

    let scores = match expected_len {
        Some(expected) => DecisionVector::with_len(candidate.scores, expected),
        None => DecisionVector::new(candidate.scores),
    }
    .map_err(|source| ParseError::InvalidVector {
        raw: raw.to_string(),
        source,
    })?;

    Ok(Vote::new(scores, candidate.justification))
}

/// Strategy 1: the whole trimmed text is the JSON object.
fn extract_direct(text: &str) -> Option<RawVote> {
    vote_from_json(text.trim())
}

/// Strategy 2: the first fenced code block contains the JSON object.
fn extract_fenced(text: &str) -> Option<RawVote> {
    let start = text.find("```")?;
    let rest = &text[start + 3..];
    let end = rest.find("```")?;
    let block = &rest[..end];

    // Drop the info string ("json", "JSON", ...) if the block has one
    let content = match block.find('\n') {
        Some(i) if !block[..i].trim_start().starts_with('{') => &block[i + 1..],
        _ => block,
    };

    vote_from_json(content.trim())
}

/// Strategy 3: every balanced `{...}` substring, attempted in order.
fn extract_embedded(text: &str) -> Option<RawVote> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(len) = balanced_object_len(&text[start..])
            && let Some(vote) = vote_from_json(&text[start..start + len])
        {
            return Some(vote);
        }
        search_from = start + 1;
    }
    None
}

/// Strategy 4: legacy tagged format.
///
/// `SCORE:` is followed by a comma-separated integer list on the same line;
/// `JUSTIFICATION:` runs to end-of-string or the next `SCORE:`. Both tags
/// match case-insensitively.
fn extract_tagged(text: &str) -> Option<RawVote> {
    let score_at = find_ignore_case(text, "SCORE:")?;
    let after_scores = &text[score_at + "SCORE:".len()..];
    let line = &after_scores[..after_scores.find('\n').unwrap_or(after_scores.len())];

    let scores = line
        .split(',')
        .map(|entry| entry.trim().parse::<u64>().ok())
        .collect::<Option<Vec<u64>>>()?;
    if scores.is_empty() {
        return None;
    }

    let just_at = find_ignore_case(text, "JUSTIFICATION:")?;
    let after_just = &text[just_at + "JUSTIFICATION:".len()..];
    let end = find_ignore_case(after_just, "SCORE:").unwrap_or(after_just.len());
    let justification = after_just[..end].trim().to_string();

    Some(RawVote {
        scores,
        justification,
    })
}

/// Parse `candidate` as a JSON object with a numeric-array `score` and a
/// string `justification`. Non-integer score entries are a structural miss.
fn vote_from_json(candidate: &str) -> Option<RawVote> {
    let value: serde_json::Value = serde_json::from_str(candidate).ok()?;
    let object = value.as_object()?;

    let scores = object
        .get("score")?
        .as_array()?
        .iter()
        .map(|entry| entry.as_u64())
        .collect::<Option<Vec<u64>>>()?;
    let justification = object.get("justification")?.as_str()?.to_string();

    Some(RawVote {
        scores,
        justification,
    })
}

/// Byte length of the balanced object starting at the leading `{`.
///
/// Tracks JSON string context so braces inside justification text don't
/// unbalance the scan.
fn balanced_object_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// ASCII case-insensitive substring search returning a byte offset.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_vote() -> Vote {
        Vote::new(
            DecisionVector::new(vec![700_000, 300_000]).unwrap(),
            "x",
        )
    }

    // ==================== Strategy Tests ====================

    #[test]
    fn test_parse_direct_json() {
        let raw = r#"{"score":[700000,300000],"justification":"x"}"#;
        assert_eq!(parse_vote(raw, Some(2)).unwrap(), expected_vote());
    }

    #[test]
    fn test_parse_fenced_block() {
        let raw = "Here is my vote:\n```json\n{\"score\":[700000,300000],\"justification\":\"x\"}\n```\nThanks!";
        assert_eq!(parse_vote(raw, Some(2)).unwrap(), expected_vote());
    }

    #[test]
    fn test_parse_fenced_block_without_language_tag() {
        let raw = "```\n{\"score\":[700000,300000],\"justification\":\"x\"}\n```";
        assert_eq!(parse_vote(raw, Some(2)).unwrap(), expected_vote());
    }

    #[test]
    fn test_parse_embedded_object() {
        let raw = "After weighing both options {not json} I conclude \
                   {\"score\":[700000,300000],\"justification\":\"x\"} as shown.";
        assert_eq!(parse_vote(raw, Some(2)).unwrap(), expected_vote());
    }

    #[test]
    fn test_embedded_object_with_braces_in_justification() {
        let raw = r#"Verdict: {"score":[1000000],"justification":"uses {braces} inside"}"#;
        let vote = parse_vote(raw, Some(1)).unwrap();
        assert_eq!(vote.justification, "uses {braces} inside");
    }

    #[test]
    fn test_parse_legacy_tagged() {
        let raw = "SCORE: 700000,300000\nJUSTIFICATION: x";
        assert_eq!(parse_vote(raw, Some(2)).unwrap(), expected_vote());
    }

    #[test]
    fn test_legacy_tags_case_insensitive() {
        let raw = "score: 700000, 300000\njustification: x";
        assert_eq!(parse_vote(raw, Some(2)).unwrap(), expected_vote());
    }

    #[test]
    fn test_legacy_justification_stops_at_next_score_tag() {
        let raw = "SCORE: 600000,400000\nJUSTIFICATION: first reasoning\nSCORE: 1,2";
        let vote = parse_vote(raw, Some(2)).unwrap();
        assert_eq!(vote.justification, "first reasoning");
        assert_eq!(vote.scores.components(), &[600_000, 400_000]);
    }

    #[test]
    fn test_all_formats_parse_identically() {
        let formats = [
            r#"{"score":[700000,300000],"justification":"x"}"#.to_string(),
            "```json\n{\"score\":[700000,300000],\"justification\":\"x\"}\n```".to_string(),
            "SCORE: 700000,300000\nJUSTIFICATION: x".to_string(),
        ];
        for raw in &formats {
            assert_eq!(parse_vote(raw, Some(2)).unwrap(), expected_vote(), "format: {raw}");
        }
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_sum_violation_is_hard_failure() {
        let raw = r#"{"score":[700000,200000],"justification":"x"}"#;
        let err = parse_vote(raw, Some(2)).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidVector {
                source: VectorError::SumMismatch { sum: 900_000 },
                ..
            }
        ));
        assert_eq!(err.raw_response(), raw);
    }

    #[test]
    fn test_arity_mismatch_rejected() {
        let raw = r#"{"score":[500000,300000,200000],"justification":"x"}"#;
        let err = parse_vote(raw, Some(2)).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidVector {
                source: VectorError::LengthMismatch {
                    expected: 2,
                    actual: 3
                },
                ..
            }
        ));
    }

    #[test]
    fn test_arity_unchecked_without_expected_len() {
        let raw = r#"{"score":[500000,300000,200000],"justification":"x"}"#;
        let vote = parse_vote(raw, None).unwrap();
        assert_eq!(vote.scores.len(), 3);
    }

    #[test]
    fn test_non_integer_scores_are_no_vote() {
        let raw = r#"{"score":[0.7,0.3],"justification":"x"}"#;
        assert!(matches!(
            parse_vote(raw, Some(2)).unwrap_err(),
            ParseError::NoVote { .. }
        ));
    }

    #[test]
    fn test_prose_without_vote_fails_with_raw_text() {
        let raw = "I think the first option is probably better.";
        let err = parse_vote(raw, Some(2)).unwrap_err();
        assert_eq!(err.raw_response(), raw);
    }

    #[test]
    fn test_missing_justification_is_no_vote() {
        let raw = r#"{"score":[700000,300000]}"#;
        assert!(matches!(
            parse_vote(raw, Some(2)).unwrap_err(),
            ParseError::NoVote { .. }
        ));
    }

    // ==================== Round-trip Law ====================

    #[test]
    fn test_canonical_json_round_trip() {
        let vote = expected_vote();
        let reparsed = parse_vote(&vote.to_canonical_json(), Some(2)).unwrap();
        assert_eq!(reparsed, vote);
    }
}
