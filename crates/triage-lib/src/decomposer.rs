//! Solution decomposition
//!
//! Splits an issue's free-text narrative into independently selectable
//! solutions. The accepted grammar is:
//!
//! ```text
//! narrative := preamble? label section
//! label     := "Solution" "s"? ":"
//! section   := (item | other-line)*
//! item      := digits ("." | ")") whitespace text
//! ```
//!
//! Lines in the section that are not items are ignored. Without a label the
//! narrative, minus any leading `Error:` paragraph, is a single solution.
//! Anything that does not fit the grammar yields fewer candidates, never an
//! error.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::Solution;

/// Prefix the analyzer uses for the error description that opens a narrative
const ERROR_PREAMBLE: &str = "Error:";

fn label_pattern() -> &'static Regex {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    LABEL.get_or_init(|| Regex::new(r"\bSolutions?[ \t]*:").expect("label pattern is valid"))
}

fn item_pattern() -> &'static Regex {
    static ITEM: OnceLock<Regex> = OnceLock::new();
    ITEM.get_or_init(|| Regex::new(r"^(\d+)[.)]\s+(.+)$").expect("item pattern is valid"))
}

/// Decompose a narrative into ordered, extracted solutions numbered `1..N`.
///
/// Ordinals written in the narrative are not trusted: items keep the order
/// they appear in and are re-numbered.
pub fn decompose(narrative: Option<&str>) -> Vec<Solution> {
    let narrative = match narrative.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => return Vec::new(),
    };

    let steps = match label_pattern().find(narrative) {
        Some(label) => section_steps(&narrative[label.end()..]),
        None => {
            let remainder = strip_error_preamble(narrative);
            if remainder.is_empty() {
                Vec::new()
            } else {
                vec![remainder.to_string()]
            }
        }
    };

    steps
        .into_iter()
        .enumerate()
        .map(|(i, text)| Solution::extracted(i + 1, text))
        .collect()
}

/// Drop a leading `Error:` paragraph, or its first line when the narrative
/// has no blank-line break.
fn strip_error_preamble(narrative: &str) -> &str {
    if !narrative.starts_with(ERROR_PREAMBLE) {
        return narrative;
    }

    let end = narrative
        .find("\n\n")
        .or_else(|| narrative.find('\n'))
        .unwrap_or(narrative.len());
    narrative[end..].trim()
}

/// Numbered items of a solution section, or the whole section as one step
/// when it carries no numbered list.
fn section_steps(section: &str) -> Vec<String> {
    let items: Vec<String> = section
        .lines()
        .map(str::trim)
        .filter_map(|line| item_pattern().captures(line))
        .map(|caps| caps[2].trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    if !items.is_empty() {
        return items;
    }

    let remainder = section.trim();
    if remainder.is_empty() {
        Vec::new()
    } else {
        vec![remainder.to_string()]
    }
}
