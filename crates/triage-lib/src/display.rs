//! Plain-text rendering of issues and selection menus
//!
//! Coloring is decided by the [`Style`] value handed in by the caller, never
//! by process-wide state, so rendered lines are deterministic in tests.

use colored::Colorize;

use crate::models::{Issue, SolutionOrigin};

/// Error texts longer than this are truncated in listings
pub const ERROR_PREVIEW_CHARS: usize = 100;

const RULE_WIDTH: usize = 80;

/// Terminal styling settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub color: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self { color: true }
    }
}

impl Style {
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn accent(&self, text: &str) -> String {
        if self.color {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn dim(&self, text: &str) -> String {
        if self.color {
            text.bright_black().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn success(&self, text: &str) -> String {
        if self.color {
            text.green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn warning(&self, text: &str) -> String {
        if self.color {
            text.yellow().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn failure(&self, text: &str) -> String {
        if self.color {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Shorten `text` to at most `max` characters, marking the cut with `...`
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut)
}

/// `[i] Kind: namespace/name`
pub fn issue_heading(issue: &Issue, style: Style) -> String {
    format!(
        "[{}] {}: {}",
        issue.index,
        style.bold(&issue.record.kind),
        style.accent(&issue.record.name)
    )
}

/// Full listing of issues and their solution candidates
pub fn render_listing(issues: &[Issue], style: Style) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        "=".repeat(RULE_WIDTH),
        style.bold("DETECTED ISSUES AND SOLUTIONS"),
        "=".repeat(RULE_WIDTH),
        String::new(),
    ];

    for issue in issues {
        lines.push(issue_heading(issue, style));
        lines.push(format!(
            "    Error: {}",
            truncate(&issue.record.error_text, ERROR_PREVIEW_CHARS)
        ));
        if issue.solutions.is_empty() {
            lines.push(format!("    {}", style.dim("(no extracted solutions)")));
        }
        for solution in &issue.solutions {
            lines.push(format!("    Solution {}: {}", solution.index, solution.text));
        }
        lines.push(String::new());
    }

    lines
}

/// Menu shown while choosing an issue
pub fn render_issue_menu(issues: &[Issue], style: Style) -> Vec<String> {
    let mut lines = vec!["-".repeat(RULE_WIDTH), style.bold("Issues")];
    for issue in issues {
        lines.push(format!(
            "  {} {}",
            issue_heading(issue, style),
            style.dim(&format!("({} solutions)", issue.solutions.len()))
        ));
    }
    lines
}

/// Menu shown while choosing a solution for one issue
pub fn render_solution_menu(issue: &Issue, style: Style) -> Vec<String> {
    let mut lines = vec![
        "-".repeat(RULE_WIDTH),
        format!("Solutions for {}", issue_heading(issue, style)),
    ];
    if issue.solutions.is_empty() {
        lines.push(format!(
            "  {}",
            style.dim("No solutions could be extracted for this issue.")
        ));
    }
    for solution in &issue.solutions {
        let marker = match solution.origin {
            SolutionOrigin::Extracted => "",
            SolutionOrigin::Custom => " (custom)",
        };
        lines.push(format!("  {}. {}{}", solution.index, solution.text, marker));
    }
    lines.push(format!("  {}. Enter a custom solution", style.accent("c")));
    lines.push(format!("  {}. Quit", style.accent("q")));
    lines
}
