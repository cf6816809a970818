//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use tabled::{settings::Style as TableStyle, Table, Tabled};
use triage_lib::display::{render_listing, truncate};
use triage_lib::{ExecutionResult, Issue, Style};

/// Error previews in the summary table are kept narrow
const SUMMARY_ERROR_CHARS: usize = 60;

/// Output format for the issue listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Row for the issue summary table
#[derive(Tabled)]
struct IssueRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Solutions")]
    solutions: usize,
    #[tabled(rename = "Error")]
    error: String,
}

/// Print the aggregated issues
pub fn print_issues(issues: &[Issue], format: OutputFormat, style: Style) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(issues)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            for line in render_listing(issues, style) {
                println!("{}", line);
            }

            let rows: Vec<IssueRow> = issues
                .iter()
                .map(|issue| IssueRow {
                    index: issue.index,
                    kind: issue.record.kind.clone(),
                    name: issue.record.name.clone(),
                    solutions: issue.solutions.len(),
                    error: truncate(&issue.record.error_text, SUMMARY_ERROR_CHARS),
                })
                .collect();
            let table = Table::new(rows).with(TableStyle::rounded()).to_string();
            println!("{}", table);
            println!("\nTotal: {} issues", issues.len());
        }
    }
    Ok(())
}

/// Pass the agent's output through unmodified
pub fn print_execution(result: &ExecutionResult) {
    if !result.stdout.is_empty() {
        print!("{}", result.stdout);
    }
    if !result.stderr.is_empty() {
        eprint!("{}", result.stderr);
    }
}

/// Print a success message
pub fn print_success(style: Style, message: &str) {
    println!("{} {}", style.success("✓"), message);
}

/// Print an error message
pub fn print_error(style: Style, message: &str) {
    eprintln!("{} {}", style.failure("✗"), message);
}

/// Print a warning message
pub fn print_warning(style: Style, message: &str) {
    eprintln!("{} {}", style.warning("⚠"), message);
}

/// Print an info message
pub fn print_info(style: Style, message: &str) {
    println!("{} {}", style.accent("ℹ"), message);
}
