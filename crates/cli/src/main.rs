//! k8s2ai CLI
//!
//! Runs the cluster analyzer, lists the detected issues with their proposed
//! solutions, and hands the chosen solution to the execution agent.

mod commands;
mod config;
mod console;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// k8s2ai CLI
#[derive(Parser, Debug)]
#[command(name = "k8s2ai")]
#[command(
    author,
    version,
    about = "Analyze Kubernetes issues with k8sgpt and execute solutions via kubectl-ai",
    long_about = None
)]
pub struct Cli {
    /// Output raw JSON from the analyzer (for debugging) and exit
    #[arg(long)]
    pub json_output: bool,

    /// Automatically select solution N without prompting
    #[arg(long, value_name = "N")]
    pub auto_select: Option<usize>,

    /// Issue whose solution --auto-select picks (defaults to the first)
    #[arg(long, value_name = "N", requires = "auto_select")]
    pub issue: Option<usize>,

    /// Output format for the issue listing
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Print the raw analyzer output when it cannot be parsed
    #[arg(long)]
    pub show_raw: bool,

    /// Send the issue's kind, name and error along with the solution
    #[arg(long)]
    pub with_context: bool,

    /// Stop waiting for the analyzer after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Arguments passed through to k8sgpt (default: analyze --explain)
    #[arg(
        value_name = "K8SGPT_ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub analyzer_args: Vec<String>,
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let config = config::Config::load()?;
    let code = commands::run::execute(&cli, &config).await?;

    // A stdin reader abandoned by an interrupt may still be parked; leave
    // without waiting for it.
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyzer_args_pass_through() {
        let cli = Cli::try_parse_from([
            "k8s2ai",
            "--auto-select",
            "2",
            "analyze",
            "--explain",
            "--filter=Pod",
            "-n",
            "default",
        ])
        .unwrap();

        assert_eq!(cli.auto_select, Some(2));
        assert_eq!(
            cli.analyzer_args,
            vec!["analyze", "--explain", "--filter=Pod", "-n", "default"]
        );
    }

    #[test]
    fn test_no_analyzer_args() {
        let cli = Cli::try_parse_from(["k8s2ai", "--json-output"]).unwrap();

        assert!(cli.json_output);
        assert!(cli.analyzer_args.is_empty());
        assert_eq!(cli.format, output::OutputFormat::Table);
    }

    #[test]
    fn test_issue_requires_auto_select() {
        assert!(Cli::try_parse_from(["k8s2ai", "--issue", "2"]).is_err());
        assert!(Cli::try_parse_from(["k8s2ai", "--issue", "2", "--auto-select", "1"]).is_ok());
    }
}
