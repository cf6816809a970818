//! Analyze, select and execute
//!
//! One strictly sequential pass: the analyzer finishes before aggregation,
//! aggregation before selection, selection before dispatch.

use anyhow::{Context, Result};
use std::time::Duration;
use triage_lib::aggregator::{aggregate_payload, parse_payload};
use triage_lib::analyzer::{extract_json, AnalyzerInvocation, AnalyzerOutput};
use triage_lib::{
    AbortReason, CommandExecutor, DiagnosticStatus, Dispatcher, Issue, RunLogger,
    SelectionConfig, SelectionEngine, SelectionOutcome, Style, TriageError,
};

use crate::config::Config;
use crate::console::TerminalConsole;
use crate::output::{
    print_error, print_execution, print_info, print_issues, print_success, print_warning,
};
use crate::Cli;

/// Conventional exit status after SIGINT
const EXIT_INTERRUPTED: i32 = 130;
const EXIT_FAILURE: i32 = 1;

const ANALYZER_INSTALL_HINT: &str =
    "Install k8sgpt first: https://docs.k8sgpt.ai/getting-started/installation/";
const EXECUTOR_INSTALL_HINT: &str = "Install the kubectl-ai plugin with: kubectl krew install ai";

/// Run the whole pipeline and return the process exit code
pub async fn execute(cli: &Cli, config: &Config) -> Result<i32> {
    let style = Style {
        color: config.color && !cli.no_color,
    };
    let logger = RunLogger::default();

    let invocation =
        AnalyzerInvocation::from_args(config.analyzer_program.clone(), cli.analyzer_args.clone());
    print_info(style, &format!("Running: {}", invocation.command_line()));
    logger.log_analysis_started(invocation.program(), invocation.args());

    let timeout = cli
        .timeout
        .or(config.analyzer_timeout_secs)
        .map(Duration::from_secs);
    let output = match invocation.run(timeout).await {
        Ok(output) => output,
        Err(err @ TriageError::TimedOut { .. }) => {
            print_warning(style, &format!("{}, aborting", err));
            logger.log_selection_aborted(AbortReason::TimedOut);
            return Ok(EXIT_FAILURE);
        }
        Err(err @ TriageError::AnalyzerUnavailable { .. }) => {
            print_error(style, &err.to_string());
            print_info(style, ANALYZER_INSTALL_HINT);
            return Ok(EXIT_FAILURE);
        }
        Err(err) => return Err(err.into()),
    };

    if !output.success() {
        print_warning(
            style,
            &format!(
                "Analyzer exited with {}",
                output
                    .exit_code
                    .map(|code| format!("code {}", code))
                    .unwrap_or_else(|| "a signal".to_string())
            ),
        );
    }

    let raw = match extract_json(&output.stdout) {
        Ok(raw) => raw,
        Err(err) => return Ok(report_malformed(cli, style, &err, &output)),
    };

    if cli.json_output {
        println!("{}", serde_json::to_string_pretty(&raw)?);
        return Ok(0);
    }

    let payload = match parse_payload(&raw) {
        Ok(payload) => payload,
        Err(err) => return Ok(report_malformed(cli, style, &err, &output)),
    };
    let issues = aggregate_payload(&payload);
    logger.log_analysis_completed(payload.status, &issues);

    if issues.is_empty() {
        if payload.status == DiagnosticStatus::Error {
            print_error(style, "Analyzer reported an error and no results");
            return Ok(EXIT_FAILURE);
        }
        print_success(style, "No problems detected!");
        return Ok(0);
    }
    if payload.status == DiagnosticStatus::Error {
        print_warning(
            style,
            "Analyzer reported an error; showing the results it produced",
        );
    }

    print_issues(&issues, cli.format, style)?;

    if !invocation.explain_requested() {
        if cli.auto_select.is_some() {
            print_warning(
                style,
                "--auto-select requires the --explain analyzer flag to execute solutions",
            );
        }
        print_info(
            style,
            "Use the --explain flag to interactively select and execute solutions",
        );
        return Ok(0);
    }

    let selection = SelectionConfig {
        auto_select: cli.auto_select,
        auto_issue: cli.issue,
        interactive: TerminalConsole::is_interactive(),
    };
    let outcome = select(issues, selection, style, logger.clone()).await?;

    if let SelectionOutcome::Aborted { reason } = outcome {
        print_info(style, "No solution selected. Exiting.");
        let code = if reason == AbortReason::Interrupted {
            EXIT_INTERRUPTED
        } else {
            0
        };
        return Ok(code);
    }

    if let SelectionOutcome::Resolved { solution, .. } = &outcome {
        print_info(
            style,
            &format!(
                "Executing solution with {}: {}",
                config.executor_program, solution.text
            ),
        );
    }

    let executor = CommandExecutor::new(
        config.executor_program.clone(),
        config.executor_args.clone(),
    );
    let dispatched = Dispatcher::new(executor)
        .with_context(cli.with_context || config.include_context)
        .with_logger(logger)
        .dispatch_outcome(&outcome)
        .await;

    let result = match dispatched {
        Ok(Some(result)) => result,
        Ok(None) => return Ok(0),
        Err(err @ TriageError::ExecutorUnavailable { .. }) => {
            print_error(style, &err.to_string());
            print_info(style, EXECUTOR_INSTALL_HINT);
            return Ok(EXIT_FAILURE);
        }
        Err(err) => return Err(err.into()),
    };

    print_execution(&result);
    let code = result.exit_code;
    match result.into_result() {
        Ok(_) => print_success(style, "Solution executed successfully!"),
        Err(err) => print_error(style, &err.to_string()),
    }
    Ok(code)
}

/// Run the selection engine on a blocking thread so an interrupt can abort
/// the wait for operator input.
async fn select(
    issues: Vec<Issue>,
    config: SelectionConfig,
    style: Style,
    logger: RunLogger,
) -> Result<SelectionOutcome> {
    let engine_logger = logger.clone();
    let selection = tokio::task::spawn_blocking(move || {
        let mut console = TerminalConsole::new();
        SelectionEngine::new(&issues, config, style)
            .with_logger(engine_logger)
            .run(&mut console)
    });

    tokio::select! {
        joined = selection => Ok(joined.context("Selection task failed")??),
        _ = tokio::signal::ctrl_c() => {
            println!();
            logger.log_selection_aborted(AbortReason::Interrupted);
            Ok(SelectionOutcome::aborted(AbortReason::Interrupted))
        }
    }
}

fn report_malformed(cli: &Cli, style: Style, err: &TriageError, output: &AnalyzerOutput) -> i32 {
    print_error(style, &err.to_string());
    if cli.show_raw {
        eprintln!("--- analyzer stdout ---");
        eprintln!("{}", output.stdout);
        if !output.stderr.is_empty() {
            eprintln!("--- analyzer stderr ---");
            eprintln!("{}", output.stderr);
        }
    } else {
        print_info(style, "Re-run with --show-raw to see the raw analyzer output");
    }
    EXIT_FAILURE
}
