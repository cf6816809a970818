//! Analyzer invocation boundary
//!
//! Builds the analyzer command line, runs it once and extracts the JSON
//! document from whatever it printed.

use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::error::{TriageError, TriageResult};

/// Arguments used when the operator passes none
pub const DEFAULT_ANALYZER_ARGS: &[&str] = &["analyze", "--explain"];

const OUTPUT_FLAGS: &[&str] = &["--output", "-o"];
const EXPLAIN_FLAGS: &[&str] = &["--explain", "-e"];
const FALSE_VALUES: &[&str] = &["false", "f", "0"];

/// A fully-resolved analyzer command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerInvocation {
    program: String,
    args: Vec<String>,
}

/// Captured analyzer process output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerOutput {
    /// `None` when the analyzer was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl AnalyzerOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Value given to `flag` by `arg`: `Some("")` for the bare flag, `Some(v)`
/// for `flag=v`.
fn flag_value<'a>(arg: &'a str, flags: &[&str]) -> Option<&'a str> {
    flags.iter().find_map(|&flag| {
        let rest = arg.strip_prefix(flag)?;
        if rest.is_empty() {
            Some(rest)
        } else {
            rest.strip_prefix('=')
        }
    })
}

fn has_flag(args: &[String], flags: &[&str]) -> bool {
    args.iter().any(|arg| flag_value(arg, flags).is_some())
}

/// Boolean flag state; the last occurrence wins and an explicit false value
/// turns it off.
fn flag_enabled(args: &[String], flags: &[&str]) -> bool {
    args.iter()
        .filter_map(|arg| flag_value(arg, flags))
        .last()
        .is_some_and(|value| !FALSE_VALUES.iter().any(|f| value.eq_ignore_ascii_case(f)))
}

impl AnalyzerInvocation {
    /// Build the command line from the operator's pass-through arguments.
    ///
    /// Empty arguments fall back to [`DEFAULT_ANALYZER_ARGS`]. JSON output is
    /// requested unless the operator chose an output format already.
    pub fn from_args(program: impl Into<String>, user_args: Vec<String>) -> Self {
        let mut args = if user_args.is_empty() {
            DEFAULT_ANALYZER_ARGS.iter().map(|a| a.to_string()).collect()
        } else {
            user_args
        };

        if !has_flag(&args, OUTPUT_FLAGS) {
            args.extend(["--output".to_string(), "json".to_string()]);
        }

        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Whether the analyzer was asked to explain its findings; selection
    /// and dispatch only run when it was.
    pub fn explain_requested(&self) -> bool {
        flag_enabled(&self.args, EXPLAIN_FLAGS)
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the analyzer once and capture its output.
    pub async fn run(&self, timeout: Option<Duration>) -> TriageResult<AnalyzerOutput> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match timeout {
            Some(limit) => tokio::time::timeout(limit, child).await.map_err(|_| {
                TriageError::TimedOut {
                    what: "analyzer".to_string(),
                    secs: limit.as_secs(),
                }
            })?,
            None => child.await,
        }
        .map_err(|source| TriageError::AnalyzerUnavailable {
            program: self.program.clone(),
            source,
        })?;

        Ok(AnalyzerOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Locate and parse the JSON document in analyzer output.
///
/// The analyzer may print progress lines before the document; parsing starts
/// at the first line that opens an object.
pub fn extract_json(text: &str) -> TriageResult<Value> {
    let trimmed = text.trim();
    let document = if trimmed.starts_with('{') {
        trimmed.to_string()
    } else {
        let lines: Vec<&str> = trimmed.lines().collect();
        let start = lines
            .iter()
            .position(|line| line.trim_start().starts_with('{'))
            .ok_or_else(|| TriageError::malformed("no JSON object found in analyzer output"))?;
        lines[start..].join("\n")
    };

    serde_json::from_str(&document)
        .map_err(|e| TriageError::malformed(format!("invalid JSON in analyzer output: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_defaults_when_no_args() {
        let invocation = AnalyzerInvocation::from_args("k8sgpt", Vec::new());

        assert_eq!(
            invocation.args(),
            args(&["analyze", "--explain", "--output", "json"]).as_slice()
        );
        assert!(invocation.explain_requested());
        assert_eq!(
            invocation.command_line(),
            "k8sgpt analyze --explain --output json"
        );
    }

    #[test]
    fn test_existing_output_flag_is_respected() {
        for given in [
            args(&["analyze", "-o", "json"]),
            args(&["analyze", "--output", "text"]),
            args(&["analyze", "--output=json"]),
        ] {
            let invocation = AnalyzerInvocation::from_args("k8sgpt", given.clone());
            assert_eq!(invocation.args(), given.as_slice());
        }
    }

    #[test]
    fn test_explain_detection() {
        let without = AnalyzerInvocation::from_args("k8sgpt", args(&["analyze", "--filter=Pod"]));
        assert!(!without.explain_requested());
        assert_eq!(
            without.args(),
            args(&["analyze", "--filter=Pod", "--output", "json"]).as_slice()
        );

        let with = AnalyzerInvocation::from_args("k8sgpt", args(&["analyze", "-e"]));
        assert!(with.explain_requested());

        let unrelated = AnalyzerInvocation::from_args("k8sgpt", args(&["analyze", "--explainer"]));
        assert!(!unrelated.explain_requested());
    }

    #[test]
    fn test_explicit_explain_value() {
        for off in [
            args(&["analyze", "--explain=false"]),
            args(&["analyze", "--explain=FALSE"]),
            args(&["analyze", "-e=0"]),
            args(&["analyze", "--explain", "--explain=false"]),
        ] {
            let invocation = AnalyzerInvocation::from_args("k8sgpt", off.clone());
            assert!(!invocation.explain_requested(), "{:?}", off);
        }

        for on in [
            args(&["analyze", "--explain=true"]),
            args(&["analyze", "--explain=false", "--explain"]),
        ] {
            let invocation = AnalyzerInvocation::from_args("k8sgpt", on.clone());
            assert!(invocation.explain_requested(), "{:?}", on);
        }
    }

    #[test]
    fn test_extract_json_plain_and_prefixed() {
        let plain = extract_json("{\"status\": \"OK\"}\n").unwrap();
        assert_eq!(plain["status"], "OK");

        let prefixed = extract_json(
            "Analyzing cluster...\n 100% |████████| (3/3)\n{\n  \"status\": \"ProblemDetected\",\n  \"results\": []\n}",
        )
        .unwrap();
        assert_eq!(prefixed["status"], "ProblemDetected");
    }

    #[test]
    fn test_extract_json_failures() {
        for text in ["", "AI Provider: openai\nNo problems detected", "{ not json"] {
            assert!(matches!(
                extract_json(text),
                Err(TriageError::MalformedPayload { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_run_captures_output() {
        let invocation = AnalyzerInvocation {
            program: "sh".to_string(),
            args: args(&["-c", "echo '{\"status\": \"OK\"}'"]),
        };

        let output = invocation.run(None).await.unwrap();

        assert!(output.success());
        assert_eq!(extract_json(&output.stdout).unwrap()["status"], "OK");
    }

    #[tokio::test]
    async fn test_run_timeout() {
        let invocation = AnalyzerInvocation {
            program: "sh".to_string(),
            args: args(&["-c", "sleep 5"]),
        };

        let err = invocation
            .run(Some(Duration::from_millis(50)))
            .await
            .unwrap_err();

        assert!(matches!(err, TriageError::TimedOut { .. }));
    }

    #[tokio::test]
    async fn test_missing_analyzer() {
        let invocation = AnalyzerInvocation::from_args("no-such-analyzer-binary-xyz", Vec::new());

        assert!(matches!(
            invocation.run(None).await,
            Err(TriageError::AnalyzerUnavailable { .. })
        ));
    }
}
