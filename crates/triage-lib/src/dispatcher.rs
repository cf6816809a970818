//! Execution dispatch
//!
//! Hands a resolved solution to the execution agent exactly once. The agent
//! mutates cluster state, so nothing here retries: the exit code is surfaced
//! verbatim and a non-zero code is left for the caller to report.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{TriageError, TriageResult};
use crate::models::{Issue, SelectionOutcome, Solution};
use crate::observability::RunLogger;

/// Exit code reported when the agent was terminated by a signal
const SIGNALLED_EXIT_CODE: i32 = -1;

/// Captured result of one execution agent run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// Turn a non-zero exit into `ExecutionFailed`
    pub fn into_result(self) -> TriageResult<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(TriageError::ExecutionFailed {
                exit_code: self.exit_code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Something that turns a natural-language instruction into cluster actions
#[async_trait]
pub trait Executor: Send + Sync {
    /// Program name, for logs and error messages
    fn program(&self) -> &str;

    /// Run the instruction once
    async fn execute(&self, instruction: &str) -> TriageResult<ExecutionResult>;
}

/// Executor backed by an external command, e.g. `kubectl ai "<instruction>"`
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    program: String,
    args: Vec<String>,
}

impl CommandExecutor {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Executor for CommandExecutor {
    fn program(&self) -> &str {
        &self.program
    }

    async fn execute(&self, instruction: &str) -> TriageResult<ExecutionResult> {
        let started_at = Utc::now();
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(instruction)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| TriageError::ExecutorUnavailable {
                program: self.program.clone(),
                source,
            })?;

        Ok(ExecutionResult {
            exit_code: output.status.code().unwrap_or(SIGNALLED_EXIT_CODE),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            started_at,
            finished_at: Utc::now(),
        })
    }
}

/// Build the instruction handed to the agent. With `include_context` the
/// issue's kind, name and error are prepended.
pub fn compose_instruction(issue: &Issue, solution: &Solution, include_context: bool) -> String {
    if !include_context {
        return solution.text.clone();
    }
    format!(
        "Fix the following Kubernetes issue:\n\nKind: {}\nName: {}\nError: {}\n\nApply this solution: {}",
        issue.record.kind, issue.record.name, issue.record.error_text, solution.text
    )
}

/// Single-use hand-off to the execution agent
pub struct Dispatcher<E> {
    executor: E,
    include_context: bool,
    logger: RunLogger,
}

impl<E: Executor> Dispatcher<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            include_context: false,
            logger: RunLogger::default(),
        }
    }

    pub fn with_context(mut self, include_context: bool) -> Self {
        self.include_context = include_context;
        self
    }

    pub fn with_logger(mut self, logger: RunLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Run the agent once with `solution_text` as its instruction.
    pub async fn dispatch(self, solution_text: &str) -> TriageResult<ExecutionResult> {
        self.logger
            .log_dispatch_started(self.executor.program(), solution_text);
        let result = self.executor.execute(solution_text).await?;
        self.logger
            .log_dispatch_finished(result.exit_code, result.duration_ms());
        Ok(result)
    }

    /// Dispatch a resolved outcome; an aborted one never reaches the agent.
    pub async fn dispatch_outcome(
        self,
        outcome: &SelectionOutcome,
    ) -> TriageResult<Option<ExecutionResult>> {
        match outcome {
            SelectionOutcome::Resolved { issue, solution } => {
                let instruction = compose_instruction(issue, solution, self.include_context);
                self.dispatch(&instruction).await.map(Some)
            }
            SelectionOutcome::Aborted { .. } => Ok(None),
        }
    }
}
