//! Error types for the triage pipeline.

/// Errors produced while parsing, selecting, or dispatching a remediation.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("malformed analyzer payload: {reason}")]
    MalformedPayload { reason: String },

    #[error("invalid selection '{input}': {reason}")]
    InvalidSelection { input: String, reason: String },

    #[error("execution agent exited with code {exit_code}: {stderr}")]
    ExecutionFailed { exit_code: i32, stderr: String },

    #[error("analyzer '{program}' could not be started: {source}")]
    AnalyzerUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("execution agent '{program}' could not be started: {source}")]
    ExecutorUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{what} timed out after {secs}s")]
    TimedOut { what: String, secs: u64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TriageError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_selection(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSelection {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for triage operations.
pub type TriageResult<T> = std::result::Result<T, TriageError>;
