//! Core data models for the triage pipeline

use serde::{Deserialize, Serialize};

/// Overall verdict of one analyzer run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticStatus {
    NoProblem,
    ProblemDetected,
    Error,
}

impl DiagnosticStatus {
    /// Parse the analyzer's status string. `OK` is what the analyzer emits
    /// for a clean cluster.
    pub fn parse(status: &str) -> Option<Self> {
        match status {
            "NoProblem" | "OK" => Some(Self::NoProblem),
            "ProblemDetected" => Some(Self::ProblemDetected),
            "Error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Structured result of one analyzer run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticPayload {
    pub status: DiagnosticStatus,
    /// Problem count as reported by the analyzer, informational only
    pub problems: Option<u64>,
    /// Detected issues in the analyzer's reported order
    pub results: Vec<IssueRecord>,
}

/// One detected problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Resource category, e.g. `Pod`
    pub kind: String,
    /// Conventionally `<namespace>/<resource-name>`
    pub name: String,
    pub error_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionOrigin {
    Extracted,
    Custom,
}

/// One atomic, selectable remediation action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// 1-based position within the owning issue's candidate list
    pub index: usize,
    pub text: String,
    pub origin: SolutionOrigin,
}

impl Solution {
    pub fn extracted(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            origin: SolutionOrigin::Extracted,
        }
    }

    pub fn custom(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            origin: SolutionOrigin::Custom,
        }
    }
}

/// An issue together with its decomposed solution candidates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// 1-based position in the aggregated issue list
    pub index: usize,
    #[serde(flatten)]
    pub record: IssueRecord,
    pub solutions: Vec<Solution>,
}

/// Why a selection ended without a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    /// Operator entered the quit token
    Quit,
    /// Issue had no extracted solutions and the operator declined custom entry
    NoSolutionsAvailable,
    /// Input stream closed while waiting for a choice
    EndOfInput,
    /// Interrupt received while waiting for a choice
    Interrupted,
    /// An external wait exceeded its configured limit
    TimedOut,
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::Quit => "quit",
            Self::NoSolutionsAvailable => "no solutions available",
            Self::EndOfInput => "end of input",
            Self::Interrupted => "interrupted",
            Self::TimedOut => "timed out",
        };
        f.write_str(reason)
    }
}

/// Terminal result of the selection engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SelectionOutcome {
    Resolved { issue: Issue, solution: Solution },
    Aborted { reason: AbortReason },
}

impl SelectionOutcome {
    pub fn aborted(reason: AbortReason) -> Self {
        Self::Aborted { reason }
    }
}
