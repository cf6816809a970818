//! Issue aggregation
//!
//! Validates the analyzer's JSON into a [`DiagnosticPayload`] and builds the
//! ordered issue list, each issue carrying its decomposed solutions.

use serde::Deserialize;
use serde_json::Value;

use crate::decomposer::decompose;
use crate::error::{TriageError, TriageResult};
use crate::models::{DiagnosticPayload, DiagnosticStatus, Issue, IssueRecord, Solution};

/// Placeholder for a record missing one of `kind`/`name`
const UNKNOWN: &str = "Unknown";
/// Error text for a record that carries no diagnostic messages
const UNKNOWN_ERROR: &str = "Unknown error";
const ERROR_TEXT_SEPARATOR: &str = "; ";

/// One analyzer result entry as emitted on the wire
#[derive(Debug, Deserialize)]
struct RawResult {
    kind: Option<String>,
    name: Option<String>,
    #[serde(default)]
    error: Option<RawErrors>,
    details: Option<String>,
}

/// The analyzer emits a list of messages, older versions a single object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawErrors {
    Many(Vec<RawError>),
    One(RawError),
}

#[derive(Debug, Deserialize)]
struct RawError {
    #[serde(rename = "Text")]
    text: Option<String>,
}

impl RawErrors {
    fn joined(self) -> Option<String> {
        let messages = match self {
            Self::Many(errors) => errors,
            Self::One(error) => vec![error],
        };
        let texts: Vec<String> = messages
            .into_iter()
            .filter_map(|e| e.text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join(ERROR_TEXT_SEPARATOR))
        }
    }
}

/// Validate raw analyzer JSON into a payload.
pub fn parse_payload(raw: &Value) -> TriageResult<DiagnosticPayload> {
    let object = raw
        .as_object()
        .ok_or_else(|| TriageError::malformed("top level is not a JSON object"))?;

    let status = match object.get("status") {
        Some(Value::String(s)) => DiagnosticStatus::parse(s)
            .ok_or_else(|| TriageError::malformed(format!("unknown status '{}'", s)))?,
        Some(_) => return Err(TriageError::malformed("status is not a string")),
        None => return Err(TriageError::malformed("missing status field")),
    };

    let problems = object.get("problems").and_then(Value::as_u64);

    let entries: &[Value] = match object.get("results") {
        Some(Value::Array(entries)) => entries.as_slice(),
        Some(Value::Null) | None => {
            if status == DiagnosticStatus::ProblemDetected {
                return Err(TriageError::malformed(
                    "status is ProblemDetected but results are missing",
                ));
            }
            &[]
        }
        Some(_) => return Err(TriageError::malformed("results is not an array")),
    };

    if status == DiagnosticStatus::NoProblem && !entries.is_empty() {
        return Err(TriageError::malformed(format!(
            "status is NoProblem but {} results were reported",
            entries.len()
        )));
    }

    let results = entries
        .iter()
        .enumerate()
        .map(|(position, entry)| parse_record(position + 1, entry))
        .collect::<TriageResult<Vec<_>>>()?;

    Ok(DiagnosticPayload {
        status,
        problems,
        results,
    })
}

fn parse_record(position: usize, entry: &Value) -> TriageResult<IssueRecord> {
    let raw = RawResult::deserialize(entry).map_err(|e| {
        TriageError::malformed(format!("result {} is not a valid record: {}", position, e))
    })?;

    if raw.kind.is_none() && raw.name.is_none() {
        return Err(TriageError::malformed(format!(
            "result {} has neither kind nor name",
            position
        )));
    }

    Ok(IssueRecord {
        kind: raw.kind.unwrap_or_else(|| UNKNOWN.to_string()),
        name: raw.name.unwrap_or_else(|| UNKNOWN.to_string()),
        error_text: raw
            .error
            .and_then(RawErrors::joined)
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        narrative: raw.details,
    })
}

/// Build the ordered issue list from a validated payload.
pub fn aggregate_payload(payload: &DiagnosticPayload) -> Vec<Issue> {
    payload
        .results
        .iter()
        .enumerate()
        .map(|(i, record)| Issue {
            index: i + 1,
            record: record.clone(),
            solutions: renumber(decompose(record.narrative.as_deref())),
        })
        .collect()
}

/// Validate raw analyzer JSON and aggregate it in one step.
pub fn aggregate(raw: &Value) -> TriageResult<Vec<Issue>> {
    parse_payload(raw).map(|payload| aggregate_payload(&payload))
}

/// Numbering is per issue, independent of what the decomposer assigned.
fn renumber(solutions: Vec<Solution>) -> Vec<Solution> {
    solutions
        .into_iter()
        .enumerate()
        .map(|(i, solution)| Solution {
            index: i + 1,
            ..solution
        })
        .collect()
}
