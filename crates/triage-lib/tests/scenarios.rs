//! End-to-end tests: analyzer JSON through aggregation, selection and dispatch

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use triage_lib::{
    aggregate, aggregator::parse_payload, analyzer::extract_json, AbortReason, DiagnosticStatus,
    Dispatcher, ExecutionResult, Executor, ScriptedConsole, SelectionConfig, SelectionEngine,
    SelectionOutcome, SolutionOrigin, Style, TriageResult,
};

/// Executor that records instructions instead of touching a cluster
#[derive(Clone, Default)]
struct RecordingExecutor {
    calls: Arc<Mutex<Vec<String>>>,
    exit_code: i32,
}

impl RecordingExecutor {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    fn program(&self) -> &str {
        "recording-agent"
    }

    async fn execute(&self, instruction: &str) -> TriageResult<ExecutionResult> {
        self.calls.lock().unwrap().push(instruction.to_string());
        let now = Utc::now();
        Ok(ExecutionResult {
            exit_code: self.exit_code,
            stdout: format!("applied: {}", instruction),
            stderr: if self.exit_code == 0 {
                String::new()
            } else {
                "forbidden".to_string()
            },
            started_at: now,
            finished_at: now,
        })
    }
}

fn record(kind: &str, name: &str, error: &str, details: &str) -> Value {
    json!({
        "kind": kind,
        "name": name,
        "error": [{ "Text": error, "KubernetesDoc": "", "Sensitive": [] }],
        "details": details,
        "parentObject": ""
    })
}

fn problem_payload(results: Vec<Value>) -> Value {
    json!({
        "provider": "openai",
        "errors": null,
        "status": "ProblemDetected",
        "problems": results.len(),
        "results": results
    })
}

/// Run selection and dispatch the way the binary does
async fn select_and_dispatch(
    raw: &Value,
    config: SelectionConfig,
    inputs: &[&str],
    executor: RecordingExecutor,
) -> TriageResult<(SelectionOutcome, Option<ExecutionResult>)> {
    let issues = aggregate(raw)?;
    let mut console = ScriptedConsole::new(inputs.iter().copied());
    let outcome = SelectionEngine::new(&issues, config, Style::plain()).run(&mut console)?;
    let result = Dispatcher::new(executor).dispatch_outcome(&outcome).await?;
    Ok((outcome, result))
}

#[tokio::test]
async fn test_scenario_auto_select_single_issue() {
    let raw = problem_payload(vec![record(
        "Pod",
        "default/web-7d9f",
        "Back-off pulling image \"nginx:latst\"",
        "Error: X\n\nSolution:\n1. Verify network\n2. Check tag\n3. Check registry",
    )]);
    let executor = RecordingExecutor::default();
    let config = SelectionConfig {
        auto_select: Some(2),
        auto_issue: None,
        interactive: false,
    };

    let (outcome, result) = select_and_dispatch(&raw, config, &[], executor.clone())
        .await
        .unwrap();

    match &outcome {
        SelectionOutcome::Resolved { issue, solution } => {
            assert_eq!(issue.record.name, "default/web-7d9f");
            assert_eq!(solution.text, "Check tag");
            assert_eq!(solution.index, 2);
        }
        other => panic!("expected Resolved, got {:?}", other),
    }
    assert_eq!(executor.calls(), vec!["Check tag".to_string()]);
    assert!(result.unwrap().success());
}

#[tokio::test]
async fn test_scenario_no_problem() {
    let raw = json!({ "provider": "openai", "status": "NoProblem", "problems": 0, "results": [] });
    let executor = RecordingExecutor::default();

    let payload = parse_payload(&raw).unwrap();
    let issues = aggregate(&raw).unwrap();

    assert_eq!(payload.status, DiagnosticStatus::NoProblem);
    assert!(issues.is_empty());
    // With nothing to choose from the binary never builds an engine or dispatcher.
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_scenario_custom_solution_for_second_issue() {
    let raw = problem_payload(vec![
        record(
            "Pod",
            "default/web-7d9f",
            "CrashLoopBackOff",
            "Error: crash\nSolution:\n1. Check logs\n2. Raise memory limit",
        ),
        record(
            "Deployment",
            "shop/cart",
            "Deployment has 1 replicas but 3 are desired",
            "Error: replicas\nSolution:\n1. Check pending pods",
        ),
    ]);
    let executor = RecordingExecutor::default();

    let (outcome, _) = select_and_dispatch(
        &raw,
        SelectionConfig::default(),
        &["2", "c", "Scale deployment to 3 replicas", ""],
        executor.clone(),
    )
    .await
    .unwrap();

    let issues = aggregate(&raw).unwrap();
    match &outcome {
        SelectionOutcome::Resolved { issue, solution } => {
            assert_eq!(issue, &issues[1]);
            assert_eq!(solution.origin, SolutionOrigin::Custom);
            assert_eq!(solution.text, "Scale deployment to 3 replicas");
        }
        other => panic!("expected Resolved, got {:?}", other),
    }
    assert_eq!(
        executor.calls(),
        vec!["Scale deployment to 3 replicas".to_string()]
    );
}

#[tokio::test]
async fn test_quit_never_reaches_the_agent() {
    let raw = problem_payload(vec![
        record("Pod", "default/a", "a", "Solution:\n1. fix a"),
        record("Pod", "default/b", "b", "Solution:\n1. fix b"),
    ]);

    for inputs in [vec!["q"], vec!["1", "q"]] {
        let executor = RecordingExecutor::default();
        let (outcome, result) =
            select_and_dispatch(&raw, SelectionConfig::default(), &inputs, executor.clone())
                .await
                .unwrap();

        assert_eq!(outcome, SelectionOutcome::aborted(AbortReason::Quit));
        assert!(result.is_none());
        assert!(executor.calls().is_empty());
    }
}

#[tokio::test]
async fn test_auto_select_out_of_range_never_reaches_the_agent() {
    let raw = problem_payload(vec![record(
        "Pod",
        "default/a",
        "a",
        "Solution:\n1. fix a\n2. fix again",
    )]);
    let executor = RecordingExecutor::default();
    let config = SelectionConfig {
        auto_select: Some(3),
        auto_issue: None,
        interactive: false,
    };

    let err = select_and_dispatch(&raw, config, &[], executor.clone())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        triage_lib::TriageError::InvalidSelection { .. }
    ));
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_failed_execution_is_reported_once() {
    let raw = problem_payload(vec![record("Pod", "default/a", "a", "Solution:\n1. fix a")]);
    let executor = RecordingExecutor {
        exit_code: 1,
        ..RecordingExecutor::default()
    };
    let config = SelectionConfig {
        auto_select: Some(1),
        auto_issue: None,
        interactive: false,
    };

    let (_, result) = select_and_dispatch(&raw, config, &[], executor.clone())
        .await
        .unwrap();
    let result = result.unwrap();

    assert_eq!(result.exit_code, 1);
    assert!(matches!(
        result.into_result(),
        Err(triage_lib::TriageError::ExecutionFailed { exit_code: 1, .. })
    ));
    assert_eq!(executor.calls().len(), 1);
}

#[test]
fn test_analyzer_text_with_progress_lines() {
    let text = format!(
        "AI Provider: openai\n{}",
        serde_json::to_string_pretty(&problem_payload(vec![record(
            "Service",
            "default/api",
            "Service has no endpoints",
            "Error: no endpoints\nSolution:\n1. Check selector labels"
        )]))
        .unwrap()
    );

    let raw = extract_json(&text).unwrap();
    let issues = aggregate(&raw).unwrap();

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].solutions[0].text, "Check selector labels");
}
