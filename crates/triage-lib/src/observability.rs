//! Structured run events
//!
//! Every significant step of a run is logged as a `tracing` event carrying an
//! `event` field and the run identifier, so one invocation can be followed in
//! JSON logs.

use chrono::Utc;
use tracing::{info, warn};

use crate::models::{AbortReason, DiagnosticStatus, Issue, Solution, SolutionOrigin};

/// Structured logger for one triage run
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
}

impl Default for RunLogger {
    fn default() -> Self {
        Self::new(Utc::now().format("%Y%m%dT%H%M%S%.3fZ").to_string())
    }
}

impl RunLogger {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
        }
    }

    /// Log the analyzer command about to run
    pub fn log_analysis_started(&self, program: &str, args: &[String]) {
        info!(
            event = "analysis_started",
            run_id = %self.run_id,
            program = %program,
            args = %args.join(" "),
            "Running analyzer"
        );
    }

    /// Log the aggregated result of an analyzer run
    pub fn log_analysis_completed(&self, status: DiagnosticStatus, issues: &[Issue]) {
        let solutions: usize = issues.iter().map(|i| i.solutions.len()).sum();
        info!(
            event = "analysis_completed",
            run_id = %self.run_id,
            status = ?status,
            issues = issues.len(),
            solutions = solutions,
            "Analyzer output aggregated"
        );
    }

    /// Log an issue choice; `auto` marks choices made without operator input
    pub fn log_issue_selected(&self, issue: &Issue, auto: bool) {
        info!(
            event = "issue_selected",
            run_id = %self.run_id,
            issue = issue.index,
            kind = %issue.record.kind,
            name = %issue.record.name,
            auto = auto,
            "Issue selected"
        );
    }

    pub fn log_solution_resolved(&self, issue: &Issue, solution: &Solution) {
        let origin = match solution.origin {
            SolutionOrigin::Extracted => "extracted",
            SolutionOrigin::Custom => "custom",
        };
        info!(
            event = "solution_resolved",
            run_id = %self.run_id,
            issue = issue.index,
            solution = solution.index,
            origin = origin,
            "Solution resolved"
        );
    }

    pub fn log_selection_aborted(&self, reason: AbortReason) {
        info!(
            event = "selection_aborted",
            run_id = %self.run_id,
            reason = %reason,
            "Selection aborted"
        );
    }

    pub fn log_dispatch_started(&self, program: &str, instruction: &str) {
        info!(
            event = "dispatch_started",
            run_id = %self.run_id,
            program = %program,
            instruction_chars = instruction.chars().count(),
            "Dispatching solution to execution agent"
        );
    }

    pub fn log_dispatch_finished(&self, exit_code: i32, duration_ms: i64) {
        if exit_code == 0 {
            info!(
                event = "dispatch_finished",
                run_id = %self.run_id,
                exit_code = exit_code,
                duration_ms = duration_ms,
                "Execution agent finished"
            );
        } else {
            warn!(
                event = "dispatch_finished",
                run_id = %self.run_id,
                exit_code = exit_code,
                duration_ms = duration_ms,
                "Execution agent failed"
            );
        }
    }
}
