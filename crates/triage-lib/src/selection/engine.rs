//! Selection state machine
//!
//! `ChoosingIssue -> ChoosingSolution -> Done(Resolved | Aborted)`.
//! Invalid input re-enters the current state when interactive and fails
//! with `InvalidSelection` otherwise. The loop ends on a terminal outcome,
//! on the quit token, or when the console runs out of input.

use tracing::debug;

use super::{Console, SelectionConfig, CUSTOM_TOKENS, QUIT_TOKENS};
use crate::display::{render_issue_menu, render_solution_menu, Style};
use crate::error::{TriageError, TriageResult};
use crate::models::{AbortReason, Issue, SelectionOutcome, Solution};
use crate::observability::RunLogger;

/// One parsed menu answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Number(usize),
    Custom,
    Quit,
    Invalid,
}

impl Choice {
    pub fn parse(input: &str) -> Self {
        let token = input.trim().to_ascii_lowercase();
        if QUIT_TOKENS.contains(&token.as_str()) {
            Self::Quit
        } else if CUSTOM_TOKENS.contains(&token.as_str()) {
            Self::Custom
        } else {
            token.parse().map(Self::Number).unwrap_or(Self::Invalid)
        }
    }
}

/// States of one selection conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    ChoosingIssue,
    /// Position (0-based) of the chosen issue
    ChoosingSolution { issue: usize },
    Done(SelectionOutcome),
}

/// Resolves aggregated issues to exactly one solution or an abort
pub struct SelectionEngine<'a> {
    issues: &'a [Issue],
    config: SelectionConfig,
    style: Style,
    logger: RunLogger,
}

impl<'a> SelectionEngine<'a> {
    pub fn new(issues: &'a [Issue], config: SelectionConfig, style: Style) -> Self {
        Self {
            issues,
            config,
            style,
            logger: RunLogger::default(),
        }
    }

    pub fn with_logger(mut self, logger: RunLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Drive the state machine to a terminal outcome.
    ///
    /// In auto-select mode no input is read at all.
    pub fn run<C: Console + ?Sized>(&self, console: &mut C) -> TriageResult<SelectionOutcome> {
        let outcome = if self.issues.is_empty() {
            SelectionOutcome::aborted(AbortReason::NoSolutionsAvailable)
        } else if let Some(index) = self.config.auto_select {
            self.auto_resolve(index)?
        } else {
            let mut state = SelectionState::ChoosingIssue;
            loop {
                state = match state {
                    SelectionState::Done(outcome) => break outcome,
                    other => self.step(other, console)?,
                };
            }
        };

        match &outcome {
            SelectionOutcome::Resolved { issue, solution } => {
                self.logger.log_solution_resolved(issue, solution)
            }
            SelectionOutcome::Aborted { reason } => self.logger.log_selection_aborted(*reason),
        }
        Ok(outcome)
    }

    /// Advance one state. `Done` is returned unchanged.
    pub fn step<C: Console + ?Sized>(
        &self,
        state: SelectionState,
        console: &mut C,
    ) -> TriageResult<SelectionState> {
        match state {
            SelectionState::ChoosingIssue => self.choose_issue(console),
            SelectionState::ChoosingSolution { issue } => self.choose_solution(issue, console),
            done @ SelectionState::Done(_) => Ok(done),
        }
    }

    fn choose_issue<C: Console + ?Sized>(&self, console: &mut C) -> TriageResult<SelectionState> {
        let count = self.issues.len();
        if count == 1 {
            self.logger.log_issue_selected(&self.issues[0], true);
            return Ok(SelectionState::ChoosingSolution { issue: 0 });
        }

        for line in render_issue_menu(self.issues, self.style) {
            console.write_line(&line);
        }
        let prompt = format!("Select an issue (1-{}) or 'q' to quit: ", count);
        let Some(input) = console.read_line(&prompt)? else {
            return Ok(done(AbortReason::EndOfInput));
        };

        match Choice::parse(&input) {
            Choice::Quit => Ok(done(AbortReason::Quit)),
            Choice::Number(n) if (1..=count).contains(&n) => {
                self.logger.log_issue_selected(&self.issues[n - 1], false);
                Ok(SelectionState::ChoosingSolution { issue: n - 1 })
            }
            _ => self.reject(
                console,
                &input,
                format!("Please enter a number between 1 and {} or 'q' to quit", count),
                SelectionState::ChoosingIssue,
            ),
        }
    }

    fn choose_solution<C: Console + ?Sized>(
        &self,
        position: usize,
        console: &mut C,
    ) -> TriageResult<SelectionState> {
        let Some(issue) = self.issues.get(position) else {
            return Err(TriageError::invalid_selection(
                (position + 1).to_string(),
                format!("issue number is out of range (1-{})", self.issues.len()),
            ));
        };
        let count = issue.solutions.len();

        for line in render_solution_menu(issue, self.style) {
            console.write_line(&line);
        }
        let prompt = if count == 0 {
            "Enter 'c' for a custom solution or 'q' to quit: ".to_string()
        } else {
            format!(
                "Select a solution (1-{}), 'c' for custom, or 'q' to quit: ",
                count
            )
        };
        let Some(input) = console.read_line(&prompt)? else {
            return Ok(done(AbortReason::EndOfInput));
        };
        let retry = SelectionState::ChoosingSolution { issue: position };

        match Choice::parse(&input) {
            Choice::Quit if count == 0 => Ok(done(AbortReason::NoSolutionsAvailable)),
            Choice::Quit => Ok(done(AbortReason::Quit)),
            Choice::Custom => self.enter_custom(issue, console, retry),
            Choice::Number(n) if (1..=count).contains(&n) => Ok(resolved(
                issue,
                issue.solutions[n - 1].clone(),
            )),
            _ => {
                let reason = if count == 0 {
                    "Please enter 'c' for a custom solution or 'q' to quit".to_string()
                } else {
                    format!(
                        "Please enter a number between 1 and {}, 'c', or 'q'",
                        count
                    )
                };
                self.reject(console, &input, reason, retry)
            }
        }
    }

    /// Collect lines until an empty line; an empty result is rejected.
    fn enter_custom<C: Console + ?Sized>(
        &self,
        issue: &Issue,
        console: &mut C,
        retry: SelectionState,
    ) -> TriageResult<SelectionState> {
        console.write_line("Enter your custom solution (finish with an empty line):");

        let mut lines = Vec::new();
        loop {
            match console.read_line("> ")? {
                Some(line) if line.trim().is_empty() => break,
                Some(line) => lines.push(line.trim_end().to_string()),
                None if lines.is_empty() => return Ok(done(AbortReason::EndOfInput)),
                None => break,
            }
        }

        let text = lines.join("\n");
        if text.trim().is_empty() {
            return self.reject(
                console,
                "",
                "Custom solution cannot be empty".to_string(),
                retry,
            );
        }

        debug!(issue = issue.index, lines = lines.len(), "Custom solution entered");
        let index = issue.solutions.len() + 1;
        Ok(resolved(issue, Solution::custom(index, text)))
    }

    fn auto_resolve(&self, index: usize) -> TriageResult<SelectionOutcome> {
        let count = self.issues.len();
        let position = self.config.auto_issue.unwrap_or(1);
        if !(1..=count).contains(&position) {
            return Err(TriageError::invalid_selection(
                position.to_string(),
                format!("issue number is out of range (1-{})", count),
            ));
        }

        let issue = &self.issues[position - 1];
        self.logger.log_issue_selected(issue, true);

        let available = issue.solutions.len();
        if available == 0 {
            return Err(TriageError::invalid_selection(
                index.to_string(),
                format!("issue {} has no extracted solutions", issue.index),
            ));
        }
        if !(1..=available).contains(&index) {
            return Err(TriageError::invalid_selection(
                index.to_string(),
                format!("solution number is out of range (1-{})", available),
            ));
        }

        Ok(SelectionOutcome::Resolved {
            issue: issue.clone(),
            solution: issue.solutions[index - 1].clone(),
        })
    }

    fn reject<C: Console + ?Sized>(
        &self,
        console: &mut C,
        input: &str,
        reason: String,
        retry: SelectionState,
    ) -> TriageResult<SelectionState> {
        if self.config.interactive {
            console.write_line(&self.style.warning(&reason));
            Ok(retry)
        } else {
            Err(TriageError::invalid_selection(input.trim(), reason))
        }
    }
}

fn done(reason: AbortReason) -> SelectionState {
    SelectionState::Done(SelectionOutcome::aborted(reason))
}

fn resolved(issue: &Issue, solution: Solution) -> SelectionState {
    SelectionState::Done(SelectionOutcome::Resolved {
        issue: issue.clone(),
        solution,
    })
}
