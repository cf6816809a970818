//! Solution selection
//!
//! This module provides:
//! - The selection state machine (issue menu, solution menu, custom entry)
//! - The [`Console`] seam the machine reads operator input through
//! - A scripted console for unattended runs and tests

mod engine;


use std::collections::VecDeque;

pub use engine::{Choice, SelectionEngine, SelectionState};

/// Tokens that abort the selection in any state
pub const QUIT_TOKENS: &[&str] = &["q", "quit"];
/// Tokens that open custom solution entry in the solution menu
pub const CUSTOM_TOKENS: &[&str] = &["c", "custom"];

/// Selection settings, fixed for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionConfig {
    /// Pre-selected 1-based solution index; bypasses both menus
    pub auto_select: Option<usize>,
    /// 1-based issue the auto-selected solution belongs to (default: first)
    pub auto_issue: Option<usize>,
    /// Whether invalid input is re-prompted (`true`) or fatal (`false`)
    pub interactive: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            auto_select: None,
            auto_issue: None,
            interactive: true,
        }
    }
}

/// Line-oriented operator I/O
pub trait Console {
    /// Show `prompt` and read one line without its line terminator.
    /// Returns `None` once the input is exhausted.
    fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>>;

    /// Show one line of output.
    fn write_line(&mut self, line: &str);
}

/// Console fed from a fixed list of answers, recording everything shown
#[derive(Debug, Default, Clone)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    transcript: Vec<String>,
    reads: usize,
}

impl ScriptedConsole {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
            reads: 0,
        }
    }

    /// Number of answers consumed so far
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Answers not yet consumed
    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }

    /// Prompts and lines written, in order
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        self.transcript.push(prompt.to_string());
        let answer = self.inputs.pop_front();
        if answer.is_some() {
            self.reads += 1;
        }
        Ok(answer)
    }

    fn write_line(&mut self, line: &str) {
        self.transcript.push(line.to_string());
    }
}
