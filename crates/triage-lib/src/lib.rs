//! Triage library for cluster diagnostics remediation
//!
//! This crate provides the core functionality for:
//! - Parsing analyzer output into a diagnostic payload
//! - Decomposing remediation narratives into selectable solutions
//! - Aggregating issues with their solution candidates
//! - Choosing one solution, interactively or by auto-select
//! - Dispatching the chosen solution to the execution agent

pub mod aggregator;
pub mod analyzer;
pub mod decomposer;
pub mod dispatcher;
pub mod display;
pub mod error;
pub mod models;
pub mod observability;
pub mod selection;

pub use aggregator::aggregate;
pub use decomposer::decompose;
pub use dispatcher::{CommandExecutor, Dispatcher, ExecutionResult, Executor};
pub use display::Style;
pub use error::{TriageError, TriageResult};
pub use models::*;
pub use observability::RunLogger;
pub use selection::{Console, ScriptedConsole, SelectionConfig, SelectionEngine};
