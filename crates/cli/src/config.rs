//! Configuration management for the CLI
//!
//! Settings are layered: built-in defaults, then the optional JSON file at
//! `~/.config/k8s2ai/config.json`, then `K8S2AI_*` environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const ENV_PREFIX: &str = "K8S2AI";

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Analyzer executable
    pub analyzer_program: String,
    /// Execution agent executable
    pub executor_program: String,
    /// Arguments placed before the instruction, e.g. the `ai` plugin name
    pub executor_args: Vec<String>,
    /// Colorize terminal output
    pub color: bool,
    /// Give up waiting for the analyzer after this many seconds
    pub analyzer_timeout_secs: Option<u64>,
    /// Prefix the instruction with the issue's kind, name and error
    pub include_context: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analyzer_program: "k8sgpt".to_string(),
            executor_program: "kubectl".to_string(),
            executor_args: vec!["ai".to_string()],
            color: true,
            analyzer_timeout_secs: None,
            include_context: false,
        }
    }
}

impl Config {
    /// Load configuration from the default file and the environment
    pub fn load() -> Result<Self> {
        let path = Self::config_path().ok();
        Self::load_from(path.as_deref())
    }

    /// Load configuration from `path` (if it exists) and the environment
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!(event = "config_source", path = %path.display(), exists = path.exists());
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Json)
                    .required(false),
            );
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(" ")
                    .with_list_parse_key("executor_args"),
            )
            .build()
            .context("Failed to read configuration")?;

        settings
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("k8s2ai").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(Some(&dir.path().join("absent.json"))).unwrap();

        assert_eq!(config.analyzer_program, "k8sgpt");
        assert_eq!(config.executor_program, "kubectl");
        assert_eq!(config.executor_args, vec!["ai".to_string()]);
        assert!(config.color);
        assert!(!config.include_context);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "executor_program": "kubectl-ai", "executor_args": [], "color": false, "analyzer_timeout_secs": 120 }"#,
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();

        assert_eq!(config.analyzer_program, "k8sgpt");
        assert_eq!(config.executor_program, "kubectl-ai");
        assert!(config.executor_args.is_empty());
        assert!(!config.color);
        assert_eq!(config.analyzer_timeout_secs, Some(120));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(Config::load_from(Some(&path)).is_err());
    }
}
