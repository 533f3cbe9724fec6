//! Parsing and validation for the style configuration file
//!
//! The configuration carries every input the engine needs from the
//! surrounding linter: where styles live, which styles are active, which
//! individual checks are enabled, and per-format masking patterns.

use crate::error::ConfigError;
use crate::types::CheckName;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default upper bound for a single script check run
pub const DEFAULT_SCRIPT_TIMEOUT_MS: u64 = 5_000;

/// Main configuration struct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base directory holding one subdirectory per style
    pub styles_path: Option<PathBuf>,

    /// Styles applied to every format, in load order
    pub based_on_styles: Vec<String>,

    /// Styles applied only to a given normalized format tag
    pub format_styles: BTreeMap<String, Vec<String>>,

    /// Individually enabled checks (`style.rule`) from styles not loaded wholesale
    pub checks: Vec<String>,

    /// Format tag -> regex whose matches are masked before matching
    pub ignore_patterns: BTreeMap<String, String>,

    /// Timeout for one script check invocation, in milliseconds
    pub script_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            styles_path: None,
            based_on_styles: Vec::new(),
            format_styles: BTreeMap::new(),
            checks: Vec::new(),
            ignore_patterns: BTreeMap::new(),
            script_timeout_ms: DEFAULT_SCRIPT_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if self.script_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "script_timeout_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        for (format, pattern) in &self.ignore_patterns {
            Regex::new(pattern).map_err(|e| ConfigError::InvalidValue {
                field: format!("ignore_patterns.{format}"),
                message: e.to_string(),
            })?;
        }

        for check in &self.checks {
            if CheckName::parse(check).is_none() {
                return Err(ConfigError::InvalidValue {
                    field: "checks".to_string(),
                    message: format!("'{check}' is not a qualified check name (style.rule)"),
                });
            }
        }

        Ok(())
    }

    pub fn script_timeout(&self) -> Duration {
        Duration::from_millis(self.script_timeout_ms)
    }
}
