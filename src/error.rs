//! Error types for the style-rule engine
//!
//! Errors are grouped by concern: configuration, rule loading/compilation,
//! and external script execution. `StyleError` wraps all of them.

use std::path::PathBuf;

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid configuration syntax
    #[error("Invalid configuration syntax: {0}")]
    InvalidSyntax(String),

    /// Invalid configuration value
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// Configuration file could not be read
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::InvalidSyntax(e.to_string())
    }
}

/// Rule-related errors
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Invalid rule definition
    #[error("Invalid rule definition: {0}")]
    InvalidDefinition(String),

    /// The rule declares a kind no builder exists for
    #[error("Unsupported rule kind '{0}'")]
    UnsupportedKind(String),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(String),

    /// A check with the same qualified name is already registered
    #[error("Duplicate check '{0}'")]
    Duplicate(String),

    /// Script referenced by a script rule does not exist
    #[error("Script not found: {}", .0.display())]
    MissingScript(PathBuf),

    /// Rule file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors raised while running an external script check
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// The process could not be started
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// The process exited unsuccessfully
    #[error("Script exited with status {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    /// The process did not finish within the configured timeout
    #[error("Script timed out after {0} ms")]
    Timeout(u128),

    /// Standard output was not a JSON array of alerts
    #[error("Malformed script output: {0}")]
    MalformedOutput(#[from] serde_json::Error),

    /// I/O failure while talking to the process
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error type
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rule error
    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    /// Script error
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),
}
