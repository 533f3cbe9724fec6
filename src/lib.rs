#![forbid(unsafe_code)]

//! Stylerules: a rule-driven prose linter core
//!
//! Style rules are declared in TOML files grouped into style directories.
//! Each rule extends one of seven check kinds (existence, substitution,
//! occurrence, repetition, consistency, conditional, script). The crate
//! loads and compiles the rules into a [`Registry`] and runs them over
//! document text with an [`ExecutionEngine`], producing [`Alert`]s.

pub mod config;
pub mod engine;
pub mod error;
pub mod rules;
pub mod types;

// Re-export error types for convenient access
pub use error::{ConfigError, RuleError, ScriptError, StyleError};

// Re-export core domain types for convenient access
pub use config::Config;
pub use engine::{Document, ExecutionEngine, ExecutionResult};
pub use rules::{Check, LoadReport, Registry};
pub use types::{Alert, CheckName, Severity, Span};
