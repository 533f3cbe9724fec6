#![forbid(unsafe_code)]

//! Check registry
//!
//! The registry maps qualified check names to compiled checks. It is
//! filled once (see [`crate::rules::resolver`]) and then shared read-only
//! between document scans. Registration is append-only: the first check
//! registered under a name wins and later ones are rejected.

use crate::config::Config;
use crate::error::RuleError;
use crate::rules::Check;
use crate::rules::resolver::{self, LoadReport};
use indexmap::IndexMap;

/// Registry of compiled checks, in registration order
#[derive(Debug, Default)]
pub struct Registry {
    checks: IndexMap<String, Check>,
}

impl Registry {
    /// Create a new empty Registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry for a configuration
    ///
    /// Loads the built-in style followed by the configured styles and
    /// checks. Rules that fail to load are skipped and listed in the
    /// returned report.
    pub fn from_config(config: &Config) -> (Self, LoadReport) {
        resolver::resolve(config)
    }

    /// Add a compiled check
    ///
    /// # Errors
    ///
    /// Returns `RuleError::Duplicate` if a check with the same name is
    /// already registered; the existing check is kept.
    pub fn register(&mut self, check: Check) -> Result<(), RuleError> {
        let key = check.name.to_string();
        if self.checks.contains_key(&key) {
            return Err(RuleError::Duplicate(key));
        }
        self.checks.insert(key, check);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    /// Get a check by its qualified name
    pub fn get(&self, name: &str) -> Option<&Check> {
        self.checks.get(name)
    }

    /// Iterate over all checks in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Check> {
        self.checks.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.checks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
