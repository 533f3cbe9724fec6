#![forbid(unsafe_code)]

//! Execution engine for running checks over documents
//!
//! The engine owns nothing per document: every scan masks the text once,
//! creates a fresh [`DocumentContext`], runs the active checks in registry
//! order and returns their alerts. Batches of documents are scanned in
//! parallel using rayon, sharing the read-only registry.

use crate::config::Config;
use crate::engine::context::DocumentContext;
use crate::engine::masking::Masker;
use crate::engine::script::{ScriptHost, ScriptRunner};
use crate::rules::{Check, Registry};
use crate::types::Alert;
use rayon::prelude::*;
use std::sync::Arc;

/// A document handed to the engine by the caller
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    pub text: &'a str,
    /// Normalized format tag (e.g. `md`) selecting the ignore pattern
    pub format: &'a str,
}

impl<'a> Document<'a> {
    pub fn new(text: &'a str, format: &'a str) -> Self {
        Self { text, format }
    }
}

/// Result of scanning a batch of documents
#[derive(Debug)]
pub struct ExecutionResult {
    /// Alerts per document, in input order
    pub alerts: Vec<Vec<Alert>>,
    /// Number of documents scanned
    pub documents_checked: usize,
    /// Number of checks available to each scan
    pub checks_executed: usize,
}

/// Runs registered checks over documents
pub struct ExecutionEngine {
    registry: Arc<Registry>,
    masker: Masker,
    scripts: ScriptHost,
}

impl ExecutionEngine {
    /// Creates an engine with masking and script settings from `config`
    pub fn new(registry: Arc<Registry>, config: &Config) -> Self {
        Self {
            registry,
            masker: Masker::from_config(config),
            scripts: ScriptHost::new(config.script_timeout()),
        }
    }

    /// Replaces the process layer used by script checks
    pub fn with_script_runner(mut self, runner: impl ScriptRunner + 'static) -> Self {
        self.scripts = ScriptHost::with_runner(runner, self.scripts.timeout());
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Runs every registered check over one document
    pub fn check_document(&self, document: Document<'_>) -> Vec<Alert> {
        self.check_document_with(document, |_| true)
    }

    /// Runs the checks accepted by `active` over one document
    pub fn check_document_with<F>(&self, document: Document<'_>, active: F) -> Vec<Alert>
    where
        F: Fn(&Check) -> bool,
    {
        let text = self.masker.mask(document.text, document.format);
        let mut ctx = DocumentContext::new(document.format);

        let mut alerts = Vec::new();
        for check in self.registry.iter().filter(|&check| active(check)) {
            alerts.extend(check.run(&text, &mut ctx, &self.scripts));
        }
        alerts
    }

    /// Scans a batch of documents in parallel
    pub fn execute(&self, documents: &[Document<'_>]) -> ExecutionResult {
        let alerts: Vec<Vec<Alert>> = documents
            .par_iter()
            .map(|document| self.check_document(*document))
            .collect();

        ExecutionResult {
            alerts,
            documents_checked: documents.len(),
            checks_executed: self.registry.len(),
        }
    }
}

impl std::fmt::Debug for ExecutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("checks", &self.registry.len())
            .field("masker", &self.masker)
            .field("scripts", &self.scripts)
            .finish()
    }
}
