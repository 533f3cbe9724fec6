#![forbid(unsafe_code)]

//! Style resolution
//!
//! Walks the configured style directories and feeds every rule file through
//! loading, compilation and registration. A style directory holds one TOML
//! file per rule; the check is named `<style directory>.<file stem>`. The
//! `scripts/` subdirectory and hidden files are never read as rules.
//!
//! Nothing here aborts: a rule that fails to load is recorded in the
//! [`LoadReport`], logged, and skipped.

use crate::config::Config;
use crate::error::RuleError;
use crate::rules::builtin::{self, BUILTIN_STYLE};
use crate::rules::{Check, Definition, Registry, compile};
use crate::types::CheckName;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Extension of rule files inside a style directory
pub const RULE_EXTENSION: &str = "toml";

/// A rule (or style) that could not be loaded
#[derive(Debug)]
pub struct LoadIssue {
    /// File path or check name the issue refers to
    pub source: String,
    pub error: RuleError,
}

/// Outcome of building a registry
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Styles loaded wholesale, in load order
    pub loaded_styles: Vec<String>,
    pub issues: Vec<LoadIssue>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Incrementally builds a registry from styles and single rules
#[derive(Debug)]
pub struct StyleResolver {
    styles_path: Option<PathBuf>,
    registry: Registry,
    report: LoadReport,
}

impl StyleResolver {
    pub fn new(styles_path: Option<&Path>) -> Self {
        Self {
            styles_path: styles_path.map(Path::to_path_buf),
            registry: Registry::new(),
            report: LoadReport::default(),
        }
    }

    pub fn is_loaded(&self, style: &str) -> bool {
        self.report.loaded_styles.iter().any(|s| s == style)
    }

    /// Registers the embedded built-in style
    pub fn load_builtin(&mut self) {
        for (rule, result) in builtin::load_builtin_checks() {
            let source = format!("{BUILTIN_STYLE}.{rule}");
            self.add(source, result);
        }
        self.report.loaded_styles.push(BUILTIN_STYLE.to_string());
    }

    /// Loads every rule file of `<styles_path>/<style>`
    pub fn load_style(&mut self, style: &str) {
        if self.is_loaded(style) {
            return;
        }

        let Some(base) = self.styles_path.clone() else {
            self.issue(
                style.to_string(),
                RuleError::InvalidDefinition(format!(
                    "style '{style}' requested but no styles path is configured"
                )),
            );
            return;
        };

        let dir = base.join(style);
        if !dir.is_dir() {
            self.issue(
                dir.display().to_string(),
                RuleError::InvalidDefinition(format!("style directory not found: {}", dir.display())),
            );
            return;
        }

        let walker = WalkBuilder::new(&dir)
            .standard_filters(false)
            .hidden(true)
            .max_depth(Some(1))
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.issue(
                        dir.display().to_string(),
                        RuleError::InvalidDefinition(format!("failed to walk style: {e}")),
                    );
                    continue;
                }
            };

            let path = entry.path();
            if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if path.extension().and_then(|s| s.to_str()) != Some(RULE_EXTENSION) {
                continue;
            }

            self.load_rule_file(style, path);
        }

        tracing::debug!(style = %style, dir = %dir.display(), "loaded style");
        self.report.loaded_styles.push(style.to_string());
    }

    /// Loads one rule file `<styles_path>/<style>/<rule>.toml`
    pub fn load_check(&mut self, name: &CheckName) {
        let Some(base) = self.styles_path.clone() else {
            self.issue(
                name.to_string(),
                RuleError::InvalidDefinition(format!(
                    "check '{name}' requested but no styles path is configured"
                )),
            );
            return;
        };

        let path = base
            .join(name.style())
            .join(format!("{}.{RULE_EXTENSION}", name.rule()));
        self.load_rule_file(name.style(), &path);
    }

    fn load_rule_file(&mut self, style: &str, path: &Path) {
        let source = path.display().to_string();

        // Everything up to the first dot names the rule.
        let stem = path
            .file_name()
            .and_then(|f| f.to_str())
            .and_then(|f| f.split('.').next())
            .unwrap_or_default();

        let Some(name) = CheckName::new(style, stem) else {
            self.issue(
                source,
                RuleError::InvalidDefinition(format!("invalid check name '{style}.{stem}'")),
            );
            return;
        };

        if self.registry.contains(name.as_str()) {
            self.issue(source, RuleError::Duplicate(name.to_string()));
            return;
        }

        let styles_path = self.styles_path.as_deref();
        let result = Definition::from_path(name, path).and_then(|def| compile(def, styles_path));
        self.add(source, result);
    }

    fn add(&mut self, source: String, result: Result<Check, RuleError>) {
        match result.and_then(|check| self.registry.register(check)) {
            Ok(()) => {}
            Err(error) => self.issue(source, error),
        }
    }

    fn issue(&mut self, source: String, error: RuleError) {
        tracing::error!(source = %source, error = %error, "rule not loaded");
        self.report.issues.push(LoadIssue { source, error });
    }

    pub fn finish(self) -> (Registry, LoadReport) {
        (self.registry, self.report)
    }
}

/// Builds the registry for `config`
///
/// Load order: the built-in style, `based_on_styles`, the styles of each
/// format in `format_styles` (formats sorted), then every entry of `checks`
/// whose style was not already loaded.
pub fn resolve(config: &Config) -> (Registry, LoadReport) {
    let mut resolver = StyleResolver::new(config.styles_path.as_deref());
    resolver.load_builtin();

    if config.styles_path.is_none() {
        return resolver.finish();
    }

    for style in &config.based_on_styles {
        resolver.load_style(style);
    }

    for styles in config.format_styles.values() {
        for style in styles {
            resolver.load_style(style);
        }
    }

    for check in &config.checks {
        let Some(name) = CheckName::parse(check) else {
            resolver.issue(
                check.clone(),
                RuleError::InvalidDefinition(format!("invalid check name '{check}'")),
            );
            continue;
        };
        if !resolver.is_loaded(name.style()) {
            resolver.load_check(&name);
        }
    }

    resolver.finish()
}
