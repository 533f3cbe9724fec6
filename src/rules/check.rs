#![forbid(unsafe_code)]

//! Compiled checks
//!
//! A [`Check`] is plain data: the compiled [`Matcher`] plus the metadata
//! needed to turn matches into alerts. Checks are built once by the
//! compiler and never mutated afterwards.

use crate::engine::context::DocumentContext;
use crate::engine::masking::MaskedText;
use crate::engine::script::ScriptHost;
use crate::rules::matchers;
use crate::types::{Alert, CheckName, Severity, Span};
use regex::Regex;
use std::collections::HashSet;
use std::path::PathBuf;

/// The executable part of a check, one variant per rule kind
#[derive(Debug, Clone)]
pub enum Matcher {
    Existence {
        pattern: Regex,
    },
    Occurrence {
        pattern: Regex,
        max: usize,
    },
    Repetition {
        pattern: Regex,
        max: usize,
    },
    /// `replacements[i]` pairs with capture group `i + 1` of `pattern`
    Substitution {
        pattern: Regex,
        replacements: Vec<String>,
    },
    /// Each pair holds the capture group names of two inconsistent variants
    Consistency {
        pattern: Regex,
        pairs: Vec<(String, String)>,
    },
    Conditional {
        antecedent: Regex,
        consequent: Regex,
        exceptions: HashSet<String>,
    },
    Script {
        runtime: String,
        path: PathBuf,
    },
}

/// A compiled, immutable rule
#[derive(Debug, Clone)]
pub struct Check {
    pub name: CheckName,
    pub severity: Severity,
    /// Opaque selector used by the caller to decide where the check applies
    pub scope: String,
    /// Kind the check was declared with (`existence`, `script`, ...)
    pub extends: &'static str,
    pub message: String,
    pub description: String,
    pub link: Option<String>,
    pub matcher: Matcher,
}

impl Check {
    /// Integer rank of this check's severity
    pub fn level(&self) -> u8 {
        self.severity.rank()
    }

    /// Runs the check over one document
    ///
    /// `text` must be the masked form of the document the context belongs
    /// to. Only script checks can fail; they log and return no alerts.
    pub fn run(
        &self,
        text: &MaskedText<'_>,
        ctx: &mut DocumentContext,
        scripts: &ScriptHost,
    ) -> Vec<Alert> {
        match &self.matcher {
            Matcher::Existence { pattern } => matchers::existence(self, pattern, text),
            Matcher::Occurrence { pattern, max } => {
                matchers::occurrence(self, pattern, *max, text)
            }
            Matcher::Repetition { pattern, max } => {
                matchers::repetition(self, pattern, *max, text)
            }
            Matcher::Substitution {
                pattern,
                replacements,
            } => matchers::substitution(self, pattern, replacements, text),
            Matcher::Consistency { pattern, pairs } => {
                matchers::consistency(self, pattern, pairs, text, ctx)
            }
            Matcher::Conditional {
                antecedent,
                consequent,
                exceptions,
            } => matchers::conditional(self, antecedent, consequent, exceptions, text, ctx),
            Matcher::Script { runtime, path } => {
                matchers::script(self, runtime, path, text, scripts)
            }
        }
    }

    /// Builds an alert with `%s` placeholders filled from `args`
    pub(crate) fn alert(&self, span: Span, args: &[&str]) -> Alert {
        Alert {
            check: self.name.to_string(),
            severity: self.severity,
            span,
            message: format_message(&self.message, args),
            description: format_message(&self.description, args),
            link: self.link.clone(),
        }
    }
}

/// Substitutes `%s` placeholders left to right
///
/// Placeholders without a matching argument are left as they are.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;

    while let Some(idx) = rest.find("%s") {
        out.push_str(&rest[..idx]);
        match args.next() {
            Some(arg) => out.push_str(arg),
            None => out.push_str("%s"),
        }
        rest = &rest[idx + 2..];
    }
    out.push_str(rest);
    out
}
