#![forbid(unsafe_code)]

//! Core domain types
//!
//! Severity levels, qualified check names, byte spans and the alert record
//! every matcher produces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert severity levels, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Suggestion,
    Warning,
    Error,
}

impl Severity {
    /// Parses a level name, returning None for anything unrecognized
    pub fn from_level(level: &str) -> Option<Self> {
        match level {
            "suggestion" => Some(Severity::Suggestion),
            "warning" => Some(Severity::Warning),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }

    /// Integer rank used by callers to compare against a minimum alert level
    pub fn rank(self) -> u8 {
        match self {
            Severity::Suggestion => 0,
            Severity::Warning => 1,
            Severity::Error => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Suggestion => "suggestion",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, qualified check name of the form `style.rule`
///
/// Both halves must be non-empty and contain only alphanumeric characters,
/// hyphens, and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CheckName {
    full: String,
    dot: usize,
}

impl CheckName {
    /// Creates a qualified name from its style and rule halves
    ///
    /// Returns None if either half is empty or contains invalid characters
    pub fn new(style: &str, rule: &str) -> Option<Self> {
        if !is_valid_segment(style) || !is_valid_segment(rule) {
            return None;
        }
        Some(CheckName {
            full: format!("{style}.{rule}"),
            dot: style.len(),
        })
    }

    /// Parses a `style.rule` string
    pub fn parse(name: &str) -> Option<Self> {
        let (style, rule) = name.split_once('.')?;
        Self::new(style, rule)
    }

    pub fn style(&self) -> &str {
        &self.full[..self.dot]
    }

    pub fn rule(&self) -> &str {
        &self.full[self.dot + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.full
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl TryFrom<String> for CheckName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CheckName::parse(&value).ok_or_else(|| format!("Invalid check name '{value}'"))
    }
}

impl From<CheckName> for String {
    fn from(name: CheckName) -> Self {
        name.full
    }
}

/// A half-open byte interval `[start, end)` into the original document text
///
/// Serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl From<[usize; 2]> for Span {
    fn from([start, end]: [usize; 2]) -> Self {
        Span { start, end }
    }
}

impl From<Span> for [usize; 2] {
    fn from(span: Span) -> Self {
        [span.start, span.end]
    }
}

impl From<regex::Match<'_>> for Span {
    fn from(m: regex::Match<'_>) -> Self {
        Span::new(m.start(), m.end())
    }
}

/// One reported style violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Qualified name of the check that raised this alert
    pub check: String,

    pub severity: Severity,

    /// Location in the original (unmasked) text
    pub span: Span,

    pub message: String,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}
