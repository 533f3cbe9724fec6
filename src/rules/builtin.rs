#![forbid(unsafe_code)]

//! Built-in style embedded at compile time
//!
//! The default `vale` style is compiled into the binary using
//! `include_str!`, so it is available without any style directory.

use crate::error::RuleError;
use crate::rules::{Check, Definition, compile};
use crate::types::CheckName;

/// Name of the built-in style
pub const BUILTIN_STYLE: &str = "vale";

/// Embedded built-in rule files
const BUILTIN_RULES: &[(&str, &str)] = &[
    (
        "Abbreviations",
        include_str!("../../builtin-styles/vale/Abbreviations.toml"),
    ),
    (
        "Annotations",
        include_str!("../../builtin-styles/vale/Annotations.toml"),
    ),
    (
        "ComplexWords",
        include_str!("../../builtin-styles/vale/ComplexWords.toml"),
    ),
    (
        "Editorializing",
        include_str!("../../builtin-styles/vale/Editorializing.toml"),
    ),
    (
        "GenderBias",
        include_str!("../../builtin-styles/vale/GenderBias.toml"),
    ),
    (
        "Hedging",
        include_str!("../../builtin-styles/vale/Hedging.toml"),
    ),
    (
        "Litotes",
        include_str!("../../builtin-styles/vale/Litotes.toml"),
    ),
    (
        "PassiveVoice",
        include_str!("../../builtin-styles/vale/PassiveVoice.toml"),
    ),
    (
        "Redundancy",
        include_str!("../../builtin-styles/vale/Redundancy.toml"),
    ),
    (
        "Repetition",
        include_str!("../../builtin-styles/vale/Repetition.toml"),
    ),
    (
        "Uncomparables",
        include_str!("../../builtin-styles/vale/Uncomparables.toml"),
    ),
    (
        "Wordiness",
        include_str!("../../builtin-styles/vale/Wordiness.toml"),
    ),
];

/// Names of the built-in rules, in load order
pub fn builtin_rule_names() -> impl Iterator<Item = &'static str> {
    BUILTIN_RULES.iter().map(|(name, _)| *name)
}

/// Compile every built-in rule
///
/// Returns one entry per rule so a broken rule cannot take the others down.
pub fn load_builtin_checks() -> Vec<(&'static str, Result<Check, RuleError>)> {
    BUILTIN_RULES
        .iter()
        .map(|(rule_name, toml_content)| {
            let result = CheckName::new(BUILTIN_STYLE, rule_name)
                .ok_or_else(|| {
                    RuleError::InvalidDefinition(format!("Invalid built-in rule name '{rule_name}'"))
                })
                .and_then(|name| Definition::from_toml(name, toml_content))
                .and_then(|def| compile(def, None));
            (*rule_name, result)
        })
        .collect()
}
