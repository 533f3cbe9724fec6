#![forbid(unsafe_code)]

//! Compilation of definitions into checks
//!
//! Each rule kind has one builder that assembles the final regular
//! expression(s) from the definition's fragments. Word rules wrap their
//! token disjunction in `\b(?:...)\b`; non-word rules use a bare
//! `(?:...)` group. `ignorecase` prepends `(?i)`.

use crate::error::RuleError;
use crate::rules::definition::{Definition, RuleKind};
use crate::rules::{Check, Matcher};
use crate::types::CheckName;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

const IGNORE_CASE: &str = "(?i)";

/// Directory inside a style that holds script rule executables
pub const SCRIPTS_DIR: &str = "scripts";

/// Compile a definition into an executable check
///
/// `styles_path` is the base directory scripts are resolved against.
///
/// # Errors
///
/// Returns `RuleError` if:
/// - The definition's kind is unknown
/// - An assembled pattern does not compile
/// - A substitution has no usable entries
/// - A script cannot be located
pub fn compile(definition: Definition, styles_path: Option<&Path>) -> Result<Check, RuleError> {
    let name = &definition.name;
    let prefix = if definition.ignorecase { IGNORE_CASE } else { "" };

    let (extends, matcher) = match &definition.kind {
        RuleKind::Existence {
            tokens,
            raw,
            nonword,
        } => {
            let mut regex = format!("{prefix}{}", raw.concat());
            let wrapped = wrap(&tokens.join("|"), *nonword || tokens.is_empty());
            regex.push_str(&wrapped);
            let pattern = build_regex(name, &regex)?;
            ("existence", Matcher::Existence { pattern })
        }
        RuleKind::Occurrence { token, max } => {
            let pattern = build_regex(name, &format!("{prefix}{token}"))?;
            ("occurrence", Matcher::Occurrence { pattern, max: *max })
        }
        RuleKind::Repetition { tokens, max } => {
            let pattern = build_regex(name, &format!("{prefix}({})", tokens.join("|")))?;
            ("repetition", Matcher::Repetition { pattern, max: *max })
        }
        RuleKind::Substitution { swap, nonword } => {
            let (pattern, replacements) = substitution_parts(name, swap, prefix, *nonword)?;
            (
                "substitution",
                Matcher::Substitution {
                    pattern,
                    replacements,
                },
            )
        }
        RuleKind::Consistency { pairs, nonword } => {
            let key = group_key(name);
            let mut alternatives = Vec::with_capacity(pairs.len() * 2);
            let mut groups = Vec::with_capacity(pairs.len());

            for (i, (first, second)) in pairs.iter().enumerate() {
                let a = format!("{key}{}", i * 2);
                let b = format!("{key}{}", i * 2 + 1);
                alternatives.push(format!("(?P<{a}>{first})"));
                alternatives.push(format!("(?P<{b}>{second})"));
                groups.push((a, b));
            }

            let regex = format!("{prefix}{}", wrap(&alternatives.join("|"), *nonword));
            let pattern = build_regex(name, &regex)?;
            (
                "consistency",
                Matcher::Consistency {
                    pattern,
                    pairs: groups,
                },
            )
        }
        RuleKind::Conditional {
            antecedent,
            consequent,
            exceptions,
        } => {
            let antecedent = build_regex(name, &format!("{prefix}{antecedent}"))?;
            if antecedent.captures_len() < 2 {
                return Err(RuleError::InvalidDefinition(format!(
                    "{name}: 'if' pattern needs a capture group"
                )));
            }
            let consequent = build_regex(name, &format!("{prefix}{consequent}"))?;
            (
                "conditional",
                Matcher::Conditional {
                    antecedent,
                    consequent,
                    exceptions: exceptions.iter().cloned().collect::<HashSet<_>>(),
                },
            )
        }
        RuleKind::Script { exe, runtime } => {
            let Some(base) = styles_path else {
                return Err(RuleError::InvalidDefinition(format!(
                    "{name}: script rules need a styles path"
                )));
            };
            let path = base.join(name.style()).join(SCRIPTS_DIR).join(exe);
            if !path.is_file() {
                return Err(RuleError::MissingScript(path));
            }
            (
                "script",
                Matcher::Script {
                    runtime: runtime.clone(),
                    path,
                },
            )
        }
        RuleKind::Unknown(kind) => return Err(RuleError::UnsupportedKind(kind.clone())),
    };

    Ok(Check {
        name: definition.name,
        severity: definition.severity,
        scope: definition.scope,
        extends,
        message: definition.message,
        description: definition.description,
        link: definition.link,
        matcher,
    })
}

fn wrap(tokens: &str, nonword: bool) -> String {
    if nonword {
        format!("(?:{tokens})")
    } else {
        format!(r"\b(?:{tokens})\b")
    }
}

fn build_regex(name: &CheckName, pattern: &str) -> Result<Regex, RuleError> {
    Regex::new(pattern).map_err(|e| {
        RuleError::InvalidRegex(format!(
            "{name}: failed to compile pattern '{pattern}': {e}"
        ))
    })
}

/// Assembles the substitution pattern and its aligned replacement list
///
/// Entries whose pattern is invalid or has capture groups of its own are
/// skipped, so capture group `i + 1` always pairs with replacement `i`.
fn substitution_parts(
    name: &CheckName,
    swap: &[(String, String)],
    prefix: &str,
    nonword: bool,
) -> Result<(Regex, Vec<String>), RuleError> {
    let mut groups = Vec::with_capacity(swap.len());
    let mut replacements = Vec::with_capacity(swap.len());

    for (pattern, replacement) in swap {
        match Regex::new(pattern) {
            Ok(re) if re.captures_len() == 1 => {
                groups.push(format!("({pattern})"));
                replacements.push(replacement.clone());
            }
            Ok(_) => {
                tracing::debug!(check = %name, pattern = %pattern, "skipping swap entry with capture groups");
            }
            Err(e) => {
                tracing::debug!(check = %name, pattern = %pattern, error = %e, "skipping invalid swap entry");
            }
        }
    }

    if groups.is_empty() {
        return Err(RuleError::InvalidDefinition(format!(
            "{name}: no usable 'swap' entries"
        )));
    }

    let regex = format!("{prefix}{}", wrap(&groups.join("|"), nonword));
    Ok((build_regex(name, &regex)?, replacements))
}

/// Capture group name prefix derived from a check name
fn group_key(name: &CheckName) -> String {
    let mut key: String = name
        .as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if key.starts_with(|c: char| c.is_ascii_digit()) {
        key.insert(0, '_');
    }
    key.push('_');
    key
}
