#![forbid(unsafe_code)]

//! Rule definition loading
//!
//! A rule file is a flat TOML table. Common fields (message, level, scope,
//! ...) apply to every kind; the `extends` key selects the kind and decides
//! which of the remaining fields are meaningful. Parsing normalizes the
//! record into a [`Definition`] whose [`RuleKind`] carries only the fields
//! its kind uses.

use crate::error::RuleError;
use crate::types::{CheckName, Severity};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// Scope applied when a rule file does not declare one
pub const DEFAULT_SCOPE: &str = "text";

/// TOML structure of a rule file, before validation
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDefinition {
    #[serde(alias = "type")]
    extends: Option<String>,
    message: String,
    description: String,
    level: Option<String>,
    scope: Option<String>,
    link: Option<String>,
    ignorecase: bool,
    nonword: bool,
    negate: bool,
    tokens: Vec<String>,
    raw: Vec<String>,
    #[serde(alias = "map")]
    swap: IndexMap<String, String>,
    max: usize,
    #[serde(rename = "if")]
    antecedent: Option<String>,
    #[serde(rename = "then")]
    consequent: Option<String>,
    exe: Option<String>,
    runtime: Option<String>,
    exceptions: Vec<String>,
}

/// Kind-specific fields of a definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// Flag every occurrence of any token
    Existence {
        tokens: Vec<String>,
        raw: Vec<String>,
        nonword: bool,
    },
    /// Flag a document where a pattern occurs more than `max` times
    Occurrence { token: String, max: usize },
    /// Flag consecutive repeats of the same token
    Repetition { tokens: Vec<String>, max: usize },
    /// Recommend a replacement for each matched pattern, in declaration order
    Substitution {
        swap: Vec<(String, String)>,
        nonword: bool,
    },
    /// Flag documents using both variants of a pair
    Consistency {
        pairs: Vec<(String, String)>,
        nonword: bool,
    },
    /// Flag `then` matches not introduced by an earlier `if` capture
    Conditional {
        antecedent: String,
        consequent: String,
        exceptions: Vec<String>,
    },
    /// Delegate to an external executable under the style's `scripts/` directory
    Script { exe: String, runtime: String },
    /// A kind no builder exists for; never compiled
    Unknown(String),
}

impl RuleKind {
    /// The `extends` value this kind is declared with
    pub fn name(&self) -> &str {
        match self {
            RuleKind::Existence { .. } => "existence",
            RuleKind::Occurrence { .. } => "occurrence",
            RuleKind::Repetition { .. } => "repetition",
            RuleKind::Substitution { .. } => "substitution",
            RuleKind::Consistency { .. } => "consistency",
            RuleKind::Conditional { .. } => "conditional",
            RuleKind::Script { .. } => "script",
            RuleKind::Unknown(name) => name,
        }
    }
}

/// A normalized rule definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: CheckName,
    pub message: String,
    pub description: String,
    pub severity: Severity,
    /// Opaque selector interpreted by the caller
    pub scope: String,
    pub link: Option<String>,
    pub ignorecase: bool,
    /// Accepted for compatibility with existing rule files; no matcher reads it
    pub negate: bool,
    pub kind: RuleKind,
}

impl Definition {
    /// Parse a definition from TOML content
    ///
    /// # Errors
    ///
    /// Returns `RuleError::InvalidDefinition` if the TOML is malformed, the
    /// kind is missing, or the fields required by the kind are absent.
    /// An unrecognized kind is not an error here: it yields
    /// [`RuleKind::Unknown`] and is rejected by the compiler.
    pub fn from_toml(name: CheckName, content: &str) -> Result<Self, RuleError> {
        let raw: RawDefinition = toml::from_str(content).map_err(|e| {
            RuleError::InvalidDefinition(format!("{name}: failed to parse TOML: {e}"))
        })?;

        let severity = raw
            .level
            .as_deref()
            .and_then(Severity::from_level)
            .unwrap_or_default();

        let kind = build_kind(&name, &raw)?;

        let scope = match raw.scope {
            Some(scope) if !scope.is_empty() => scope,
            _ => DEFAULT_SCOPE.to_string(),
        };

        Ok(Definition {
            name,
            message: raw.message,
            description: raw.description,
            severity,
            scope,
            link: raw.link.filter(|l| !l.is_empty()),
            ignorecase: raw.ignorecase,
            negate: raw.negate,
            kind,
        })
    }

    /// Parse a definition from a rule file on disk
    pub fn from_path(name: CheckName, path: &Path) -> Result<Self, RuleError> {
        let content = std::fs::read_to_string(path).map_err(|source| RuleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(name, &content)
    }
}

fn build_kind(name: &CheckName, raw: &RawDefinition) -> Result<RuleKind, RuleError> {
    let invalid = |msg: &str| RuleError::InvalidDefinition(format!("{name}: {msg}"));

    let Some(extends) = raw.extends.as_deref() else {
        return Err(invalid("missing 'extends'"));
    };

    let kind = match extends {
        "existence" => {
            if raw.tokens.is_empty() && raw.raw.is_empty() {
                return Err(invalid("existence rules need 'tokens' or 'raw'"));
            }
            RuleKind::Existence {
                tokens: raw.tokens.clone(),
                raw: raw.raw.clone(),
                nonword: raw.nonword,
            }
        }
        "occurrence" => {
            let Some(token) = raw.tokens.first() else {
                return Err(invalid("occurrence rules need a token"));
            };
            if raw.max < 1 {
                return Err(invalid("occurrence rules need 'max' of at least 1"));
            }
            RuleKind::Occurrence {
                token: token.clone(),
                max: raw.max,
            }
        }
        "repetition" => {
            if raw.tokens.is_empty() {
                return Err(invalid("repetition rules need 'tokens'"));
            }
            RuleKind::Repetition {
                tokens: raw.tokens.clone(),
                max: raw.max,
            }
        }
        "substitution" => {
            if raw.swap.is_empty() {
                return Err(invalid("substitution rules need 'swap'"));
            }
            RuleKind::Substitution {
                swap: pairs_of(&raw.swap),
                nonword: raw.nonword,
            }
        }
        "consistency" => {
            if raw.swap.is_empty() {
                return Err(invalid("consistency rules need 'swap'"));
            }
            RuleKind::Consistency {
                pairs: pairs_of(&raw.swap),
                nonword: raw.nonword,
            }
        }
        "conditional" => {
            let (Some(antecedent), Some(consequent)) = (&raw.antecedent, &raw.consequent) else {
                return Err(invalid("conditional rules need both 'if' and 'then'"));
            };
            RuleKind::Conditional {
                antecedent: antecedent.clone(),
                consequent: consequent.clone(),
                exceptions: raw.exceptions.clone(),
            }
        }
        "script" => {
            let (Some(exe), Some(runtime)) = (&raw.exe, &raw.runtime) else {
                return Err(invalid("script rules need both 'exe' and 'runtime'"));
            };
            RuleKind::Script {
                exe: exe.clone(),
                runtime: runtime.clone(),
            }
        }
        other => RuleKind::Unknown(other.to_string()),
    };

    Ok(kind)
}

fn pairs_of(map: &IndexMap<String, String>) -> Vec<(String, String)> {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}
