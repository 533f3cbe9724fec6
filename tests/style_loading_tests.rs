//! Integration tests for style resolution
//!
//! Loads styles from the fixture tree and from temporary directories and
//! checks what ends up in the registry and in the load report.

#[macro_use]
mod common;

use common::{fixture_styles, write_rule};
use stylerules::config::Config;
use stylerules::error::RuleError;
use stylerules::rules::{Matcher, Registry, StyleResolver};
use stylerules::types::{CheckName, Severity};
use tempfile::TempDir;

fn fixture_config() -> Config {
    Config {
        styles_path: Some(fixture_styles()),
        based_on_styles: vec!["Acme".to_string()],
        checks: vec!["Docs.Headings".to_string()],
        ..Config::default()
    }
}

#[test]
fn test_fixture_styles_load_cleanly() {
    let (registry, report) = Registry::from_config(&fixture_config());

    assert!(report.is_clean(), "{:?}", report.issues);
    assert_eq!(report.loaded_styles, vec!["vale", "Acme"]);
    assert_eq!(registry.len(), 12 + 5 + 1);

    let acme: Vec<&str> = registry.names().filter(|n| n.starts_with("Acme.")).collect();
    assert_eq!(
        acme,
        vec!["Acme.Acronyms", "Acme.Exclaim", "Acme.Simpler", "Acme.Spelling", "Acme.Very"]
    );
    assert_eq!(registry.names().last(), Some("Docs.Headings"));
}

#[test]
fn test_fixture_check_metadata() {
    let (registry, _) = Registry::from_config(&fixture_config());

    let very = assert_some!(registry.get("Acme.Very"));
    assert_eq!(very.severity, Severity::Warning);
    assert_eq!(very.extends, "existence");
    assert_eq!(very.scope, "text");

    let spelling = assert_some!(registry.get("Acme.Spelling"));
    assert_eq!(spelling.level(), 2);
    let Matcher::Consistency { pairs, .. } = &spelling.matcher else {
        panic!("expected consistency matcher");
    };
    assert_eq!(pairs.len(), 2);

    let simpler = assert_some!(registry.get("Acme.Simpler"));
    assert_eq!(simpler.link.as_deref(), Some("https://example.com/simpler"));

    let headings = assert_some!(registry.get("Docs.Headings"));
    assert_eq!(headings.scope, "heading");
    assert_eq!(headings.severity, Severity::Suggestion);

    let exclaim = assert_some!(registry.get("Acme.Exclaim"));
    let Matcher::Script { runtime, path } = &exclaim.matcher else {
        panic!("expected script matcher");
    };
    assert_eq!(runtime, "sh");
    assert!(path.ends_with("Acme/scripts/exclaim.sh"));
}

#[test]
fn test_format_styles_loaded() {
    let config = Config {
        styles_path: Some(fixture_styles()),
        format_styles: [("md".to_string(), vec!["Docs".to_string()])]
            .into_iter()
            .collect(),
        ..Config::default()
    };

    let (registry, report) = Registry::from_config(&config);
    assert!(report.is_clean(), "{:?}", report.issues);
    assert_eq!(report.loaded_styles, vec!["vale", "Docs"]);
    assert!(registry.contains("Docs.Headings"));
    assert!(!registry.contains("Acme.Very"));
}

#[test]
fn test_single_check_from_unloaded_style() {
    let config = Config {
        styles_path: Some(fixture_styles()),
        checks: vec!["Acme.Very".to_string(), "Acme.Missing".to_string()],
        ..Config::default()
    };

    let (registry, report) = Registry::from_config(&config);

    assert!(registry.contains("Acme.Very"));
    assert!(!registry.contains("Acme.Spelling"));
    assert_eq!(report.issues.len(), 1);
    assert!(matches!(report.issues[0].error, RuleError::Read { .. }));
    assert!(report.issues[0].source.ends_with("Missing.toml"));
}

#[test]
fn test_styles_ignored_without_styles_path() {
    let config = Config {
        based_on_styles: vec!["Acme".to_string()],
        ..Config::default()
    };

    let (registry, report) = Registry::from_config(&config);
    assert_eq!(registry.len(), 12);
    assert_eq!(report.loaded_styles, vec!["vale"]);
}

#[test]
fn test_script_rule_without_script_rejected() {
    let temp_dir = TempDir::new().unwrap();
    write_rule(
        temp_dir.path(),
        "Local",
        "Lint.toml",
        "extends = 'script'\nexe = 'lint.py'\nruntime = 'python3'",
    );
    write_rule(temp_dir.path(), "Local", "Ok.toml", "extends = 'existence'\ntokens = ['ok']");

    let mut resolver = StyleResolver::new(Some(temp_dir.path()));
    resolver.load_style("Local");
    let (registry, report) = resolver.finish();

    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Local.Ok"]);
    assert_eq!(report.issues.len(), 1);
    match &report.issues[0].error {
        RuleError::MissingScript(path) => assert!(path.ends_with("Local/scripts/lint.py")),
        other => panic!("Expected MissingScript, got {other:?}"),
    }
}

#[test]
fn test_rule_name_from_file_stem() {
    let temp_dir = TempDir::new().unwrap();
    write_rule(
        temp_dir.path(),
        "Local",
        "Terms.v2.toml",
        "extends = 'existence'\ntokens = ['term']",
    );

    let mut resolver = StyleResolver::new(Some(temp_dir.path()));
    resolver.load_style("Local");
    let (registry, report) = resolver.finish();

    assert!(report.is_clean(), "{:?}", report.issues);
    assert!(registry.contains("Local.Terms"));
}

#[test]
fn test_invalid_rules_reported_with_source() {
    let temp_dir = TempDir::new().unwrap();
    let bad = write_rule(temp_dir.path(), "Local", "Empty.toml", "extends = 'existence'");
    write_rule(temp_dir.path(), "Local", "Kindless.toml", "message = 'no kind'");

    let mut resolver = StyleResolver::new(Some(temp_dir.path()));
    resolver.load_style("Local");
    let (registry, report) = resolver.finish();

    assert!(registry.is_empty());
    assert_eq!(report.issues.len(), 2);
    assert_eq!(report.issues[0].source, bad.display().to_string());
    assert!(
        report
            .issues
            .iter()
            .all(|i| matches!(i.error, RuleError::InvalidDefinition(_)))
    );
}

#[test]
fn test_load_check_by_name() {
    let mut resolver = StyleResolver::new(Some(&fixture_styles()));
    resolver.load_check(&CheckName::parse("Docs.Headings").unwrap());
    let (registry, report) = resolver.finish();

    assert!(report.is_clean(), "{:?}", report.issues);
    assert_eq!(registry.len(), 1);
    assert!(report.loaded_styles.is_empty());
}
