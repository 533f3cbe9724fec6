#![forbid(unsafe_code)]

//! Matcher semantics for the seven rule kinds
//!
//! Every matcher searches the masked text and reports spans into the
//! original text. Matches overlapping masked filler are discarded. Only
//! consistency and conditional checks touch the document context; only
//! script checks can fail.

use crate::engine::context::DocumentContext;
use crate::engine::masking::MaskedText;
use crate::engine::script::ScriptHost;
use crate::rules::Check;
use crate::types::{Alert, Span};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

/// One alert per non-empty match
pub(crate) fn existence(check: &Check, pattern: &Regex, text: &MaskedText<'_>) -> Vec<Alert> {
    pattern
        .find_iter(text.masked())
        .map(Span::from)
        .filter(|&span| !span.is_empty() && !text.is_masked(span))
        .map(|span| check.alert(span, &[text.original_slice(span)]))
        .collect()
}

/// A single alert covering first to last match once the count exceeds `max`
pub(crate) fn occurrence(
    check: &Check,
    pattern: &Regex,
    max: usize,
    text: &MaskedText<'_>,
) -> Vec<Alert> {
    let mut matches = pattern
        .find_iter(text.masked())
        .map(Span::from)
        .filter(|&span| !text.is_masked(span));
    let Some(first) = matches.next() else {
        return vec![];
    };

    let mut count = 1;
    let mut last = first;
    for span in matches {
        count += 1;
        last = span;
    }

    if count <= max {
        return vec![];
    }

    vec![check.alert(Span::new(first.start, last.end), &[])]
}

/// Alerts on runs of identical consecutive matches
///
/// Each repeat of the previous match's trimmed text counts once. When the
/// count exceeds `max` an alert spans the run so far, the count drops back
/// to zero and the run restarts at the current match, so a long run has to
/// build up past `max` again before the next alert. A masked match breaks
/// the run.
pub(crate) fn repetition(
    check: &Check,
    pattern: &Regex,
    max: usize,
    text: &MaskedText<'_>,
) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let mut prev = "";
    let mut run_start = 0;
    let mut count = 0;

    for m in pattern.find_iter(text.masked()) {
        if text.is_masked(Span::from(m)) {
            count = 0;
            prev = "";
            continue;
        }

        let curr = m.as_str().trim();
        let hit = !curr.is_empty() && curr == prev;

        if hit {
            count += 1;
            if count > max {
                let span = Span::new(run_start, m.end());
                let repeated = text.original_slice(Span::from(m)).trim();
                alerts.push(check.alert(span, &[repeated]));
                count = 0;
                run_start = m.start();
            }
        } else {
            count = 0;
            run_start = m.start();
        }

        prev = curr;
    }

    alerts
}

/// One alert per match, recommending the replacement paired with the
/// capture group that participated
pub(crate) fn substitution(
    check: &Check,
    pattern: &Regex,
    replacements: &[String],
    text: &MaskedText<'_>,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for caps in pattern.captures_iter(text.masked()) {
        let participating = caps
            .iter()
            .enumerate()
            .skip(1)
            .find_map(|(idx, group)| group.filter(|g| !g.is_empty()).map(|g| (idx, g)));

        let Some((idx, group)) = participating else {
            continue;
        };
        let span = Span::from(group);
        if text.is_masked(span) {
            continue;
        }
        let Some(replacement) = replacements.get(idx - 1) else {
            continue;
        };

        alerts.push(check.alert(span, &[replacement.as_str(), text.original_slice(span)]));
    }

    alerts
}

/// Alerts the first time a document has used both variants of a pair
pub(crate) fn consistency(
    check: &Check,
    pattern: &Regex,
    pairs: &[(String, String)],
    text: &MaskedText<'_>,
    ctx: &mut DocumentContext,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for caps in pattern.captures_iter(text.masked()) {
        for (a, b) in pairs {
            let (group, name) = match (caps.name(a), caps.name(b)) {
                (Some(g), _) => (g, a),
                (None, Some(g)) => (g, b),
                (None, None) => continue,
            };
            if text.is_masked(Span::from(group)) {
                continue;
            }

            let complete_before = ctx.contains(a) && ctx.contains(b);
            ctx.push(name.as_str());

            if !complete_before && ctx.contains(a) && ctx.contains(b) {
                let span = Span::from(group);
                alerts.push(check.alert(span, &[text.original_slice(span)]));
            }
        }
    }

    alerts
}

/// Flags `consequent` matches that no `antecedent` capture introduced
pub(crate) fn conditional(
    check: &Check,
    antecedent: &Regex,
    consequent: &Regex,
    exceptions: &HashSet<String>,
    text: &MaskedText<'_>,
    ctx: &mut DocumentContext,
) -> Vec<Alert> {
    for caps in antecedent.captures_iter(text.masked()) {
        if let Some(defined) = caps.get(1).filter(|g| !text.is_masked(Span::from(*g))) {
            ctx.push(defined.as_str());
        }
    }

    consequent
        .find_iter(text.masked())
        .filter(|m| !text.is_masked(Span::from(*m)))
        .filter(|m| !ctx.contains(m.as_str()) && !exceptions.contains(m.as_str()))
        .map(|m| {
            let span = Span::from(m);
            check.alert(span, &[text.original_slice(span)])
        })
        .collect()
}

/// Runs an external script and converts its records into alerts
///
/// Failures are logged and produce no alerts.
pub(crate) fn script(
    check: &Check,
    runtime: &str,
    path: &Path,
    text: &MaskedText<'_>,
    scripts: &ScriptHost,
) -> Vec<Alert> {
    match scripts.execute(runtime, path, text.original()) {
        Ok(records) => records
            .into_iter()
            .filter_map(|record| record.into_alert(check, text.original().len()))
            .collect(),
        Err(e) => {
            tracing::error!(check = %check.name, script = %path.display(), error = %e, "script check failed");
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::context::DocumentContext;
    use crate::engine::masking::Masker;
    use crate::engine::script::ScriptHost;
    use crate::rules::{Check, Definition, compile};
    use crate::types::{Alert, CheckName, Span};

    fn check(toml: &str) -> Check {
        let name = CheckName::new("Test", "Rule").unwrap();
        compile(Definition::from_toml(name, toml).unwrap(), None).unwrap()
    }

    fn run(check: &Check, text: &str) -> Vec<Alert> {
        let masked = Masker::new().mask(text, "txt");
        let mut ctx = DocumentContext::new("txt");
        check.run(&masked, &mut ctx, &ScriptHost::default())
    }

    fn spans(alerts: &[Alert]) -> Vec<Span> {
        alerts.iter().map(|a| a.span).collect()
    }

    #[test]
    fn test_existence_one_alert_per_match() {
        let check = check("extends = 'existence'\nmessage = \"Avoid '%s'.\"\ntokens = ['very']");
        let alerts = run(&check, "very good, very bad, every time");

        assert_eq!(spans(&alerts), vec![Span::new(0, 4), Span::new(11, 15)]);
        assert_eq!(alerts[0].message, "Avoid 'very'.");
    }

    #[test]
    fn test_existence_ignores_urls() {
        let check = check("extends = 'existence'\ntokens = ['example']");
        let alerts = run(&check, "See https://example.com for an example.");

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].span, Span::new(31, 38));
    }

    #[test]
    fn test_existence_raw_and_ignorecase() {
        let check = check(
            "extends = 'existence'\nignorecase = true\nraw = ['\\b(?:is|was)\\s+']\ntokens = ['done']",
        );
        let alerts = run(&check, "It WAS Done. It is done.");
        assert_eq!(spans(&alerts), vec![Span::new(3, 11), Span::new(16, 23)]);
    }

    #[test]
    fn test_occurrence_over_max() {
        let check = check("extends = 'occurrence'\nmessage = 'Too many'\ntokens = ['foo']\nmax = 2");

        let alerts = run(&check, "foo bar foo baz foo");
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].span, Span::new(0, 19));
        assert_eq!(alerts[0].message, "Too many");

        assert!(run(&check, "foo bar foo").is_empty());
        assert!(run(&check, "nothing here").is_empty());
    }

    #[test]
    fn test_repetition_resets_after_alert() {
        let check = check("extends = 'repetition'\nmessage = \"'%s' repeated\"\ntokens = ['[^\\s]+']\nmax = 1");

        let alerts = run(&check, "x x x x");
        assert_eq!(spans(&alerts), vec![Span::new(0, 5)]);
        assert_eq!(alerts[0].message, "'x' repeated");

        let alerts = run(&check, "x x x x x x");
        assert_eq!(spans(&alerts), vec![Span::new(0, 5), Span::new(4, 9)]);
    }

    #[test]
    fn test_repetition_default_max() {
        let check = check("extends = 'repetition'\ntokens = ['[^\\s]+']");
        let alerts = run(&check, "This is is a test of the the rule.");
        assert_eq!(spans(&alerts), vec![Span::new(5, 10), Span::new(21, 28)]);
    }

    #[test]
    fn test_repetition_ignores_masked_filler() {
        let check = check("extends = 'repetition'\ntokens = ['[^\\s]+']");

        assert!(run(&check, "See https://a.io https://b.io for details.").is_empty());

        let mut masker = Masker::new();
        masker.add_pattern("md", "`[^`]+`");
        let masked = masker.mask("Run `cargo` `rustc` now now", "md");
        let mut ctx = DocumentContext::new("md");
        let alerts = check.run(&masked, &mut ctx, &ScriptHost::default());
        assert_eq!(spans(&alerts), vec![Span::new(20, 27)]);
    }

    #[test]
    fn test_masked_run_restarts_repetition() {
        let check = check("extends = 'repetition'\ntokens = ['[^\\s]+']");
        assert!(run(&check, "go https://a.io go").is_empty());
    }

    #[test]
    fn test_filler_never_matched() {
        let stars = check("extends = 'existence'\nnonword = true\ntokens = ['[*]+']");
        let alerts = run(&stars, "a ** b https://a.io");
        assert_eq!(spans(&alerts), vec![Span::new(2, 4)]);

        let words = check("extends = 'occurrence'\ntokens = ['\\S+']\nmax = 2");
        assert!(run(&words, "one https://a.io two").is_empty());
    }

    #[test]
    fn test_repetition_broken_run() {
        let check = check("extends = 'repetition'\ntokens = ['[^\\s]+']");
        assert!(run(&check, "one two one two").is_empty());
    }

    #[test]
    fn test_repetition_counts_per_run() {
        let check = check("extends = 'repetition'\ntokens = ['[^\\s]+']\nmax = 1");
        assert!(run(&check, "a a b b").is_empty());
        assert_eq!(spans(&run(&check, "a a b b b")), vec![Span::new(4, 9)]);
    }

    #[test]
    fn test_substitution_replacement_alignment() {
        let toml = "extends = 'substitution'\nmessage = \"Use '%s' instead of '%s'.\"\n\
                    [swap]\nutilize = 'use'\n'in order to' = 'to'\nleverage = 'use'";
        let check = check(toml);
        let alerts = run(&check, "We leverage tools in order to utilize them.");

        let messages: Vec<&str> = alerts.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Use 'use' instead of 'leverage'.",
                "Use 'to' instead of 'in order to'.",
                "Use 'use' instead of 'utilize'.",
            ]
        );
        assert_eq!(alerts[1].span, Span::new(18, 29));
    }

    #[test]
    fn test_substitution_skips_capturing_entries() {
        let toml = "extends = 'substitution'\nmessage = \"Use '%s'.\"\n\
                    [swap]\n'(a|b)c' = 'skipped'\nfoo = 'bar'";
        let check = check(toml);
        let alerts = run(&check, "ac foo");

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].message, "Use 'bar'.");
        assert_eq!(alerts[0].span, Span::new(3, 6));
    }

    #[test]
    fn test_consistency_both_variants() {
        let toml = "extends = 'consistency'\nmessage = \"Inconsistent spelling of '%s'.\"\n\
                    [swap]\ncolor = 'colour'";
        let check = check(toml);

        let alerts = run(&check, "The color red. The colour blue. The color green.");
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].span, Span::new(19, 25));
        assert_eq!(alerts[0].message, "Inconsistent spelling of 'colour'.");

        assert!(run(&check, "The color red. The color blue.").is_empty());
    }

    #[test]
    fn test_consistency_pairs_independent() {
        let toml = "extends = 'consistency'\n[swap]\ncolor = 'colour'\ngray = 'grey'";
        let check = check(toml);

        let alerts = run(&check, "colour gray color grey");
        assert_eq!(spans(&alerts), vec![Span::new(12, 17), Span::new(18, 22)]);
    }

    #[test]
    fn test_conditional_definition_required() {
        let toml = "extends = 'conditional'\nmessage = \"'%s' has no definition.\"\n\
                    if = '\\b([A-Z]{3,5}) \\((?:[A-Z][a-z]+\\s?)+\\)'\nthen = '\\b[A-Z]{3,5}\\b'";
        let check = check(toml);

        let alerts = run(&check, "Use HTML (Hypertext Markup Language). HTML is fine. CSS is not.");
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].span, Span::new(52, 55));
        assert_eq!(alerts[0].message, "'CSS' has no definition.");
    }

    #[test]
    fn test_conditional_exceptions() {
        let toml = "extends = 'conditional'\nif = '\\b([A-Z]{3,5}) \\((?:[A-Z][a-z]+\\s?)+\\)'\n\
                    then = '\\b[A-Z]{3,5}\\b'\nexceptions = ['CSS']";
        let check = check(toml);
        assert!(run(&check, "CSS is everywhere.").is_empty());
    }

    #[test]
    fn test_matchers_are_idempotent() {
        let check = check("extends = 'existence'\ntokens = ['very']");
        let text = "very very very";
        assert_eq!(run(&check, text), run(&check, text));
    }

    #[test]
    fn test_empty_text() {
        for toml in [
            "extends = 'existence'\ntokens = ['a']",
            "extends = 'occurrence'\ntokens = ['a']\nmax = 1",
            "extends = 'repetition'\ntokens = ['a']",
            "extends = 'substitution'\n[swap]\na = 'b'",
            "extends = 'consistency'\n[swap]\na = 'b'",
        ] {
            assert!(run(&check(toml), "").is_empty(), "{toml}");
        }
    }
}
