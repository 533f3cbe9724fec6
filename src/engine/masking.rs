//! Offset-preserving masking of ignorable text
//!
//! URLs and any format-specific ignore pattern are overwritten with `*`,
//! one per byte, so byte offsets found in the masked copy are valid in the
//! original text. The masked ranges are kept so matchers can discard
//! matches that touch filler.

use crate::config::Config;
use crate::types::Span;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

const URL_PATTERN: &str = r"(?:https?|ftp)://[^\s/$.?#].[^\s]*";

/// Filler written over masked bytes
pub const MASK_CHAR: char = '*';

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(URL_PATTERN).expect("URL pattern is valid"));

/// A document's text alongside its masked working copy
#[derive(Debug, Clone)]
pub struct MaskedText<'a> {
    original: &'a str,
    masked: Cow<'a, str>,
    /// Sorted, disjoint `[start, end)` ranges overwritten with filler
    ranges: Vec<Span>,
}

impl<'a> MaskedText<'a> {
    /// Wraps text that needs no masking
    pub fn unmasked(original: &'a str) -> Self {
        Self {
            original,
            masked: Cow::Borrowed(original),
            ranges: Vec::new(),
        }
    }

    pub fn original(&self) -> &'a str {
        self.original
    }

    /// The copy matchers search
    pub fn masked(&self) -> &str {
        &self.masked
    }

    /// Text of `span` in the original document
    ///
    /// A span that starts or ends inside a masked multi-byte character is
    /// not a valid slice of the original; the masked text is returned then.
    pub fn original_slice(&self, span: Span) -> &str {
        self.original
            .get(span.start..span.end)
            .or_else(|| self.masked.get(span.start..span.end))
            .unwrap_or_default()
    }

    /// The masked ranges, sorted and disjoint
    pub fn masked_ranges(&self) -> &[Span] {
        &self.ranges
    }

    /// Whether `span` overlaps any masked range
    ///
    /// An empty span counts as masked when it lies strictly inside a range.
    pub fn is_masked(&self, span: Span) -> bool {
        let idx = self.ranges.partition_point(|r| r.end <= span.start);
        self.ranges.get(idx).is_some_and(|r| r.start < span.end)
    }
}

/// Masks URLs plus a per-format ignore pattern
#[derive(Debug, Clone, Default)]
pub struct Masker {
    ignore: HashMap<String, Regex>,
}

impl Masker {
    /// A masker that only masks URLs
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a masker from the configured ignore patterns
    ///
    /// Patterns that fail to compile are logged and skipped.
    pub fn from_config(config: &Config) -> Self {
        let mut masker = Self::new();
        for (format, pattern) in &config.ignore_patterns {
            masker.add_pattern(format, pattern);
        }
        masker
    }

    /// Registers the ignore pattern for a format, replacing any previous one
    pub fn add_pattern(&mut self, format: &str, pattern: &str) {
        match Regex::new(pattern) {
            Ok(re) => {
                self.ignore.insert(format.to_string(), re);
            }
            Err(e) => {
                tracing::error!(format = %format, error = %e, "invalid ignore pattern");
            }
        }
    }

    pub fn mask<'a>(&self, text: &'a str, format: &str) -> MaskedText<'a> {
        let mut ranges: Vec<(usize, usize)> = URL_REGEX
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect();

        if let Some(re) = self.ignore.get(format) {
            ranges.extend(re.find_iter(text).map(|m| (m.start(), m.end())));
        }

        if ranges.iter().all(|(s, e)| s == e) {
            return MaskedText::unmasked(text);
        }

        ranges.sort_unstable();

        let mut merged: Vec<Span> = Vec::with_capacity(ranges.len());
        for (start, end) in ranges {
            if start == end {
                continue;
            }
            match merged.last_mut() {
                Some(last) if start <= last.end => last.end = last.end.max(end),
                _ => merged.push(Span::new(start, end)),
            }
        }

        let mut masked = String::with_capacity(text.len());
        let mut cursor = 0;
        for range in &merged {
            masked.push_str(&text[cursor..range.start]);
            masked.extend(std::iter::repeat_n(MASK_CHAR, range.len()));
            cursor = range.end;
        }
        masked.push_str(&text[cursor..]);

        MaskedText {
            original: text,
            masked: Cow::Owned(masked),
            ranges: merged,
        }
    }
}
