//! Canonical identity of an agenda entry.
//!
//! The page re-renders its agenda on every refresh, so entries have no stable
//! id. Instead each [`RawEvent`] is reduced to a [`CanonicalKey`] of the form
//!
//! ```text
//! 09:00–10:00 | Code review — Project X (mandatory)
//! ```
//!
//! Re-fetching an unchanged entry yields the same key; entries sharing a time
//! slot but differing in content yield different keys.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::event::RawEvent;

/// Placeholder title the page shows for entries without a real title.
pub const PLACEHOLDER_TITLE: &str = "Event";

/// Marker appended to the label of mandatory entries.
pub const MANDATORY_SUFFIX: &str = " (mandatory)";

/// Separator between start and end time.
const TIME_RANGE_SEPARATOR: char = '–';

/// Separator between title and description.
const LABEL_SEPARATOR: &str = " — ";

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Normalized string identity of one agenda entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Wraps an already-canonical string.
    ///
    /// No normalization is applied; use [`canonicalize`] for raw page data.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CanonicalKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Reduces a raw agenda entry to its canonical key.
///
/// This is a total function: every input, however sparse, yields a key.
pub fn canonicalize(raw: &RawEvent) -> CanonicalKey {
    let start = raw.time_start.trim();
    let time_part = match raw.end() {
        Some(end) => format!("{start}{TIME_RANGE_SEPARATOR}{end}"),
        None => start.to_string(),
    };

    let mut label = build_label(raw.title(), raw.description());
    if raw.is_mandatory {
        label.push_str(MANDATORY_SUFFIX);
    }
    let label = collapse_whitespace(&label);

    CanonicalKey(format!("{time_part} | {label}"))
}

impl RawEvent {
    /// Returns the canonical key of this entry.
    pub fn canonical_key(&self) -> CanonicalKey {
        canonicalize(self)
    }
}

/// Picks the label text.
///
/// A real title is combined with the description. When the title is the
/// placeholder (or missing) the description alone carries the identity.
fn build_label(title: Option<&str>, description: Option<&str>) -> String {
    match title {
        Some(title) if title != PLACEHOLDER_TITLE => {
            let combined = format!("{title}{LABEL_SEPARATOR}{}", description.unwrap_or(""));
            combined
                .trim_matches(|c: char| c == ' ' || c == '—')
                .to_string()
        }
        _ => description
            .or(title)
            .unwrap_or(PLACEHOLDER_TITLE)
            .to_string(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}
