// src/checker/normalize.rs
// =============================================================================
// This module turns a raw href into a canonical URL we can deduplicate on.
//
// Rules:
// - A missing or empty href is rejected
// - Everything from the first '#' is dropped (the fragment)
// - Then everything from the first '?' is dropped (the query string)
// - Whatever is left is the canonical URL, with no further validation.
//   Malformed URLs are left for the HTTP checker to classify.
//
// Both stripping passes always run, so "a?x#y" and "a#y?x" both become "a".
// =============================================================================

use std::fmt;
use thiserror::Error;

/// An href as exposed by an anchor element. `None` when the anchor has no
/// href attribute at all.
pub type RawLink = Option<String>;

/// Why a raw href did not produce a canonical URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("link has no destination")]
    Absent,
    #[error("link is empty after removing fragment and query")]
    Empty,
}

/// A link with its fragment and query string removed.
///
/// The only way to build one is through [`normalize`], so every value in a
/// `LinkSet` went through the same rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes a raw href into a [`CanonicalUrl`].
///
/// Example:
///   normalize(Some("https://x.test/a?q=1#top")) == Ok("https://x.test/a")
///   normalize(Some("#top"))                     == Err(Rejected::Empty)
pub fn normalize(raw: Option<&str>) -> Result<CanonicalUrl, Rejected> {
    let raw = raw.ok_or(Rejected::Absent)?;

    let without_fragment = strip_from(raw, '#');
    let canonical = strip_from(without_fragment, '?');

    if canonical.is_empty() {
        return Err(Rejected::Empty);
    }

    Ok(CanonicalUrl(canonical.to_string()))
}

// Returns the part of `s` before the first `delimiter` (all of `s` if absent)
fn strip_from(s: &str, delimiter: char) -> &str {
    match s.find(delimiter) {
        Some(index) => &s[..index],
        None => s,
    }
}
