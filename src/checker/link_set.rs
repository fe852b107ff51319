// src/checker/link_set.rs
// =============================================================================
// An ordered set of canonical URLs.
//
// The page gives us links in document order, often with duplicates
// ("/docs", "/docs#install", "/docs?lang=en"). We keep the first occurrence
// of each canonical URL and remember the order we saw them in, so the
// printed report follows the page from top to bottom.
//
// Rust concepts:
// - Vec + HashSet: the Vec keeps order, the HashSet gives O(1) "seen it?"
// - impl Trait arguments: accept any iterator of raw links
// =============================================================================

use std::collections::HashSet;

use super::normalize::{normalize, CanonicalUrl, RawLink};

#[derive(Debug, Clone, Default)]
pub struct LinkSet {
    links: Vec<CanonicalUrl>,
    seen: HashSet<CanonicalUrl>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from raw hrefs, dropping the ones that don't normalize.
    pub fn from_raw(raw_links: impl IntoIterator<Item = RawLink>) -> Self {
        let mut set = Self::new();

        for raw in raw_links {
            match normalize(raw.as_deref()) {
                Ok(url) => {
                    set.insert(url);
                }
                Err(reason) => {
                    tracing::debug!(raw = ?raw, %reason, "skipping link");
                }
            }
        }

        set
    }

    /// Adds a URL. Returns `false` if it was already present.
    pub fn insert(&mut self, url: CanonicalUrl) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.links.push(url);
        true
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalUrl> {
        self.links.iter()
    }
}

impl<'a> IntoIterator for &'a LinkSet {
    type Item = &'a CanonicalUrl;
    type IntoIter = std::slice::Iter<'a, CanonicalUrl>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
