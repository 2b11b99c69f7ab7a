//! Client-side cookie jar.
//!
//! # Design Decisions
//! - Explicit mapping-to-set type: duplicate-name semantics are a contract,
//!   not an accident of a collection choice
//! - Rebuilt fresh per response; no cross-request persistence
//! - Identical duplicates deduplicate by set membership

use std::collections::{HashMap, HashSet};

use crate::cookie::parse::parse_set_cookie;
use crate::cookie::Cookie;

/// Cookies grouped by name, as parsed from a response's `Set-Cookie` headers.
///
/// A name set twice (or with different paths) yields a set of size greater
/// than one under that name; nothing is coalesced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    entries: HashMap<String, HashSet<Cookie>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a jar from raw `Set-Cookie` header values.
    ///
    /// Malformed values are dropped with a debug log and do not abort the
    /// remaining headers.
    pub fn from_set_cookie_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut jar = Self::new();
        for value in values {
            match parse_set_cookie(value) {
                Ok(cookie) => jar.insert(cookie),
                Err(err) => {
                    tracing::debug!(header = %value, error = %err, "Dropping malformed Set-Cookie");
                }
            }
        }
        jar
    }

    /// Add a cookie under its own name.
    pub fn insert(&mut self, cookie: Cookie) {
        self.entries
            .entry(cookie.name().to_string())
            .or_default()
            .insert(cookie);
    }

    /// All cookies sharing the given name (case-sensitive).
    pub fn get(&self, name: &str) -> Option<&HashSet<Cookie>> {
        self.entries.get(name)
    }

    /// Whether any cookie with the given name carries the given value.
    pub fn contains_value(&self, name: &str, value: &str) -> bool {
        self.get(name)
            .map(|set| set.iter().any(|c| c.value() == value))
            .unwrap_or(false)
    }

    /// Number of distinct cookie names.
    pub fn name_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of cookies across all names.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (name, set) entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HashSet<Cookie>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
