//! URI patterns.
//!
//! # Responsibilities
//! - Classify a configured target as exact or wildcard
//! - Test a query URI against a pattern by plain string prefix
//!
//! # Design Decisions
//! - Matching is pure string comparison, never URI-aware parsing
//! - Only a trailing `*` is a wildcard; `*` alone matches everything

use std::borrow::Borrow;
use std::fmt;

/// Marker that turns a pattern into a prefix match.
pub const WILDCARD: char = '*';

/// A configured target, either an exact URI or a prefix ending in [`WILDCARD`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UriPattern(String);

impl UriPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the pattern ends with the wildcard marker.
    pub fn is_wildcard(&self) -> bool {
        self.0.ends_with(WILDCARD)
    }

    /// The prefix a query must start with, or `None` for exact patterns.
    pub fn prefix(&self) -> Option<&str> {
        self.0.strip_suffix(WILDCARD)
    }

    /// Whether `uri` falls under this pattern, exact or by prefix.
    pub fn matches(&self, uri: &str) -> bool {
        match self.prefix() {
            Some(prefix) => uri.starts_with(prefix),
            None => self.0 == uri,
        }
    }
}

impl fmt::Display for UriPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UriPattern {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for UriPattern {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// Lets the ordered table be looked up with a plain `&str` query.
impl Borrow<str> for UriPattern {
    fn borrow(&self) -> &str {
        &self.0
    }
}
