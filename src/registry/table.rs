//! Bidirectional registration table.
//!
//! Holds both directions of the registration (pattern → properties and
//! handle → pattern) plus the wildcard flag, so a single lock guards all of
//! them and they cannot drift apart.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::registry::pattern::UriPattern;
use crate::registry::PropertyMap;

/// Owner-supplied identifier used to find a registration again on removal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationHandle(String);

impl RegistrationHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistrationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegistrationHandle {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RegistrationHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Default)]
pub(crate) struct RegistrationTable {
    /// Ordered so a scan visits general prefixes before specific ones.
    patterns: BTreeMap<UriPattern, PropertyMap>,
    owners: HashMap<RegistrationHandle, UriPattern>,
    /// Set by the first wildcard registration, never cleared.
    has_wildcards: bool,
}

impl RegistrationTable {
    /// Store `props` under `pattern` and point `handle` at it.
    ///
    /// A pattern the handle owned before stays in the table.
    pub(crate) fn insert(&mut self, handle: RegistrationHandle, pattern: UriPattern, props: PropertyMap) {
        if pattern.is_wildcard() {
            self.has_wildcards = true;
        }
        self.patterns.insert(pattern.clone(), props);
        self.owners.insert(handle, pattern);
    }

    /// Drop whatever `handle` owns. Returns the removed pattern.
    pub(crate) fn remove(&mut self, handle: &RegistrationHandle) -> Option<UriPattern> {
        let pattern = self.owners.remove(handle)?;
        self.patterns.remove(&pattern);
        Some(pattern)
    }

    pub(crate) fn pattern_of(&self, handle: &RegistrationHandle) -> Option<&UriPattern> {
        self.owners.get(handle)
    }

    pub(crate) fn has_wildcards(&self) -> bool {
        self.has_wildcards
    }

    pub(crate) fn len(&self) -> usize {
        self.patterns.len()
    }

    pub(crate) fn patterns(&self) -> impl Iterator<Item = (&UriPattern, &PropertyMap)> {
        self.patterns.iter()
    }

    /// Merge every entry applying to `uri`.
    ///
    /// Wildcards are merged in ascending pattern order so longer prefixes
    /// override shorter ones; the exact entry is laid on top last.
    pub(crate) fn merge_for(&self, uri: &str) -> PropertyMap {
        let mut merged = PropertyMap::new();

        if self.has_wildcards {
            for (pattern, props) in &self.patterns {
                match pattern.prefix() {
                    Some(prefix) if uri.starts_with(prefix) => {
                        merged.extend(props.iter().map(|(k, v)| (k.clone(), v.clone())));
                    }
                    _ => {}
                }
            }
        }

        if let Some(exact) = self.patterns.get(uri) {
            merged.extend(exact.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        merged
    }
}
