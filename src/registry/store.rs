//! Shared configuration registry with a per-URI resolution cache.
//!
//! # Responsibilities
//! - Accept registrations and removals from configuration owners
//! - Resolve a request URI to its merged property set
//! - Cache resolutions until the next mutation
//!
//! # Design Decisions
//! - One `RwLock` over the whole registration table; mutations are exclusive
//! - Cache is a `DashMap` so hits never touch the table lock
//! - Misses populate the cache while still holding the shared table lock, so
//!   a mutation cannot slip in between computing and caching a result
//! - Two threads may compute the same miss; both write the same value

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dashmap::DashMap;

use crate::observability::metrics;
use crate::registry::pattern::UriPattern;
use crate::registry::table::{RegistrationHandle, RegistrationTable};
use crate::registry::PropertyMap;

/// Process-wide registry of per-target gRPC settings.
///
/// Construct one per configuration domain (server or client) at startup and
/// share it by `Arc`.
#[derive(Debug)]
pub struct ConfigRegistry {
    name: &'static str,
    table: RwLock<RegistrationTable>,
    resolved: DashMap<String, Arc<PropertyMap>>,
}

impl ConfigRegistry {
    /// Create an empty registry. `name` labels log events and metrics.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            table: RwLock::new(RegistrationTable::default()),
            resolved: DashMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register `properties` under `pattern`, owned by `handle`.
    ///
    /// If `handle` previously owned another pattern, that entry is left in
    /// place; call [`ConfigRegistry::remove`] first for replace semantics.
    pub fn add_or_update(
        &self,
        handle: impl Into<RegistrationHandle>,
        pattern: impl Into<UriPattern>,
        properties: PropertyMap,
    ) {
        let handle = handle.into();
        let pattern = pattern.into();
        let mut table = self.write_table();

        tracing::debug!(
            registry = self.name,
            handle = %handle,
            pattern = %pattern,
            properties = properties.len(),
            "Registering configuration"
        );

        table.insert(handle, pattern, properties);
        self.resolved.clear();

        metrics::record_mutation(self.name, "add_or_update");
        metrics::record_pattern_count(self.name, table.len());
    }

    /// Remove the entry owned by `handle`. Unknown handles are ignored.
    pub fn remove(&self, handle: &RegistrationHandle) {
        let mut table = self.write_table();

        match table.remove(handle) {
            Some(pattern) => {
                tracing::debug!(registry = self.name, handle = %handle, pattern = %pattern, "Removed configuration");
                metrics::record_mutation(self.name, "remove");
                metrics::record_pattern_count(self.name, table.len());
            }
            None => {
                tracing::trace!(registry = self.name, handle = %handle, "Remove for handle with no registration");
            }
        }

        self.resolved.clear();
    }

    /// Merged properties applying to `uri`, or `None` when nothing applies.
    pub fn resolve(&self, uri: &str) -> Option<Arc<PropertyMap>> {
        if let Some(hit) = self.resolved.get(uri) {
            metrics::record_resolution(self.name, "hit");
            return non_empty(Arc::clone(hit.value()));
        }

        metrics::record_resolution(self.name, "miss");

        let table = self.read_table();
        let merged = Arc::new(table.merge_for(uri));
        self.resolved.insert(uri.to_string(), Arc::clone(&merged));
        drop(table);

        tracing::trace!(registry = self.name, uri, properties = merged.len(), "Resolved configuration");
        non_empty(merged)
    }

    /// Single property for `uri` after merging.
    pub fn property(&self, uri: &str, name: &str) -> Option<String> {
        self.resolve(uri).and_then(|props| props.get(name).cloned())
    }

    /// Pattern currently owned by `handle`.
    pub fn pattern_of(&self, handle: &RegistrationHandle) -> Option<UriPattern> {
        self.read_table().pattern_of(handle).cloned()
    }

    /// Snapshot of all registered patterns in scan order.
    pub fn patterns(&self) -> Vec<(UriPattern, PropertyMap)> {
        self.read_table()
            .patterns()
            .map(|(p, props)| (p.clone(), props.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read_table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a wildcard pattern has ever been registered.
    pub fn has_wildcards(&self) -> bool {
        self.read_table().has_wildcards()
    }

    /// Number of URIs with a cached resolution.
    pub fn cached_len(&self) -> usize {
        self.resolved.len()
    }

    // The table holds plain data, so a poisoned lock still guards a
    // consistent value; recover it instead of propagating the panic.
    fn read_table(&self) -> RwLockReadGuard<'_, RegistrationTable> {
        self.table.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, RegistrationTable> {
        self.table.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::new("grpc")
    }
}

fn non_empty(props: Arc<PropertyMap>) -> Option<Arc<PropertyMap>> {
    if props.is_empty() { None } else { Some(props) }
}
