//! Applies configuration entries to the registries.
//!
//! # Responsibilities
//! - Activate, modify and deactivate individual entries
//! - Reconcile a whole file against what was applied before
//! - Keep the last applied file for inspection
//!
//! # Design Decisions
//! - An invalid entry is logged and skipped; whatever it registered before
//!   stays in effect
//! - A handle moving to a new pattern drops its old pattern first

use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::schema::{ClientConfig, GrpcConfigFile, RegistryEntry, ServiceConfig};
use crate::config::validation::{ValidationError, validate_client, validate_service};
use crate::registry::{ConfigRegistry, RegistrationHandle};

/// Outcome of applying a whole file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    /// Ids registered or refreshed.
    pub activated: Vec<String>,
    /// Ids skipped, with the reasons.
    pub rejected: Vec<(String, Vec<ValidationError>)>,
    /// Ids no longer present in the file and removed.
    pub deactivated: Vec<String>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Owns the link between configuration entries and the two registries.
pub struct ConfigApplier {
    services: Arc<ConfigRegistry>,
    clients: Arc<ConfigRegistry>,
    current: ArcSwap<GrpcConfigFile>,
}

impl ConfigApplier {
    pub fn new(services: Arc<ConfigRegistry>, clients: Arc<ConfigRegistry>) -> Self {
        Self {
            services,
            clients,
            current: ArcSwap::from_pointee(GrpcConfigFile::default()),
        }
    }

    pub fn services(&self) -> &Arc<ConfigRegistry> {
        &self.services
    }

    pub fn clients(&self) -> &Arc<ConfigRegistry> {
        &self.clients
    }

    /// The file most recently passed to [`ConfigApplier::apply`].
    pub fn current(&self) -> Arc<GrpcConfigFile> {
        self.current.load_full()
    }

    pub fn activate_service(&self, entry: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
        validate_service(entry)?;
        register(&self.services, entry);
        Ok(())
    }

    pub fn activate_client(&self, entry: &ClientConfig) -> Result<(), Vec<ValidationError>> {
        validate_client(entry)?;
        register(&self.clients, entry);
        Ok(())
    }

    pub fn deactivate_service(&self, id: &str) {
        self.services.remove(&RegistrationHandle::new(id));
    }

    pub fn deactivate_client(&self, id: &str) {
        self.clients.remove(&RegistrationHandle::new(id));
    }

    /// Reconcile the registries with `config`.
    pub fn apply(&self, config: GrpcConfigFile) -> ApplyReport {
        let previous = self.current.load_full();
        let mut report = ApplyReport::default();

        reconcile(
            &self.services,
            &previous.services,
            &config.services,
            validate_service,
            &mut report,
        );
        reconcile(
            &self.clients,
            &previous.clients,
            &config.clients,
            validate_client,
            &mut report,
        );

        tracing::info!(
            activated = report.activated.len(),
            rejected = report.rejected.len(),
            deactivated = report.deactivated.len(),
            "Configuration applied"
        );

        self.current.store(Arc::new(config));
        report
    }
}

fn register<E: RegistryEntry>(registry: &ConfigRegistry, entry: &E) {
    release_old_target(registry, entry);
    registry.add_or_update(entry.handle(), entry.pattern(), entry.properties());
}

/// Drop the pattern `entry`'s handle owns if the entry now targets another.
fn release_old_target<E: RegistryEntry>(registry: &ConfigRegistry, entry: &E) {
    let handle = entry.handle();
    let pattern = entry.pattern();

    if let Some(old) = registry.pattern_of(&handle) {
        if old != pattern {
            tracing::debug!(section = E::SECTION, id = entry.id(), old = %old, new = %pattern, "Entry target changed");
            registry.remove(&handle);
        }
    }
}

fn reconcile<E: RegistryEntry>(
    registry: &ConfigRegistry,
    previous: &[E],
    next: &[E],
    validate: fn(&E) -> Result<(), Vec<ValidationError>>,
    report: &mut ApplyReport,
) {
    let mut seen = HashSet::new();
    let mut accepted = Vec::new();

    for entry in next {
        if !seen.insert(entry.id()) {
            let err = ValidationError::DuplicateId { section: E::SECTION, id: entry.id().to_string() };
            tracing::warn!(section = E::SECTION, id = entry.id(), "Ignoring duplicate entry");
            report.rejected.push((entry.id().to_string(), vec![err]));
            continue;
        }

        match validate(entry) {
            Ok(()) => accepted.push(entry),
            Err(errors) => {
                for e in &errors {
                    tracing::warn!(section = E::SECTION, id = entry.id(), "{}", e);
                }
                tracing::warn!(section = E::SECTION, id = entry.id(), "Keeping previous configuration for entry");
                report.rejected.push((entry.id().to_string(), errors));
            }
        }
    }

    // Every removal runs before any registration: several ids may share one
    // pattern slot, and removing one handle empties the slot for all of them.
    for old in previous {
        if !seen.contains(old.id()) {
            tracing::info!(section = E::SECTION, id = old.id(), "Deactivating entry");
            registry.remove(&old.handle());
            report.deactivated.push(old.id().to_string());
        }
    }
    for entry in &accepted {
        release_old_target(registry, *entry);
    }

    for entry in accepted {
        registry.add_or_update(entry.handle(), entry.pattern(), entry.properties());
        report.activated.push(entry.id().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grpc::{self, ClientSettings};

    fn applier() -> ConfigApplier {
        ConfigApplier::new(
            Arc::new(ConfigRegistry::new("grpc")),
            Arc::new(ConfigRegistry::new("grpc_client")),
        )
    }

    fn service(id: &str, target: &str, size: i64) -> ServiceConfig {
        let mut svc = ServiceConfig::new(id, target);
        svc.max_inbound_message_size = Some(size);
        svc
    }

    #[test]
    fn test_invalid_entry_keeps_previous_registration() {
        let applier = applier();
        applier.activate_service(&service("greeter", "helloworld.Greeter/*", 1024)).unwrap();

        let err = applier.activate_service(&service("greeter", "helloworld.Greeter/*", 0));
        assert!(err.is_err());
        assert_eq!(
            grpc::max_inbound_message_size(applier.services(), "helloworld.Greeter/SayHello"),
            Some(1024)
        );
    }

    #[test]
    fn test_retarget_removes_old_pattern() {
        let applier = applier();
        applier.activate_service(&service("s", "a.Svc/*", 10)).unwrap();
        applier.activate_service(&service("s", "b.Svc/*", 20)).unwrap();

        assert_eq!(applier.services().len(), 1);
        assert!(applier.services().resolve("a.Svc/Call").is_none());
        assert_eq!(grpc::max_inbound_message_size(applier.services(), "b.Svc/Call"), Some(20));
    }

    #[test]
    fn test_apply_reconciles_files() {
        let applier = applier();

        let mut first = GrpcConfigFile::default();
        first.services.push(service("a", "a.Svc/*", 10));
        first.services.push(service("b", "b.Svc/*", 20));
        let mut client = ClientConfig::new("c", "*", "*");
        client.user_agent = Some("acme".into());
        first.clients.push(client);

        let report = applier.apply(first);
        assert!(report.is_clean());
        assert_eq!(report.activated, vec!["a", "b", "c"]);

        let mut second = GrpcConfigFile::default();
        second.services.push(service("b", "b.Svc/*", 30));
        second.services.push(service("bad", "c.Svc/*", -5));
        second.services.push(service("b", "b.Svc/*", 40));

        let report = applier.apply(second.clone());
        assert_eq!(report.activated, vec!["b"]);
        assert_eq!(report.deactivated, vec!["a", "c"]);
        assert_eq!(report.rejected.len(), 2);

        assert!(applier.services().resolve("a.Svc/Call").is_none());
        assert_eq!(grpc::max_inbound_message_size(applier.services(), "b.Svc/Call"), Some(30));
        assert!(!ClientSettings::for_call(applier.clients(), "h", "s", "m").is_configured());
        assert_eq!(*applier.current(), second);
    }

    #[test]
    fn test_retarget_keeps_entry_sharing_old_target() {
        let applier = applier();

        let mut first = GrpcConfigFile::default();
        first.services.push(service("x", "svc/*", 10));
        first.services.push(service("y", "svc/*", 10));
        assert!(applier.apply(first).is_clean());

        let mut second = GrpcConfigFile::default();
        second.services.push(service("x", "svc/*", 10));
        second.services.push(service("y", "other/*", 20));
        let report = applier.apply(second);

        assert_eq!(report.activated, vec!["x", "y"]);
        assert_eq!(grpc::max_inbound_message_size(applier.services(), "svc/Call"), Some(10));
        assert_eq!(grpc::max_inbound_message_size(applier.services(), "other/Call"), Some(20));
        assert_eq!(applier.services().len(), 2);
    }

    #[test]
    fn test_deactivation_keeps_entry_sharing_target() {
        let applier = applier();

        let mut first = GrpcConfigFile::default();
        first.services.push(service("x", "svc/*", 10));
        first.services.push(service("y", "svc/*", 10));
        applier.apply(first);

        let mut second = GrpcConfigFile::default();
        second.services.push(service("x", "svc/*", 10));
        let report = applier.apply(second);

        assert_eq!(report.deactivated, vec!["y"]);
        assert_eq!(grpc::max_inbound_message_size(applier.services(), "svc/Call"), Some(10));
    }

    #[test]
    fn test_deactivate_single_entries() {
        let applier = applier();
        applier.activate_service(&service("s", "a.Svc/*", 10)).unwrap();
        let mut client = ClientConfig::new("c", "localhost:9080", "*");
        client.user_agent = Some("ua".into());
        applier.activate_client(&client).unwrap();

        applier.deactivate_service("s");
        applier.deactivate_client("c");
        // Unknown ids are ignored.
        applier.deactivate_service("missing");

        assert!(applier.services().is_empty());
        assert!(applier.clients().is_empty());
        assert!(!ClientSettings::for_call(applier.clients(), "localhost:9080", "a.Svc", "Call").is_configured());
    }
}
