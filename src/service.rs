//! Top-level handle tying the registries, the applier and reloads together.
//!
//! # Responsibilities
//! - Build the server and client registries once at startup
//! - Hand out shared references to consuming components
//! - Apply configuration updates until shutdown

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::config::{ApplyReport, ConfigApplier, GrpcConfigFile};
use crate::registry::ConfigRegistry;

pub const SERVER_REGISTRY: &str = "grpc";
pub const CLIENT_REGISTRY: &str = "grpc_client";

/// Shared gRPC configuration state for one process.
#[derive(Clone)]
pub struct GrpcConfigService {
    applier: Arc<ConfigApplier>,
}

impl GrpcConfigService {
    pub fn new() -> Self {
        Self::from_registries(
            Arc::new(ConfigRegistry::new(SERVER_REGISTRY)),
            Arc::new(ConfigRegistry::new(CLIENT_REGISTRY)),
        )
    }

    pub fn from_registries(services: Arc<ConfigRegistry>, clients: Arc<ConfigRegistry>) -> Self {
        Self {
            applier: Arc::new(ConfigApplier::new(services, clients)),
        }
    }

    pub fn services(&self) -> Arc<ConfigRegistry> {
        Arc::clone(self.applier.services())
    }

    pub fn clients(&self) -> Arc<ConfigRegistry> {
        Arc::clone(self.applier.clients())
    }

    pub fn applier(&self) -> &ConfigApplier {
        &self.applier
    }

    pub fn apply(&self, config: GrpcConfigFile) -> ApplyReport {
        self.applier.apply(config)
    }

    /// Apply every update received until `shutdown` fires or the update
    /// channel closes. `on_reload` sees each report.
    pub async fn run<F>(
        &self,
        mut updates: mpsc::UnboundedReceiver<GrpcConfigFile>,
        mut shutdown: broadcast::Receiver<()>,
        mut on_reload: F,
    ) where
        F: FnMut(&ApplyReport),
    {
        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Some(config) => {
                        let report = self.apply(config);
                        on_reload(&report);
                    }
                    None => {
                        tracing::debug!("Config update channel closed");
                        break;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Stopping config reload loop");
                    break;
                }
            }
        }
    }
}

impl Default for GrpcConfigService {
    fn default() -> Self {
        Self::new()
    }
}
