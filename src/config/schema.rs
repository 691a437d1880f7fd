//! Configuration schema definitions.
//!
//! This module defines the configuration file layout. All types derive Serde
//! traits for deserialization from TOML.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grpc::{client_pattern, props};
use crate::registry::{PropertyMap, RegistrationHandle, UriPattern};

/// Root of a configuration file.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GrpcConfigFile {
    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Server-side per-service entries (`[[grpc]]`).
    #[serde(rename = "grpc")]
    pub services: Vec<ServiceConfig>,

    /// Client-side per-target entries (`[[grpc_client]]`).
    #[serde(rename = "grpc_client")]
    pub clients: Vec<ClientConfig>,
}

/// A configuration entry that can be registered in a registry.
pub trait RegistryEntry {
    /// Section name used in log events and errors.
    const SECTION: &'static str;

    fn id(&self) -> &str;

    fn pattern(&self) -> UriPattern;

    /// Properties as registered: typed fields first, then `extra`.
    fn properties(&self) -> PropertyMap;

    fn extra(&self) -> &BTreeMap<String, String>;

    fn handle(&self) -> RegistrationHandle {
        RegistrationHandle::new(self.id())
    }
}

/// Server-side settings for the services matching `target`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServiceConfig {
    /// Stable identifier; used as the registration handle.
    pub id: String,

    /// Service target, e.g. `helloworld.Greeter/SayHello` or `helloworld.*`.
    #[serde(default = "default_target")]
    pub target: String,

    /// Signed so that negative values reach validation instead of failing
    /// the whole parse.
    pub max_inbound_message_size: Option<i64>,

    /// Comma separated interceptor names.
    pub server_interceptors: Option<String>,

    /// Additional raw properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl ServiceConfig {
    pub fn new(id: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            target: target.into(),
            max_inbound_message_size: None,
            server_interceptors: None,
            extra: BTreeMap::new(),
        }
    }
}

impl RegistryEntry for ServiceConfig {
    const SECTION: &'static str = "grpc";

    fn id(&self) -> &str {
        &self.id
    }

    fn pattern(&self) -> UriPattern {
        UriPattern::new(self.target.trim())
    }

    fn properties(&self) -> PropertyMap {
        let mut map = PropertyMap::new();
        if let Some(size) = self.max_inbound_message_size {
            map.insert(props::MAX_INBOUND_MESSAGE_SIZE.to_string(), size.to_string());
        }
        if let Some(interceptors) = &self.server_interceptors {
            map.insert(props::SERVER_INTERCEPTORS.to_string(), interceptors.clone());
        }
        for (k, v) in &self.extra {
            map.entry(k.clone()).or_insert_with(|| v.clone());
        }
        map
    }

    fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }
}

/// Client-side settings for outbound calls matching `host` and `path`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ClientConfig {
    pub id: String,

    /// Target authority, or `*` for every host.
    #[serde(default = "default_target")]
    pub host: String,

    /// Service path under the host, `*` for all.
    #[serde(default = "default_target")]
    pub path: String,

    pub max_inbound_message_size: Option<i64>,

    pub max_inbound_metadata_size: Option<i64>,

    /// Duration such as `30s` or `500ms`.
    pub keep_alive_time: Option<String>,

    pub keep_alive_timeout: Option<String>,

    pub keep_alive_without_calls: Option<bool>,

    /// Comma separated header names.
    pub headers_to_propagate: Option<String>,

    pub user_agent: Option<String>,

    pub override_authority: Option<String>,

    pub client_interceptors: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl ClientConfig {
    pub fn new(id: impl Into<String>, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            path: path.into(),
            max_inbound_message_size: None,
            max_inbound_metadata_size: None,
            keep_alive_time: None,
            keep_alive_timeout: None,
            keep_alive_without_calls: None,
            headers_to_propagate: None,
            user_agent: None,
            override_authority: None,
            client_interceptors: None,
            extra: BTreeMap::new(),
        }
    }
}

impl RegistryEntry for ClientConfig {
    const SECTION: &'static str = "grpc_client";

    fn id(&self) -> &str {
        &self.id
    }

    fn pattern(&self) -> UriPattern {
        client_pattern(&self.host, &self.path)
    }

    fn properties(&self) -> PropertyMap {
        let mut map = PropertyMap::new();
        let mut put = |name: &str, value: Option<String>| {
            if let Some(value) = value {
                map.insert(name.to_string(), value);
            }
        };

        put(props::MAX_INBOUND_MESSAGE_SIZE, self.max_inbound_message_size.map(|v| v.to_string()));
        put(props::MAX_INBOUND_METADATA_SIZE, self.max_inbound_metadata_size.map(|v| v.to_string()));
        put(props::KEEP_ALIVE_TIME, self.keep_alive_time.clone());
        put(props::KEEP_ALIVE_TIMEOUT, self.keep_alive_timeout.clone());
        put(props::KEEP_ALIVE_WITHOUT_CALLS, self.keep_alive_without_calls.map(|v| v.to_string()));
        put(props::HEADERS_TO_PROPAGATE, self.headers_to_propagate.clone());
        put(props::USER_AGENT, self.user_agent.clone());
        put(props::OVERRIDE_AUTHORITY, self.override_authority.clone());
        put(props::CLIENT_INTERCEPTORS, self.client_interceptors.clone());

        for (k, v) in &self.extra {
            map.entry(k.clone()).or_insert_with(|| v.clone());
        }
        map
    }

    fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }
}

fn default_target() -> String {
    "*".to_string()
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Expose a Prometheus scrape endpoint while watching.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
