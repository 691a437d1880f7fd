//! Client-side settings for an outbound gRPC call.
//!
//! Client entries are keyed by `host/path`; a call to method `M` of service
//! `S` on `host` resolves against `host/S/M`.

use std::sync::Arc;
use std::time::Duration;

use crate::grpc::props;
use crate::registry::{ConfigRegistry, PropertyMap, UriPattern, WILDCARD};

/// Pattern a client entry registers under.
pub fn client_pattern(host: &str, path: &str) -> UriPattern {
    let host = host.trim();
    if host == "*" {
        return UriPattern::new(WILDCARD.to_string());
    }
    let path = path.trim().trim_start_matches('/');
    UriPattern::new(format!("{}/{}", host.trim_end_matches('/'), path))
}

/// Query URI for a call to `service/method` on `host`.
pub fn call_uri(host: &str, service: &str, method: &str) -> String {
    format!("{}/{}/{}", host, service, method)
}

/// Resolved view over the client registry for one call target.
#[derive(Debug, Clone, Default)]
pub struct ClientSettings {
    props: Option<Arc<PropertyMap>>,
}

impl ClientSettings {
    pub fn for_target(registry: &ConfigRegistry, uri: &str) -> Self {
        Self {
            props: registry.resolve(uri),
        }
    }

    pub fn for_call(registry: &ConfigRegistry, host: &str, service: &str, method: &str) -> Self {
        Self::for_target(registry, &call_uri(host, service, method))
    }

    pub fn is_configured(&self) -> bool {
        self.props.is_some()
    }

    pub fn max_inbound_message_size(&self) -> Option<usize> {
        self.raw(props::MAX_INBOUND_MESSAGE_SIZE).and_then(props::parse_size)
    }

    pub fn max_inbound_metadata_size(&self) -> Option<usize> {
        self.raw(props::MAX_INBOUND_METADATA_SIZE).and_then(props::parse_size)
    }

    pub fn keep_alive_time(&self) -> Option<Duration> {
        self.raw(props::KEEP_ALIVE_TIME).and_then(props::parse_duration)
    }

    pub fn keep_alive_timeout(&self) -> Option<Duration> {
        self.raw(props::KEEP_ALIVE_TIMEOUT).and_then(props::parse_duration)
    }

    pub fn keep_alive_without_calls(&self) -> Option<bool> {
        self.raw(props::KEEP_ALIVE_WITHOUT_CALLS).and_then(props::parse_bool)
    }

    /// Header names to copy from the inbound request, lowercased.
    pub fn headers_to_propagate(&self) -> Vec<String> {
        self.raw(props::HEADERS_TO_PROPAGATE)
            .map(props::parse_list)
            .unwrap_or_default()
            .into_iter()
            .map(|h| h.to_ascii_lowercase())
            .collect()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.raw(props::USER_AGENT)
    }

    pub fn override_authority(&self) -> Option<&str> {
        self.raw(props::OVERRIDE_AUTHORITY)
    }

    pub fn client_interceptors(&self) -> Vec<String> {
        self.raw(props::CLIENT_INTERCEPTORS).map(props::parse_list).unwrap_or_default()
    }

    pub fn raw(&self, name: &str) -> Option<&str> {
        self.props.as_deref()?.get(name).map(String::as_str)
    }
}
