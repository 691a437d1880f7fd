//! Server-side settings for a gRPC service target.

use std::sync::Arc;

use crate::grpc::props;
use crate::registry::{ConfigRegistry, PropertyMap};

/// Effective maximum inbound message size for `uri`, if configured.
pub fn max_inbound_message_size(registry: &ConfigRegistry, uri: &str) -> Option<usize> {
    ServiceSettings::for_target(registry, uri).max_inbound_message_size()
}

/// Raw interceptor list configured for `uri`.
pub fn interceptor_list(registry: &ConfigRegistry, uri: &str) -> Option<String> {
    registry.property(uri, props::SERVER_INTERCEPTORS)
}

/// Resolved view over the server registry for one target.
#[derive(Debug, Clone, Default)]
pub struct ServiceSettings {
    props: Option<Arc<PropertyMap>>,
}

impl ServiceSettings {
    pub fn for_target(registry: &ConfigRegistry, uri: &str) -> Self {
        Self {
            props: registry.resolve(uri),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.props.is_some()
    }

    /// Unparsable values count as not configured.
    pub fn max_inbound_message_size(&self) -> Option<usize> {
        match self.raw(props::MAX_INBOUND_MESSAGE_SIZE) {
            Some(raw) => {
                let parsed = props::parse_size(raw);
                if parsed.is_none() {
                    tracing::debug!(value = raw, "Ignoring invalid maxInboundMessageSize");
                }
                parsed
            }
            None => None,
        }
    }

    pub fn server_interceptors(&self) -> Option<&str> {
        self.raw(props::SERVER_INTERCEPTORS)
    }

    pub fn server_interceptor_names(&self) -> Vec<String> {
        self.server_interceptors().map(props::parse_list).unwrap_or_default()
    }

    pub fn raw(&self, name: &str) -> Option<&str> {
        self.props.as_deref()?.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ConfigRegistry {
        let reg = ConfigRegistry::new("grpc");
        reg.add_or_update(
            "all",
            "*",
            [(props::MAX_INBOUND_MESSAGE_SIZE.to_string(), "1024".to_string())].into(),
        );
        reg.add_or_update(
            "greeter",
            "helloworld.Greeter/*",
            [
                (props::MAX_INBOUND_MESSAGE_SIZE.to_string(), "4096".to_string()),
                (props::SERVER_INTERCEPTORS.to_string(), "com.acme.Auth, com.acme.Audit".to_string()),
            ]
            .into(),
        );
        reg.add_or_update(
            "broken",
            "broken.Svc/Call",
            [(props::MAX_INBOUND_MESSAGE_SIZE.to_string(), "huge".to_string())].into(),
        );
        reg
    }

    #[test]
    fn test_message_size_resolution() {
        let reg = registry();
        assert_eq!(max_inbound_message_size(&reg, "helloworld.Greeter/SayHello"), Some(4096));
        assert_eq!(max_inbound_message_size(&reg, "routeguide.RouteGuide/GetFeature"), Some(1024));
        assert_eq!(max_inbound_message_size(&reg, "broken.Svc/Call"), None);
    }

    #[test]
    fn test_interceptors() {
        let reg = registry();
        assert_eq!(
            interceptor_list(&reg, "helloworld.Greeter/SayHello").as_deref(),
            Some("com.acme.Auth, com.acme.Audit")
        );
        assert!(interceptor_list(&reg, "other.Svc/Call").is_none());

        let settings = ServiceSettings::for_target(&reg, "helloworld.Greeter/SayHello");
        assert_eq!(settings.server_interceptor_names(), vec!["com.acme.Auth", "com.acme.Audit"]);
    }

    #[test]
    fn test_unconfigured_target() {
        let reg = ConfigRegistry::new("grpc");
        let settings = ServiceSettings::for_target(&reg, "a.B/C");
        assert!(!settings.is_configured());
        assert_eq!(settings.max_inbound_message_size(), None);
        assert!(settings.server_interceptor_names().is_empty());
    }
}
