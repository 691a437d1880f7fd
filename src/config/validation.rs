//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject malformed values before they ever reach a registry
//! - Detect duplicate entry ids within a section
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Entries validate individually so one bad entry never blocks the rest
//! - Pure functions: config → Result<(), Vec<ValidationError>>

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{ClientConfig, GrpcConfigFile, RegistryEntry, ServiceConfig};
use crate::grpc::props;
use crate::registry::WILDCARD;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration file.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{section} entry has an empty id")]
    EmptyId { section: &'static str },

    #[error("{section} entry '{id}' is defined more than once")]
    DuplicateId { section: &'static str, id: String },

    #[error("{section} entry '{id}' has an empty {field}")]
    EmptyTarget { section: &'static str, id: String, field: &'static str },

    #[error("{section} entry '{id}': wildcard is only allowed at the end of '{pattern}'")]
    MisplacedWildcard { section: &'static str, id: String, pattern: String },

    #[error("{section} entry '{id}': {property} must be a positive integer, got {value}")]
    InvalidSize { section: &'static str, id: String, property: &'static str, value: i64 },

    #[error("{section} entry '{id}': {property} is not a valid duration: '{value}'")]
    InvalidDuration { section: &'static str, id: String, property: &'static str, value: String },

    #[error("{section} entry '{id}': extra property '{property}' has invalid value '{value}'")]
    InvalidExtra { section: &'static str, id: String, property: String, value: String },

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
}

/// Validate a whole file.
pub fn validate_config(config: &GrpcConfigFile) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.observability.log_level.clone()));
    }

    errors.extend(duplicate_ids(&config.services));
    errors.extend(duplicate_ids(&config.clients));

    for service in &config.services {
        if let Err(e) = validate_service(service) {
            errors.extend(e);
        }
    }
    for client in &config.clients {
        if let Err(e) = validate_client(client) {
            errors.extend(e);
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

pub fn validate_service(service: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let section = ServiceConfig::SECTION;
    let mut errors = Vec::new();

    check_identity(service, &mut errors);
    check_pattern(section, &service.id, "target", &service.target, &mut errors);
    check_size(section, &service.id, props::MAX_INBOUND_MESSAGE_SIZE, service.max_inbound_message_size, &mut errors);
    check_extra(service, &mut errors);

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

pub fn validate_client(client: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let section = ClientConfig::SECTION;
    let id = client.id.as_str();
    let mut errors = Vec::new();

    check_identity(client, &mut errors);
    let host_present = check_present(section, id, "host", &client.host, &mut errors);
    let path_present = check_present(section, id, "path", &client.path, &mut errors);
    // Host and path only matter once joined: "localhost*" + "x" is not a prefix.
    if host_present && path_present {
        check_wildcard(section, id, client.pattern().as_str(), &mut errors);
    }
    check_size(section, id, props::MAX_INBOUND_MESSAGE_SIZE, client.max_inbound_message_size, &mut errors);
    check_size(section, id, props::MAX_INBOUND_METADATA_SIZE, client.max_inbound_metadata_size, &mut errors);
    check_duration(section, id, props::KEEP_ALIVE_TIME, client.keep_alive_time.as_deref(), &mut errors);
    check_duration(section, id, props::KEEP_ALIVE_TIMEOUT, client.keep_alive_timeout.as_deref(), &mut errors);
    check_extra(client, &mut errors);

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn duplicate_ids<E: RegistryEntry>(entries: &[E]) -> Vec<ValidationError> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut errors = Vec::new();

    for entry in entries {
        let id = entry.id();
        if !seen.insert(id) && reported.insert(id) {
            errors.push(ValidationError::DuplicateId { section: E::SECTION, id: id.to_string() });
        }
    }
    errors
}

fn check_identity<E: RegistryEntry>(entry: &E, errors: &mut Vec<ValidationError>) {
    if entry.id().trim().is_empty() {
        errors.push(ValidationError::EmptyId { section: E::SECTION });
    }
}

fn check_pattern(
    section: &'static str,
    id: &str,
    field: &'static str,
    value: &str,
    errors: &mut Vec<ValidationError>,
) {
    if check_present(section, id, field, value, errors) {
        check_wildcard(section, id, value.trim(), errors);
    }
}

fn check_present(
    section: &'static str,
    id: &str,
    field: &'static str,
    value: &str,
    errors: &mut Vec<ValidationError>,
) -> bool {
    if value.trim().is_empty() {
        errors.push(ValidationError::EmptyTarget { section, id: id.to_string(), field });
        return false;
    }
    true
}

fn check_wildcard(section: &'static str, id: &str, pattern: &str, errors: &mut Vec<ValidationError>) {
    // Only the last character may be a wildcard.
    if pattern.strip_suffix(WILDCARD).unwrap_or(pattern).contains(WILDCARD) {
        errors.push(ValidationError::MisplacedWildcard {
            section,
            id: id.to_string(),
            pattern: pattern.to_string(),
        });
    }
}

fn check_size(
    section: &'static str,
    id: &str,
    property: &'static str,
    value: Option<i64>,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(value) = value {
        if value <= 0 {
            errors.push(ValidationError::InvalidSize { section, id: id.to_string(), property, value });
        }
    }
}

fn check_duration(
    section: &'static str,
    id: &str,
    property: &'static str,
    value: Option<&str>,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(value) = value {
        if props::parse_duration(value).is_none() {
            errors.push(ValidationError::InvalidDuration {
                section,
                id: id.to_string(),
                property,
                value: value.to_string(),
            });
        }
    }
}

/// Extra properties that reuse a known name still have to parse.
fn check_extra<E: RegistryEntry>(entry: &E, errors: &mut Vec<ValidationError>) {
    for (name, value) in entry.extra() {
        let valid = match name.as_str() {
            props::MAX_INBOUND_MESSAGE_SIZE | props::MAX_INBOUND_METADATA_SIZE => props::parse_size(value).is_some(),
            props::KEEP_ALIVE_TIME | props::KEEP_ALIVE_TIMEOUT => props::parse_duration(value).is_some(),
            props::KEEP_ALIVE_WITHOUT_CALLS => props::parse_bool(value).is_some(),
            _ => true,
        };
        if !valid {
            errors.push(ValidationError::InvalidExtra {
                section: E::SECTION,
                id: entry.id().to_string(),
                property: name.clone(),
                value: value.clone(),
            });
        }
    }
}
