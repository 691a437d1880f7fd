//! Property names and value parsing shared by the server and client views.

use std::time::Duration;

pub const MAX_INBOUND_MESSAGE_SIZE: &str = "maxInboundMessageSize";
pub const MAX_INBOUND_METADATA_SIZE: &str = "maxInboundMetadataSize";
pub const SERVER_INTERCEPTORS: &str = "serverInterceptors";
pub const CLIENT_INTERCEPTORS: &str = "clientInterceptors";
pub const KEEP_ALIVE_TIME: &str = "keepAliveTime";
pub const KEEP_ALIVE_TIMEOUT: &str = "keepAliveTimeout";
pub const KEEP_ALIVE_WITHOUT_CALLS: &str = "keepAliveWithoutCalls";
pub const HEADERS_TO_PROPAGATE: &str = "headersToPropagate";
pub const USER_AGENT: &str = "userAgent";
pub const OVERRIDE_AUTHORITY: &str = "overrideAuthority";

/// Parse a positive size. Zero, negatives and garbage are rejected.
pub fn parse_size(raw: &str) -> Option<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}

/// Parse a duration given as bare seconds or with an `ms`, `s`, `m` or `h`
/// suffix.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let split = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let value: u64 = digits.parse().ok()?;

    match unit.trim() {
        "" | "s" => Some(Duration::from_secs(value)),
        "ms" => Some(Duration::from_millis(value)),
        "m" => value.checked_mul(60).map(Duration::from_secs),
        "h" => value.checked_mul(3600).map(Duration::from_secs),
        _ => None,
    }
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Split a comma or whitespace separated list, dropping empty items.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
