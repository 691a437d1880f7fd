//! Typed gRPC settings over the raw registries.
//!
//! # Data Flow
//! ```text
//! server call  "pkg.Service/Method"        → service.rs → server registry
//! client call  "host/pkg.Service/Method"   → client.rs  → client registry
//! ```
//!
//! # Design Decisions
//! - Server and client settings live in separate registries
//! - Values stay raw strings in the registry; parsing happens here
//! - A value that fails to parse reads as not configured

pub mod client;
pub mod props;
pub mod service;

pub use client::{ClientSettings, call_uri, client_pattern};
pub use service::{ServiceSettings, interceptor_list, max_inbound_message_size};
