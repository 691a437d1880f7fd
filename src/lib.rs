//! Per-target gRPC configuration resolution.
//!
//! Settings are registered against exact targets or wildcard prefixes and
//! resolved per call by merging every applicable entry, general prefixes
//! first and the exact target last.

pub mod config;
pub mod grpc;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod service;

pub use config::{ConfigApplier, GrpcConfigFile};
pub use grpc::{ClientSettings, ServiceSettings};
pub use lifecycle::Shutdown;
pub use registry::{ConfigRegistry, PropertyMap, RegistrationHandle, UriPattern};
pub use service::GrpcConfigService;
