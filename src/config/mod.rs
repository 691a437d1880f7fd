//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks, per entry)
//!     → applier.rs (activate / modify / deactivate entries)
//!     → server and client ConfigRegistry
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs reads new file
//!     → applier.rs reconciles against the previous file
//!     → invalid entries keep their previous registration
//! ```
//!
//! # Design Decisions
//! - Known properties are typed in the schema; anything else goes in `extra`
//! - Values are validated before registration, never at query time
//! - A file that fails to parse leaves every registration untouched

pub mod applier;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use applier::{ApplyReport, ConfigApplier};
pub use loader::{ConfigError, load_config, parse_config, read_config};
pub use schema::{ClientConfig, GrpcConfigFile, ObservabilityConfig, RegistryEntry, ServiceConfig};
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;
