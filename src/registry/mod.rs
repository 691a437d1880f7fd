//! Per-target configuration registry.
//!
//! # Data Flow
//! ```text
//! Configuration owner (activate / modify / deactivate)
//!     → store.rs add_or_update / remove (exclusive lock, cache cleared)
//!     → table.rs (pattern → properties, handle → pattern)
//!
//! Request path (per call):
//!     URI
//!     → store.rs resolve
//!     → cache hit? return
//!     → table.rs merge: wildcard prefixes ascending, then exact entry
//!     → cache result (even if empty)
//! ```
//!
//! # Design Decisions
//! - Patterns are ordered lexically so general prefixes merge first
//! - Exact entries win over every wildcard on key conflicts
//! - No errors: absence of configuration is `None`

pub mod pattern;
pub mod store;
pub mod table;

use std::collections::BTreeMap;

/// Property name → raw string value.
pub type PropertyMap = BTreeMap<String, String>;

pub use pattern::{UriPattern, WILDCARD};
pub use store::ConfigRegistry;
pub use table::RegistrationHandle;
