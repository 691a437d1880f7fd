//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Read config → Init logging → Build registries → Apply entries
//!
//! Watch mode:
//!     signals.rs (SIGINT/SIGTERM) → shutdown.rs trigger → watch loop exits
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
