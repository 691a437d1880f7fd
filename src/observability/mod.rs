//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry / config / watcher
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (resolution and mutation counters)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Prometheus scrape (watch mode, optional)
//! ```

pub mod logging;
pub mod metrics;
