//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (reload and lookup counters)
//!
//! Consumers:
//!     → stderr (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, binary only)
//! ```

pub mod logging;
pub mod metrics;
