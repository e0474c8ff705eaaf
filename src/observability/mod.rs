//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! digest::FingerprintGenerator produces:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, histograms via the `metrics` facade)
//!
//! Consumers:
//!     → whatever subscriber / recorder the host installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a metrics recorder; without one, updates are no-ops
//! - Logging setup is only done by binaries
//! - Log fields carry the destination address so failures can be traced to a request

pub mod logging;
pub mod metrics;
