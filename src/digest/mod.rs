//! Request fingerprinting subsystem.
//!
//! # Data Flow
//! ```text
//! RequestView
//!     → body absent? → Ok(None)
//!     → headers.rs (collapse, sort, minus permanent ∪ configurable)
//!     → domhash.rs (canonical body digest)
//!     → generator.rs (body | address | headers → algorithm.rs → hex)
//!     → Ok(Some(Digest))
//!
//! Configuration:
//!     GeneratorConfig → FingerprintGenerator (immutable)
//!     → handle.rs (ArcSwap, replaced whole on reload)
//! ```
//!
//! # Design Decisions
//! - Pure, synchronous, CPU-bound; safe to call from any thread or task
//! - Header order, casing and duplication never affect the output
//! - Hash input order is fixed: body, destination address, headers

pub mod algorithm;
mod domhash;
pub mod error;
pub mod exclusion;
pub mod generator;
pub mod handle;
pub mod headers;

pub use algorithm::DigestAlgorithm;
pub use error::{DigestError, DigestResult};
pub use exclusion::{ExclusionConfig, PERMANENTLY_EXCLUDED_HEADERS};
pub use generator::{Digest, DigestGenerator, FingerprintGenerator};
pub use handle::GeneratorHandle;
pub use headers::CanonicalHeaders;
