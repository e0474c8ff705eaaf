//! Deterministic request fingerprints for response caching.
//!
//! A [`FingerprintGenerator`] reduces a request's destination address, its
//! header set (minus excluded headers) and its structured body to a single
//! hex digest. Requests that differ only in header order or casing, or in
//! insignificant body formatting, get the same digest. Bodyless requests get
//! none.

pub mod config;
pub mod digest;
pub mod observability;
pub mod request;

pub use config::schema::{DigestServiceConfig, GeneratorConfig};
pub use digest::{Digest, DigestError, DigestGenerator, FingerprintGenerator, GeneratorHandle};
pub use request::{RequestBody, RequestView};
