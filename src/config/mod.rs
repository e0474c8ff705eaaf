//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)                 host property map (JSON values)
//!     → loader.rs (parse)                → GeneratorConfig::from_properties
//!     → validation.rs (semantic checks)
//!     → DigestServiceConfig (validated, immutable)
//!     → digest::GeneratorHandle
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → new generator published through the handle
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults; nothing is required
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{DigestServiceConfig, GeneratorConfig, ObservabilityConfig};
pub use validation::{validate_config, ValidationError};
