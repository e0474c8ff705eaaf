//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the algorithm name resolves
//! - Validate value ranges and header names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: config → Result<(), Vec<ValidationError>>
//! - Only file-loaded configs pass through here; property maps stay lazy

use thiserror::Error;

use crate::config::schema::DigestServiceConfig;
use crate::digest::algorithm::DigestAlgorithm;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unsupported hash-algorithm '{0}'")]
    UnknownAlgorithm(String),

    #[error("max-body-depth must be greater than 0")]
    ZeroBodyDepth,

    #[error("{list} contains a blank header name at index {index}")]
    BlankHeaderName { list: &'static str, index: usize },

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a parsed configuration.
pub fn validate_config(config: &DigestServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let generator = &config.generator;

    if generator.hash_algorithm.parse::<DigestAlgorithm>().is_err() {
        errors.push(ValidationError::UnknownAlgorithm(
            generator.hash_algorithm.clone(),
        ));
    }

    if generator.max_body_depth == 0 {
        errors.push(ValidationError::ZeroBodyDepth);
    }

    check_names("headers-to-exclude", &generator.headers_to_exclude, &mut errors);
    if let Some(permanent) = &generator.permanently_excluded_headers {
        check_names("permanently-excluded-headers", permanent, &mut errors);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_names(list: &'static str, names: &[String], errors: &mut Vec<ValidationError>) {
    for (index, name) in names.iter().enumerate() {
        if name.trim().is_empty() {
            errors.push(ValidationError::BlankHeaderName { list, index });
        }
    }
}
