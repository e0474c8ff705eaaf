//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the digest service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::digest::algorithm::DEFAULT_ALGORITHM;
use crate::digest::exclusion::{ExclusionConfig, PERMANENTLY_EXCLUDED_HEADERS};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct DigestServiceConfig {
    /// Fingerprint generator settings.
    pub generator: GeneratorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Fingerprint generator configuration.
///
/// No field is required; an empty section yields the built-in behaviour.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorConfig {
    /// Header names (case-insensitive) excluded in addition to the permanent list.
    pub headers_to_exclude: Vec<String>,

    /// Replacement for the built-in permanent list.
    pub permanently_excluded_headers: Option<Vec<String>>,

    /// Message digest algorithm name ("MD5", "SHA-256").
    pub hash_algorithm: String,

    /// Maximum element nesting accepted in a body.
    pub max_body_depth: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            headers_to_exclude: Vec::new(),
            permanently_excluded_headers: None,
            hash_algorithm: DEFAULT_ALGORITHM.to_string(),
            max_body_depth: 256,
        }
    }
}

impl GeneratorConfig {
    /// Configuration with only a configurable exclusion list.
    pub fn excluding<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers_to_exclude: headers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Resolve the permanent and configurable lists.
    pub fn exclusions(&self) -> ExclusionConfig {
        match &self.permanently_excluded_headers {
            Some(permanent) => ExclusionConfig::new(permanent, &self.headers_to_exclude),
            None => ExclusionConfig::new(PERMANENTLY_EXCLUDED_HEADERS, &self.headers_to_exclude),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Record digest counters and timings through the `metrics` facade.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: DigestServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config, DigestServiceConfig::default());
        assert!(config.generator.headers_to_exclude.is_empty());
        assert_eq!(config.generator.hash_algorithm, "MD5");
    }

    #[test]
    fn test_kebab_case_generator_options() {
        let config: DigestServiceConfig = toml::from_str(
            r#"
            [generator]
            headers-to-exclude = ["X-Trace", "X-Span"]
            permanently-excluded-headers = ["Date"]
            hash-algorithm = "SHA-256"
            max-body-depth = 32

            [observability]
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.generator.headers_to_exclude, vec!["X-Trace", "X-Span"]);
        assert_eq!(config.generator.max_body_depth, 32);
        assert_eq!(config.observability.log_level, "debug");

        let exclusions = config.generator.exclusions();
        assert!(exclusions.is_excluded("date"));
        assert!(!exclusions.is_excluded("Connection"));
        assert!(exclusions.is_excluded("x-span"));
    }
}
