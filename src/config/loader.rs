//! Configuration loading from disk and from host property maps.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::config::schema::{DigestServiceConfig, GeneratorConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid property: {0}")]
    Properties(#[from] serde_json::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DigestServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<DigestServiceConfig, ConfigError> {
    let config: DigestServiceConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

impl GeneratorConfig {
    /// Build from a host-supplied property map (e.g. `"headers-to-exclude"`).
    ///
    /// Unknown keys are ignored. A recognized key with the wrong shape is an error.
    /// Semantic checks are left to the first digest computation.
    pub fn from_properties(properties: &HashMap<String, Value>) -> Result<Self, ConfigError> {
        let map = properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<serde_json::Map<_, _>>();
        Ok(serde_json::from_value(Value::Object(map))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[generator]\nheaders-to-exclude = [\"X-Trace\"]\nhash-algorithm = \"sha256\""
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.generator.headers_to_exclude, vec!["X-Trace"]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/request-digest.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_validation_errors_are_collected() {
        let err = parse_config(
            "[generator]\nhash-algorithm = \"CRC32\"\nmax-body-depth = 0\nheaders-to-exclude = [\" \"]",
        )
        .unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let err = parse_config("[generator]\nheaders-to-exclude = \"X-Trace\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_properties() {
        let mut props = HashMap::new();
        props.insert("headers-to-exclude".to_string(), serde_json::json!(["X-Trace"]));
        props.insert("unrelated".to_string(), serde_json::json!(42));

        let config = GeneratorConfig::from_properties(&props).unwrap();
        assert_eq!(config.headers_to_exclude, vec!["X-Trace"]);
        assert_eq!(config.hash_algorithm, "MD5");

        let empty = GeneratorConfig::from_properties(&HashMap::new()).unwrap();
        assert!(empty.headers_to_exclude.is_empty());
    }

    #[test]
    fn test_from_properties_rejects_wrong_shape() {
        let mut props = HashMap::new();
        props.insert("headers-to-exclude".to_string(), serde_json::json!({"a": 1}));
        assert!(matches!(
            GeneratorConfig::from_properties(&props),
            Err(ConfigError::Properties(_))
        ));
    }
}
