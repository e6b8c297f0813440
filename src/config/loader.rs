//! Reads a TOML config file and hands back a validated [`GateConfig`].

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Why a config file could not be accepted. Validation carries every
/// problem found, not just the first.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config rejected: {}", render_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn render_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Reads, parses, and validates a config file.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let raw = fs::read_to_string(path)?;
    let config: GateConfig = toml::from_str(&raw)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/gate.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let path = write_temp("gate-malformed.toml", "listener = [[[");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_problems_surface_in_message() {
        let path = write_temp(
            "gate-invalid.toml",
            "[rate_limit.global]\nlimit = 0\n",
        );
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("rate_limit.global"));
    }

    #[test]
    fn test_valid_file_loads_with_defaults() {
        let path = write_temp(
            "gate-valid.toml",
            "[listener]\nbind_address = \"127.0.0.1:9000\"\n",
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.timeouts.request_secs, 30);
    }
}
