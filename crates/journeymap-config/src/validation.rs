// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as URL shape, non-zero batch sizes, and sane intervals.

use crate::diagnostic::ConfigError;
use crate::model::JourneymapConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
///
/// A missing `api.key` passes validation: the key is only required when a
/// tracker is constructed, so config-only commands keep working without one.
pub fn validate_config(config: &JourneymapConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let url = config.api.url.trim();
    if url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "api.url must not be empty".to_string(),
        });
    } else if !url.starts_with("http://") && !url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("api.url `{url}` must start with http:// or https://"),
        });
    }

    if let Some(key) = &config.api.key
        && key.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "api.key must not be empty when set".to_string(),
        });
    }

    if config.batch.batch_size == 0 {
        errors.push(ConfigError::Validation {
            message: "batch.batch_size must be at least 1".to_string(),
        });
    }

    if config.batch.flush_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "batch.flush_interval_secs must be at least 1".to_string(),
        });
    }

    if config.batch.max_event_age_secs < config.batch.flush_interval_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "batch.max_event_age_secs ({}) must be at least batch.flush_interval_secs ({})",
                config.batch.max_event_age_secs, config.batch.flush_interval_secs
            ),
        });
    }

    if config.delivery.initial_backoff_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "delivery.initial_backoff_ms must be at least 1".to_string(),
        });
    }

    if config.delivery.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "delivery.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.storage.state_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.state_path must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = JourneymapConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_api_url_fails_validation() {
        let mut config = JourneymapConfig::default();
        config.api.url = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("api.url"))));
    }

    #[test]
    fn non_http_api_url_fails_validation() {
        let mut config = JourneymapConfig::default();
        config.api.url = "ftp://collect.example.com".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("http"))));
    }

    #[test]
    fn zero_batch_size_fails_validation() {
        let mut config = JourneymapConfig::default();
        config.batch.batch_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("batch_size"))));
    }

    #[test]
    fn max_age_below_interval_fails_validation() {
        let mut config = JourneymapConfig::default();
        config.batch.flush_interval_secs = 30;
        config.batch.max_event_age_secs = 10;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("max_event_age_secs"))));
    }

    #[test]
    fn missing_api_key_passes_validation() {
        let config = JourneymapConfig::default();
        assert!(config.api.key.is_none());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn blank_api_key_fails_validation() {
        let mut config = JourneymapConfig::default();
        config.api.key = Some("   ".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("api.key"))));
    }

    #[test]
    fn consent_section_deserializes() {
        let toml_str = r#"
[consent]
respect_do_not_track = false
require_consent = true
"#;
        let config: JourneymapConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.consent.respect_do_not_track);
        assert!(config.consent.require_consent);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn sections_deny_unknown_fields() {
        let toml_str = r#"
[delivery]
max_retries = 2
backoff = 100
"#;
        let result = toml::from_str::<JourneymapConfig>(toml_str);
        assert!(result.is_err());
    }
}
