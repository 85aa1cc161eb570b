// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as numeric ranges and known provider identifiers.

use crate::diagnostic::ConfigError;
use crate::model::{GenzsmartConfig, PROVIDER_IDS};

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &GenzsmartConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let agent = &config.agent;
    if !PROVIDER_IDS.contains(&agent.default_provider.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.default_provider `{}` is not one of: {}",
                agent.default_provider,
                PROVIDER_IDS.join(", ")
            ),
        });
    }

    if !(0.0..=2.0).contains(&agent.temperature) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.temperature must be between 0 and 2, got {}",
                agent.temperature
            ),
        });
    }

    if agent.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "agent.max_tokens must be greater than 0".to_string(),
        });
    }

    if agent.history_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "agent.history_limit must be greater than 0".to_string(),
        });
    }

    if config.search.cache_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "search.cache_ttl_secs must be greater than 0".to_string(),
        });
    }

    if !(1..=10).contains(&config.search.default_num_results) {
        errors.push(ConfigError::Validation {
            message: format!(
                "search.default_num_results must be between 1 and 10, got {}",
                config.search.default_num_results
            ),
        });
    }

    let memory = &config.memory;
    for (name, value) in [
        ("memory.min_confidence", memory.min_confidence),
        ("memory.merge_threshold", memory.merge_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::Validation {
                message: format!("{name} must be between 0 and 1, got {value}"),
            });
        }
    }

    if let Some(path) = &memory.database_path
        && path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "memory.database_path must not be empty when set".to_string(),
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
    fn default_config_is_valid() {
        assert!(validate_config(&GenzsmartConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let mut config = GenzsmartConfig::default();
        config.agent.default_provider = "gemini".into();
        config.agent.temperature = 2.5;
        config.memory.merge_threshold = 1.5;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        let text: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert!(text.iter().any(|t| t.contains("default_provider")));
        assert!(text.iter().any(|t| t.contains("temperature")));
        assert!(text.iter().any(|t| t.contains("merge_threshold")));
    }

    #[test]
    fn rejects_out_of_range_num_results() {
        let mut config = GenzsmartConfig::default();
        config.search.default_num_results = 11;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_blank_database_path() {
        let mut config = GenzsmartConfig::default();
        config.memory.database_path = Some("  ".into());
        assert!(validate_config(&config).is_err());
    }
}
