// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for GenzSmart.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use genzsmart_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Default provider: {}", config.agent.default_provider);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

use tracing::{debug, warn};

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    AgentConfig, GenzsmartConfig, MemoryConfig, PROVIDER_IDS, ProviderConfig, ProvidersConfig,
    SearchConfig,
};

/// Load configuration from the XDG hierarchy and validate it.
///
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On Figment error: converts to diagnostics with typo suggestions
pub fn load_and_validate() -> Result<GenzsmartConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<GenzsmartConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<GenzsmartConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

fn finish(
    loaded: Result<GenzsmartConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<GenzsmartConfig, Vec<ConfigError>> {
    let result = match loaded {
        Ok(config) => validation::validate_config(&config).map(|()| config),
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    };
    match &result {
        Ok(config) => debug!(
            default_provider = config.agent.default_provider.as_str(),
            memory_store = if config.memory.database_path.is_some() { "sqlite" } else { "in-memory" },
            "configuration loaded"
        ),
        Err(errors) => warn!(errors = errors.len(), "configuration rejected"),
    }
    result
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    if let Ok(content) = std::fs::read_to_string(loader::LOCAL_CONFIG_FILE) {
        let path = std::env::current_dir()
            .map(|d| d.join(loader::LOCAL_CONFIG_FILE).display().to_string())
            .unwrap_or_else(|_| loader::LOCAL_CONFIG_FILE.to_string());
        sources.push((path, content));
    }

    if let Some(path) = loader::user_config_path()
        && let Ok(content) = std::fs::read_to_string(&path)
    {
        sources.push((path.display().to_string(), content));
    }

    if let Ok(content) = std::fs::read_to_string(loader::SYSTEM_CONFIG_PATH) {
        sources.push((loader::SYSTEM_CONFIG_PATH.to_string(), content));
    }

    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn logs_successful_load() {
        let config = load_and_validate_str("[agent]\ndefault_provider = \"claude\"\n").unwrap();
        assert_eq!(config.agent.default_provider, "claude");
        assert!(logs_contain("configuration loaded"));
        assert!(logs_contain("claude"));
    }

    #[test]
    #[traced_test]
    fn logs_rejected_config() {
        let errors = load_and_validate_str("[agent]\ntemperature = 5.0\n").unwrap_err();
        assert!(!errors.is_empty());
        assert!(logs_contain("configuration rejected"));
    }
}
