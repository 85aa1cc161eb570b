// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./genzsmart.toml` > `~/.config/genzsmart/genzsmart.toml`
//! > `/etc/genzsmart/genzsmart.toml` with environment variable overrides via the
//! `GENZSMART_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::{GenzsmartConfig, PROVIDER_IDS};

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/genzsmart/genzsmart.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "genzsmart.toml";

/// Path of the per-user configuration file, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("genzsmart/genzsmart.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/genzsmart/genzsmart.toml` (system-wide)
/// 3. `~/.config/genzsmart/genzsmart.toml` (user XDG config)
/// 4. `./genzsmart.toml` (local directory)
/// 5. `GENZSMART_*` environment variables
pub fn load_config() -> Result<GenzsmartConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<GenzsmartConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GenzsmartConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GenzsmartConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GenzsmartConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(GenzsmartConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `GENZSMART_SEARCH_BRAVE_API_KEY` must map to
/// `search.brave_api_key`, not `search.brave.api.key`.
fn env_provider() -> Env {
    Env::prefixed("GENZSMART_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    if let Some(rest) = key.strip_prefix("providers_") {
        for id in PROVIDER_IDS {
            if let Some(field) = rest.strip_prefix(id).and_then(|r| r.strip_prefix('_')) {
                return format!("providers.{id}.{field}");
            }
        }
        return format!("providers.{rest}");
    }

    for section in ["agent", "search", "memory"] {
        if let Some(field) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{field}");
        }
    }

    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_section_keys() {
        assert_eq!(map_env_key("agent_log_level"), "agent.log_level");
        assert_eq!(map_env_key("search_brave_api_key"), "search.brave_api_key");
        assert_eq!(map_env_key("memory_database_path"), "memory.database_path");
    }

    #[test]
    fn maps_provider_keys() {
        assert_eq!(
            map_env_key("providers_openai_api_key"),
            "providers.openai.api_key"
        );
        assert_eq!(
            map_env_key("providers_openrouter_default_model"),
            "providers.openrouter.default_model"
        );
    }

    #[test]
    fn unknown_keys_pass_through() {
        assert_eq!(map_env_key("whatever"), "whatever");
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
[agent]
default_provider = "claude"
"#,
            )?;
            jail.set_env("GENZSMART_AGENT_DEFAULT_PROVIDER", "grok");
            jail.set_env("GENZSMART_PROVIDERS_GROK_API_KEY", "xai-test");

            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.agent.default_provider, "grok");
            assert_eq!(config.providers.grok.api_key.as_deref(), Some("xai-test"));
            Ok(())
        });
    }
}
