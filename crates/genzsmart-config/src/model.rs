// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for GenzSmart.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use genzsmart_core::GenzsmartError;
use serde::{Deserialize, Serialize};

/// Identifiers accepted in `[providers.*]` tables and `agent.default_provider`.
pub const PROVIDER_IDS: [&str; 6] = [
    "openai",
    "claude",
    "deepseek",
    "grok",
    "openrouter",
    "perplexity",
];

/// Top-level GenzSmart configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenzsmartConfig {
    /// Orchestrator behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Per-vendor credentials and endpoints.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Web search settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Long-term memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Orchestrator behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Base system prompt placed ahead of memory and tool descriptions.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Provider used when the caller does not name one.
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Sampling temperature for orchestrated completions.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Token cap for orchestrated completions.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Number of prior turns replayed into each prompt.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Whether tool descriptions are advertised and tool calls executed.
    #[serde(default = "default_true")]
    pub enable_tools: bool,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            default_provider: default_provider(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            history_limit: default_history_limit(),
            enable_tools: true,
            log_level: default_log_level(),
        }
    }
}

fn default_system_prompt() -> String {
    "You are a helpful AI assistant.".to_string()
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_history_limit() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Credentials and endpoint overrides for a single vendor.
///
/// Every field is optional; vendor defaults apply when unset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// API key. Falls back to the vendor's environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL override (proxies, self-hosted gateways).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Default model override.
    #[serde(default)]
    pub default_model: Option<String>,
}

impl ProviderConfig {
    /// Resolves the API key from config, then each listed environment variable.
    pub fn resolve_api_key(
        &self,
        provider: &str,
        env_vars: &[&str],
    ) -> Result<String, GenzsmartError> {
        if let Some(key) = &self.api_key
            && !key.trim().is_empty()
        {
            return Ok(key.clone());
        }

        env_vars
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
            .ok_or_else(|| GenzsmartError::ProviderNotConfigured {
                provider: provider.to_string(),
            })
    }
}

/// Per-vendor provider tables.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderConfig,
    #[serde(default)]
    pub claude: ProviderConfig,
    #[serde(default)]
    pub deepseek: ProviderConfig,
    #[serde(default)]
    pub grok: ProviderConfig,
    #[serde(default)]
    pub openrouter: ProviderConfig,
    #[serde(default)]
    pub perplexity: ProviderConfig,
}

impl ProvidersConfig {
    /// Looks up a provider table by identifier.
    pub fn get(&self, id: &str) -> Option<&ProviderConfig> {
        match id {
            "openai" => Some(&self.openai),
            "claude" => Some(&self.claude),
            "deepseek" => Some(&self.deepseek),
            "grok" => Some(&self.grok),
            "openrouter" => Some(&self.openrouter),
            "perplexity" => Some(&self.perplexity),
            _ => None,
        }
    }
}

/// Web search configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Brave Search subscription token. Falls back to `BRAVE_API_KEY`.
    #[serde(default)]
    pub brave_api_key: Option<String>,

    /// SerpAPI key. Falls back to `SERPAPI_API_KEY`.
    #[serde(default)]
    pub serpapi_api_key: Option<String>,

    /// Lifetime of cached search responses, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Number of results requested when the caller does not specify one.
    #[serde(default = "default_num_results")]
    pub default_num_results: usize,

    /// Region hint passed to DuckDuckGo (`kl` parameter).
    #[serde(default = "default_region")]
    pub region: String,

    /// Per-request HTTP timeout, in seconds.
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            brave_api_key: None,
            serpapi_api_key: None,
            cache_ttl_secs: default_cache_ttl_secs(),
            default_num_results: default_num_results(),
            region: default_region(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_num_results() -> usize {
    5
}

fn default_region() -> String {
    "us-en".to_string()
}

fn default_search_timeout_secs() -> u64 {
    30
}

/// Long-term memory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Enable fact extraction and memory injection.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// SQLite database for facts. Unset keeps facts in process memory.
    #[serde(default)]
    pub database_path: Option<String>,

    /// Facts below this confidence are never persisted.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Maximum facts included in a prompt digest.
    #[serde(default = "default_context_max_facts")]
    pub context_max_facts: usize,

    /// Similarity at or above which two same-category facts are merged.
    #[serde(default = "default_merge_threshold")]
    pub merge_threshold: f64,

    /// Ask the model to extract facts before falling back to patterns.
    #[serde(default = "default_true")]
    pub ai_extraction: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database_path: None,
            min_confidence: default_min_confidence(),
            context_max_facts: default_context_max_facts(),
            merge_threshold: default_merge_threshold(),
            ai_extraction: true,
        }
    }
}

fn default_min_confidence() -> f64 {
    0.5
}

fn default_context_max_facts() -> usize {
    5
}

fn default_merge_threshold() -> f64 {
    0.8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn providers_lookup_covers_every_id() {
        let providers = ProvidersConfig::default();
        for id in PROVIDER_IDS {
            assert!(providers.get(id).is_some(), "missing table for {id}");
        }
        assert!(providers.get("gemini").is_none());
    }

    #[test]
    fn configured_key_wins() {
        let cfg = ProviderConfig {
            api_key: Some("sk-config".into()),
            ..Default::default()
        };
        let key = cfg
            .resolve_api_key("openai", &["GENZSMART_TEST_UNSET_KEY"])
            .unwrap();
        assert_eq!(key, "sk-config");
    }

    #[test]
    fn blank_key_without_env_is_not_configured() {
        let cfg = ProviderConfig {
            api_key: Some("   ".into()),
            ..Default::default()
        };
        let err = cfg
            .resolve_api_key("grok", &["GENZSMART_TEST_DEFINITELY_UNSET"])
            .unwrap_err();
        assert!(matches!(err, GenzsmartError::ProviderNotConfigured { ref provider } if provider == "grok"));
    }
}
