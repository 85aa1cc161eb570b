// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed identifier-to-adapter map for the six supported AI vendors.
//!
//! [`catalog`] answers "what can this provider do" without constructing a
//! client; [`build_provider`] resolves credentials and returns a live adapter.

use std::str::FromStr;
use std::sync::Arc;

use genzsmart_config::GenzsmartConfig;
use genzsmart_core::error::GenzsmartError;
use genzsmart_core::traits::ProviderAdapter;
use genzsmart_core::types::ProviderModel;
use genzsmart_openai::{OpenAiCompatibleProvider, OpenAiFlavor};
use serde::Serialize;
use strum::{Display, EnumString};
use tracing::debug;

/// Identifier of a supported provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAi,
    Claude,
    DeepSeek,
    Grok,
    OpenRouter,
    Perplexity,
}

impl ProviderId {
    pub const ALL: [ProviderId; 6] = [
        ProviderId::OpenAi,
        ProviderId::Claude,
        ProviderId::DeepSeek,
        ProviderId::Grok,
        ProviderId::OpenRouter,
        ProviderId::Perplexity,
    ];

    /// Parses an identifier, reporting unknown ones as [`GenzsmartError::NotFound`].
    pub fn parse(id: &str) -> Result<Self, GenzsmartError> {
        ProviderId::from_str(id).map_err(|_| GenzsmartError::NotFound {
            resource: "provider".to_string(),
            id: id.to_string(),
        })
    }

    fn openai_flavor(self) -> Option<OpenAiFlavor> {
        match self {
            ProviderId::OpenAi => Some(OpenAiFlavor::OpenAi),
            ProviderId::DeepSeek => Some(OpenAiFlavor::DeepSeek),
            ProviderId::Grok => Some(OpenAiFlavor::Grok),
            ProviderId::OpenRouter => Some(OpenAiFlavor::OpenRouter),
            ProviderId::Claude | ProviderId::Perplexity => None,
        }
    }
}

/// Static description of a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderInfo {
    pub id: ProviderId,
    pub name: &'static str,
    pub default_model: &'static str,
    pub models: Vec<ProviderModel>,
}

/// Returns the static catalog entry for `id`. Never touches the network.
pub fn catalog(id: ProviderId) -> ProviderInfo {
    let (name, default_model, models) = match id.openai_flavor() {
        Some(flavor) => (
            flavor.display_name(),
            flavor.default_model(),
            flavor.catalog(),
        ),
        None if id == ProviderId::Claude => (
            "Anthropic Claude",
            genzsmart_claude::DEFAULT_MODEL,
            genzsmart_claude::catalog(),
        ),
        None => (
            "Perplexity",
            genzsmart_perplexity::DEFAULT_MODEL,
            genzsmart_perplexity::catalog(),
        ),
    };
    ProviderInfo {
        id,
        name,
        default_model,
        models,
    }
}

/// Catalog entries for every supported provider, in registry order.
pub fn all_providers() -> Vec<ProviderInfo> {
    ProviderId::ALL.into_iter().map(catalog).collect()
}

/// Builds a live adapter for `id` from configuration.
///
/// Credentials are resolved first, so a missing key yields
/// [`GenzsmartError::ProviderNotConfigured`] without any network I/O.
pub fn build_provider(
    id: ProviderId,
    config: &GenzsmartConfig,
) -> Result<Arc<dyn ProviderAdapter>, GenzsmartError> {
    let table = config
        .providers
        .get(&id.to_string())
        .ok_or_else(|| GenzsmartError::Internal(format!("no config table for provider {id}")))?;
    debug!(provider = %id, "building provider");

    let provider: Arc<dyn ProviderAdapter> = match id {
        ProviderId::Claude => Arc::new(genzsmart_claude::ClaudeProvider::new(table)?),
        ProviderId::Perplexity => Arc::new(genzsmart_perplexity::PerplexityProvider::new(table)?),
        ProviderId::OpenAi | ProviderId::DeepSeek | ProviderId::Grok | ProviderId::OpenRouter => {
            let flavor = id
                .openai_flavor()
                .ok_or_else(|| GenzsmartError::Internal(format!("{id} has no wire flavor")))?;
            Arc::new(OpenAiCompatibleProvider::new(flavor, table)?)
        }
    };
    Ok(provider)
}

/// Builds the adapter named by `agent.default_provider`.
pub fn build_default_provider(
    config: &GenzsmartConfig,
) -> Result<Arc<dyn ProviderAdapter>, GenzsmartError> {
    build_provider(ProviderId::parse(&config.agent.default_provider)?, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use genzsmart_config::ProviderConfig;

    #[test]
    fn ids_match_config_tables() {
        let ids: Vec<String> = ProviderId::ALL.iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, genzsmart_config::PROVIDER_IDS);
    }

    #[test]
    fn parse_rejects_unknown_ids() {
        assert_eq!(ProviderId::parse("openrouter").unwrap(), ProviderId::OpenRouter);
        let err = ProviderId::parse("gemini").unwrap_err();
        assert_eq!(err.to_string(), "provider not found: gemini");
    }

    #[test]
    fn catalog_needs_no_credentials() {
        let info = catalog(ProviderId::Perplexity);
        assert_eq!(info.models.len(), 4);
        assert_eq!(info.default_model, "llama-3.1-sonar-large-128k-online");

        let claude = catalog(ProviderId::Claude);
        assert_eq!(claude.name, "Anthropic Claude");
        assert_eq!(claude.models.len(), 3);

        assert_eq!(all_providers().len(), 6);
    }

    #[test]
    fn catalog_serializes_lowercase_id() {
        let json = serde_json::to_value(catalog(ProviderId::DeepSeek)).unwrap();
        assert_eq!(json["id"], "deepseek");
        assert_eq!(json["default_model"], "deepseek-chat");
    }

    #[test]
    fn build_with_key_returns_matching_adapter() {
        let mut config = GenzsmartConfig::default();
        config.providers.grok = ProviderConfig {
            api_key: Some("xai-test".into()),
            base_url: None,
            default_model: Some("grok-vision-beta".into()),
        };
        let provider = build_provider(ProviderId::Grok, &config).unwrap();
        assert_eq!(provider.provider_id(), "grok");
        assert_eq!(provider.default_model(), "grok-vision-beta");
    }

    #[test]
    fn build_without_key_is_not_configured() {
        // SAFETY: test-only env manipulation; no other test reads this var.
        unsafe { std::env::remove_var("OPENROUTER_API_KEY") };
        let result = build_provider(ProviderId::OpenRouter, &GenzsmartConfig::default());
        assert!(matches!(
            result,
            Err(GenzsmartError::ProviderNotConfigured { ref provider }) if provider == "openrouter"
        ));
    }

    #[test]
    fn default_provider_follows_agent_config() {
        let mut config = GenzsmartConfig::default();
        config.agent.default_provider = "claude".into();
        config.providers.claude.api_key = Some("sk-ant-test".into());
        let provider = build_default_provider(&config).unwrap();
        assert_eq!(provider.provider_id(), "claude");
    }
}
