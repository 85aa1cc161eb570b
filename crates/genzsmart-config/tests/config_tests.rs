// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the GenzSmart configuration system.

use genzsmart_config::diagnostic::ConfigError;
use genzsmart_config::{GenzsmartConfig, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn full_config_deserializes() {
    let toml = r#"
[agent]
system_prompt = "You are terse."
default_provider = "claude"
temperature = 0.2
max_tokens = 1024
history_limit = 6
enable_tools = false
log_level = "debug"

[providers.openai]
api_key = "sk-openai"

[providers.claude]
api_key = "sk-ant"
default_model = "claude-3-haiku-20240307"

[providers.openrouter]
base_url = "http://localhost:8080/v1"

[search]
brave_api_key = "brave-token"
cache_ttl_secs = 600
default_num_results = 3
region = "de-de"

[memory]
enabled = true
database_path = "/tmp/genzsmart-memory.db"
min_confidence = 0.6
context_max_facts = 8
merge_threshold = 0.85
ai_extraction = false
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.system_prompt, "You are terse.");
    assert_eq!(config.agent.default_provider, "claude");
    assert_eq!(config.agent.history_limit, 6);
    assert!(!config.agent.enable_tools);
    assert_eq!(config.providers.openai.api_key.as_deref(), Some("sk-openai"));
    assert_eq!(
        config.providers.claude.default_model.as_deref(),
        Some("claude-3-haiku-20240307")
    );
    assert_eq!(
        config.providers.openrouter.base_url.as_deref(),
        Some("http://localhost:8080/v1")
    );
    assert!(config.providers.perplexity.api_key.is_none());
    assert_eq!(config.search.brave_api_key.as_deref(), Some("brave-token"));
    assert_eq!(config.search.cache_ttl_secs, 600);
    assert_eq!(config.search.region, "de-de");
    assert_eq!(
        config.memory.database_path.as_deref(),
        Some("/tmp/genzsmart-memory.db")
    );
    assert!(!config.memory.ai_extraction);
}

/// An empty file yields the compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML is valid");
    let defaults = GenzsmartConfig::default();
    assert_eq!(config.agent.system_prompt, "You are a helpful AI assistant.");
    assert_eq!(config.agent.default_provider, defaults.agent.default_provider);
    assert_eq!(config.agent.max_tokens, 2000);
    assert_eq!(config.agent.history_limit, 10);
    assert_eq!(config.search.cache_ttl_secs, 3600);
    assert_eq!(config.search.default_num_results, 5);
    assert_eq!(config.memory.min_confidence, 0.5);
    assert_eq!(config.memory.merge_threshold, 0.8);
    assert!(config.memory.database_path.is_none());
}

/// Unknown keys are rejected with a suggestion.
#[test]
fn unknown_key_produces_suggestion() {
    let toml = r#"
[search]
cache_ttl_sec = 60
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown key");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "cache_ttl_sec");
            assert_eq!(suggestion.as_deref(), Some("cache_ttl_secs"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Unknown provider tables are rejected.
#[test]
fn unknown_provider_table_is_rejected() {
    let toml = r#"
[providers.gemini]
api_key = "x"
"#;

    let errors = load_and_validate_str(toml).expect_err("gemini is not a provider");
    assert!(matches!(errors[0], ConfigError::UnknownKey { .. }));
}

/// Wrong value types are reported as InvalidType.
#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[agent]
history_limit = "ten"
"#;

    let errors = load_and_validate_str(toml).expect_err("string is not an integer");
    assert!(
        matches!(&errors[0], ConfigError::InvalidType { key, .. } if key.contains("history_limit")),
        "got {errors:?}"
    );
}

/// Semantic violations surface as validation errors after a successful parse.
#[test]
fn semantic_violation_is_reported() {
    let toml = r#"
[agent]
default_provider = "gemini"
"#;

    let errors = load_and_validate_str(toml).expect_err("gemini is not allowed");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}
