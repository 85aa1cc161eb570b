// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for GenzSmart.
//!
//! This crate provides the error taxonomy, the normalized conversation and
//! search types, and the capability traits every provider and search adapter
//! implements.

pub mod error;
pub mod stream;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::GenzsmartError;
pub use stream::normalize_stream;
pub use traits::{
    ChunkStream, FileContentSource, MemoryLookup, PluginAdapter, ProviderAdapter, RecalledFact,
    SearchParams, SearchProvider,
};
pub use types::{
    AdapterType, ChatCompletionRequest, ChatCompletionResponse, ConnectionStatus, HealthStatus,
    Message, MessageRole, Metadata, ProviderModel, SearchResponse, SearchResult, SearchType,
    StreamChunk, TokenUsage,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_distinct() {
        use std::collections::HashSet;
        use std::time::Duration;

        let errors = [
            GenzsmartError::Config("test".into()),
            GenzsmartError::provider("test"),
            GenzsmartError::ProviderNotConfigured {
                provider: "openai".into(),
            },
            GenzsmartError::ProviderUnavailable {
                provider: "openai".into(),
                message: "down".into(),
            },
            GenzsmartError::RateLimit {
                provider: "openai".into(),
                retry_after: None,
            },
            GenzsmartError::validation("expression", "empty"),
            GenzsmartError::NotFound {
                resource: "fact".into(),
                id: "1".into(),
            },
            GenzsmartError::File {
                message: "unreadable".into(),
                source: None,
            },
            GenzsmartError::Security("test".into()),
            GenzsmartError::Encryption("test".into()),
            GenzsmartError::Storage {
                source: Box::new(std::io::Error::other("test")),
            },
            GenzsmartError::Timeout {
                duration: Duration::from_secs(30),
            },
            GenzsmartError::Internal("test".into()),
        ];

        let codes: HashSet<&str> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;

        for variant in [AdapterType::Provider, AdapterType::Search] {
            let s = variant.to_string();
            assert_eq!(AdapterType::from_str(&s).unwrap(), variant);
        }
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        assert_ne!(HealthStatus::Degraded("slow".into()), healthy);
        assert_ne!(HealthStatus::Unhealthy("down".into()), healthy);
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
        fn _assert_search_provider<T: SearchProvider>() {}
    }
}
