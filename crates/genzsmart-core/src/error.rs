// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for GenzSmart.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across provider, search, memory and agent code.
///
/// Each variant maps to a stable wire code via [`GenzsmartError::code`], which
/// the HTTP layer reports to clients.
#[derive(Debug, Error)]
pub enum GenzsmartError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Generic vendor failure (API error, malformed payload, transport failure).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No usable credential for the named provider.
    #[error("Provider '{provider}' is not configured. Please set the API key.")]
    ProviderNotConfigured { provider: String },

    /// The provider exists and is configured but cannot currently serve requests.
    #[error("provider '{provider}' is unavailable: {message}")]
    ProviderUnavailable { provider: String, message: String },

    /// The vendor rejected the call with a rate limit.
    #[error("rate limit exceeded for {provider}{}", format_retry_after(.retry_after))]
    RateLimit {
        provider: String,
        retry_after: Option<Duration>,
    },

    /// Bad input shape.
    #[error("validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// A requested entity does not exist.
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// File-content extraction failed.
    #[error("file error: {message}")]
    File {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Security policy violation.
    #[error("security error: {0}")]
    Security(String),

    /// Credential encryption or decryption failure.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GenzsmartError {
    /// Convenience constructor for a [`GenzsmartError::Provider`] without a source.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Convenience constructor for a [`GenzsmartError::Validation`] tied to a field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Provider { .. } => "PROVIDER_ERROR",
            Self::ProviderNotConfigured { .. } => "PROVIDER_NOT_CONFIGURED",
            Self::ProviderUnavailable { .. } => "PROVIDER_UNAVAILABLE",
            Self::RateLimit { .. } => "RATE_LIMIT_EXCEEDED",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::File { .. } => "FILE_ERROR",
            Self::Security(_) => "SECURITY_ERROR",
            Self::Encryption(_) => "ENCRYPTION_ERROR",
            Self::Storage { .. } => "STORAGE_ERROR",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller can act on this error (fix config, wait, change input)
    /// as opposed to an unexpected internal failure.
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::ProviderNotConfigured { .. }
                | Self::ProviderUnavailable { .. }
                | Self::RateLimit { .. }
                | Self::Validation { .. }
                | Self::NotFound { .. }
        )
    }
}

fn format_retry_after(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(d) => format!(" (retry after {}s)", d.as_secs()),
        None => String::new(),
    }
}
