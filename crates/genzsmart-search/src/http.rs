// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP plumbing shared by the search adapters.

use std::time::Duration;

use genzsmart_core::GenzsmartError;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use tracing::warn;

/// Browser-like agent; the DuckDuckGo front ends refuse unknown clients.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub(crate) fn build_client(provider: &str, timeout: Duration) -> Result<reqwest::Client, GenzsmartError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| GenzsmartError::Provider {
            message: format!("failed to build HTTP client for {provider}: {e}"),
            source: Some(Box::new(e)),
        })
}

pub(crate) fn transport_error(provider: &str, e: reqwest::Error) -> GenzsmartError {
    GenzsmartError::Provider {
        message: format!("{provider} search request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Returns the response unchanged on success, otherwise maps the status
/// into the error taxonomy.
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, GenzsmartError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = response.text().await.unwrap_or_default();
    warn!(provider, status = %status, body = %body, "search backend returned an error");

    Err(match status {
        StatusCode::TOO_MANY_REQUESTS => GenzsmartError::RateLimit {
            provider: provider.to_string(),
            retry_after,
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenzsmartError::ProviderNotConfigured {
            provider: provider.to_string(),
        },
        _ => GenzsmartError::provider(format!("{provider} returned HTTP {}", status.as_u16())),
    })
}

/// Parses a JSON body, labelling failures with the provider id.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T, GenzsmartError> {
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(provider, e))?;
    serde_json::from_str(&body).map_err(|e| GenzsmartError::Provider {
        message: format!("failed to parse {provider} response: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Host of `url` without a leading `www.`, or `"Unknown"`.
pub fn domain_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| "Unknown".to_string())
}
