// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-less DuckDuckGo adapters scraping the HTML and Lite front ends.
//!
//! Both pages are parsed with regular expressions: each result link is
//! located first, then its snippet is searched for only in the markup
//! between that link and the next one, so a result without a snippet never
//! shifts the pairing of the others.

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use genzsmart_core::error::GenzsmartError;
use genzsmart_core::traits::{PluginAdapter, SearchParams, SearchProvider};
use genzsmart_core::types::{AdapterType, HealthStatus, SearchResponse, SearchResult, SearchType};
use regex::Regex;
use tracing::debug;

use crate::http::{build_client, check_status, domain_of, transport_error};

pub const HTML_PROVIDER_ID: &str = "duckduckgo";
pub const LITE_PROVIDER_ID: &str = "duckduckgo_lite";
pub const HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html";
pub const LITE_ENDPOINT: &str = "https://lite.duckduckgo.com/lite";

static HTML_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s([^>]*class=["'][^"']*\bresult__a\b[^"']*["'][^>]*)>(.*?)</a>"#)
        .expect("HTML link regex is valid")
});
static HTML_SNIPPET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<[a-z]+[^>]*class=["'][^"']*\bresult__snippet\b[^"']*["'][^>]*>(.*?)</[a-z]+>"#)
        .expect("HTML snippet regex is valid")
});
static LITE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s([^>]*class=["'][^"']*\bresult-link\b[^"']*["'][^>]*)>(.*?)</a>"#)
        .expect("Lite link regex is valid")
});
static LITE_SNIPPET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<td[^>]*class=["'][^"']*\bresult-snippet\b[^"']*["'][^>]*>(.*?)</td>"#)
        .expect("Lite snippet regex is valid")
});
static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bhref=["']([^"']*)["']"#).expect("href regex is valid")
});
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag regex is valid"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Which DuckDuckGo front end an adapter talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frontend {
    /// `html.duckduckgo.com`, queried with GET.
    Html,
    /// `lite.duckduckgo.com`, queried with a form POST.
    Lite,
}

impl Frontend {
    fn provider_id(self) -> &'static str {
        match self {
            Frontend::Html => HTML_PROVIDER_ID,
            Frontend::Lite => LITE_PROVIDER_ID,
        }
    }

    fn default_endpoint(self) -> &'static str {
        match self {
            Frontend::Html => HTML_ENDPOINT,
            Frontend::Lite => LITE_ENDPOINT,
        }
    }
}

pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    frontend: Frontend,
    endpoint: String,
    region: String,
}

impl DuckDuckGoSearch {
    pub fn new(frontend: Frontend, region: &str, timeout: Duration) -> Result<Self, GenzsmartError> {
        Ok(Self {
            client: build_client(frontend.provider_id(), timeout)?,
            frontend,
            endpoint: frontend.default_endpoint().to_string(),
            region: region.to_string(),
        })
    }

    pub fn html(region: &str, timeout: Duration) -> Result<Self, GenzsmartError> {
        Self::new(Frontend::Html, region, timeout)
    }

    pub fn lite(region: &str, timeout: Duration) -> Result<Self, GenzsmartError> {
        Self::new(Frontend::Lite, region, timeout)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Extracts results from either front end's markup.
pub fn parse_results(frontend: Frontend, html: &str) -> Vec<SearchResult> {
    let (link_re, snippet_re) = match frontend {
        Frontend::Html => (&*HTML_LINK, &*HTML_SNIPPET),
        Frontend::Lite => (&*LITE_LINK, &*LITE_SNIPPET),
    };

    let links: Vec<_> = link_re.captures_iter(html).collect();
    let mut results = Vec::with_capacity(links.len());
    for (i, caps) in links.iter().enumerate() {
        let (Some(whole), Some(attrs), Some(title)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let Some(href) = HREF.captures(attrs.as_str()).and_then(|c| c.get(1)) else {
            continue;
        };

        let region_end = links
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(html.len(), |m| m.start());
        let snippet = snippet_re
            .captures(&html[whole.end()..region_end])
            .and_then(|c| c.get(1))
            .map(|m| clean_text(m.as_str()))
            .unwrap_or_default();

        let url = resolve_redirect(frontend, &decode_entities(href.as_str()));
        results.push(SearchResult {
            title: clean_text(title.as_str()),
            source: domain_of(&url),
            url,
            snippet,
            published_date: None,
            thumbnail: None,
        });
    }
    results
}

/// Strips tags, decodes entities and collapses whitespace.
fn clean_text(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, "");
    let decoded = decode_entities(&stripped);
    WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}

/// Decodes the handful of HTML entities the result pages emit.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => numeric_entity(entity),
            }?;
            Some((ch, end + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn numeric_entity(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

/// Resolves `href` against the front end's origin and unwraps
/// `duckduckgo.com/l/?uddg=<target>` redirect links. An href that cannot be
/// resolved is returned unchanged.
fn resolve_redirect(frontend: Frontend, href: &str) -> String {
    let Ok(absolute) = url::Url::parse(frontend.default_endpoint()).and_then(|base| base.join(href))
    else {
        return href.to_string();
    };
    if absolute.host_str().is_some_and(|h| h.ends_with("duckduckgo.com"))
        && let Some((_, target)) = absolute.query_pairs().find(|(k, _)| k == "uddg")
    {
        return target.into_owned();
    }
    absolute.into()
}

#[async_trait]
impl PluginAdapter for DuckDuckGoSearch {
    fn name(&self) -> &str {
        self.frontend.provider_id()
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Search
    }

    async fn health_check(&self) -> Result<HealthStatus, GenzsmartError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn provider_id(&self) -> &str {
        self.frontend.provider_id()
    }

    fn provider_name(&self) -> &str {
        match self.frontend {
            Frontend::Html => "DuckDuckGo",
            Frontend::Lite => "DuckDuckGo Lite",
        }
    }

    /// No credential is needed.
    fn is_available(&self) -> bool {
        true
    }

    /// Only general web search is offered; `search_type` is ignored.
    async fn search(
        &self,
        query: &str,
        num_results: usize,
        search_type: SearchType,
        params: &SearchParams,
    ) -> Result<SearchResponse, GenzsmartError> {
        let provider = self.frontend.provider_id();
        let region = params.get("region").map_or(self.region.as_str(), String::as_str);
        let form = [("q", query), ("kl", region)];

        let started = Instant::now();
        let request = match self.frontend {
            Frontend::Html => self.client.get(&self.endpoint).query(&form),
            Frontend::Lite => self.client.post(&self.endpoint).form(&form),
        };
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(provider, e))?;
        let html = check_status(provider, response)
            .await?
            .text()
            .await
            .map_err(|e| transport_error(provider, e))?;
        let elapsed = started.elapsed().as_secs_f64();

        let mut results = parse_results(self.frontend, &html);
        results.truncate(num_results);
        debug!(provider, query, count = results.len(), %search_type, "DuckDuckGo search complete");

        Ok(SearchResponse::new(query, provider, results, elapsed))
    }
}
