// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web search for GenzSmart.
//!
//! Four backends sit behind [`SearchProvider`](genzsmart_core::SearchProvider):
//! Brave and SerpAPI (API key required), and the key-less DuckDuckGo HTML and
//! Lite front ends. [`SearchService`] picks one, fails over by availability
//! and caches responses for a fixed TTL.

pub mod brave;
pub mod cache;
pub mod duckduckgo;
mod http;
pub mod serpapi;
pub mod service;

pub use brave::BraveSearch;
pub use cache::{CacheStats, Clock, SearchCache, SystemClock, fingerprint};
pub use duckduckgo::{DuckDuckGoSearch, Frontend};
pub use http::domain_of;
pub use serpapi::SerpApiSearch;
pub use service::{ProviderStatus, SearchRequest, SearchService};
