// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits implemented by provider and search adapters.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod context;
pub mod provider;
pub mod search;

pub use adapter::PluginAdapter;
pub use context::{FileContentSource, MemoryLookup, RecalledFact};
pub use provider::{ChunkStream, ProviderAdapter};
pub use search::{SearchParams, SearchProvider};
