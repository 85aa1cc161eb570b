// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for GenzSmart.
//!
//! Deterministic, network-free stand-ins for the provider, search and file
//! collaborators.

pub mod fixtures;
pub mod mock_provider;
pub mod mock_search;

pub use fixtures::StaticFileSource;
pub use mock_provider::MockProvider;
pub use mock_search::{MockSearchProvider, sample_results};
