// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait shared by provider and search adapters.

use async_trait::async_trait;

use crate::error::GenzsmartError;
use crate::types::{AdapterType, HealthStatus};

/// Identity and health surface every adapter exposes.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the stable identifier of this adapter instance (e.g. `openai`, `brave`).
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    /// Returns the kind of adapter.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, GenzsmartError>;
}
