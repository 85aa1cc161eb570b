// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in tools for the GenzSmart agent.

pub mod calculate;
pub mod datetime;
pub mod file;
pub mod memory;
pub mod web_search;

pub use calculate::CalculateTool;
pub use datetime::DateTimeTool;
pub use file::ReadFileTool;
pub use memory::RetrieveMemoryTool;
pub use web_search::WebSearchTool;

use std::sync::Arc;

use genzsmart_core::{FileContentSource, MemoryLookup};
use genzsmart_search::SearchService;

use crate::ToolRegistry;

/// Collaborators the context-dependent built-ins delegate to.
#[derive(Clone, Default)]
pub struct ToolServices {
    pub search: Option<Arc<SearchService>>,
    pub memory: Option<Arc<dyn MemoryLookup>>,
    pub files: Option<Arc<dyn FileContentSource>>,
}

/// Registers all five built-in tools into `registry`.
pub fn register_builtins(registry: &mut ToolRegistry, services: &ToolServices) {
    registry.register(Arc::new(WebSearchTool::new(services.search.clone())));
    registry.register(Arc::new(RetrieveMemoryTool::new(services.memory.clone())));
    registry.register(Arc::new(ReadFileTool::new(services.files.clone())));
    registry.register(Arc::new(CalculateTool::new()));
    registry.register(Arc::new(DateTimeTool::new()));
}

impl ToolRegistry {
    /// A registry holding exactly the built-in tools.
    pub fn with_builtins(services: &ToolServices) -> Self {
        let mut registry = Self::new();
        register_builtins(&mut registry, services);
        registry
    }
}
