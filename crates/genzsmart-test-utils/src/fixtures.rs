// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory stand-ins for session collaborators.

use std::collections::HashMap;

use async_trait::async_trait;
use genzsmart_core::{FileContentSource, GenzsmartError};

/// Serves fixed text per file id. Ids registered with [`StaticFileSource::with_failure`]
/// fail with [`GenzsmartError::File`]; unknown ids are `NotFound`.
#[derive(Debug, Default, Clone)]
pub struct StaticFileSource {
    files: HashMap<String, Result<String, String>>,
}

impl StaticFileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, id: &str, text: &str) -> Self {
        self.files.insert(id.to_string(), Ok(text.to_string()));
        self
    }

    pub fn with_failure(mut self, id: &str, message: &str) -> Self {
        self.files.insert(id.to_string(), Err(message.to_string()));
        self
    }
}

#[async_trait]
impl FileContentSource for StaticFileSource {
    async fn extract_text(&self, file_id: &str) -> Result<String, GenzsmartError> {
        match self.files.get(file_id) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => Err(GenzsmartError::File {
                message: message.clone(),
                source: None,
            }),
            None => Err(GenzsmartError::NotFound {
                resource: "file".to_string(),
                id: file_id.to_string(),
            }),
        }
    }
}
