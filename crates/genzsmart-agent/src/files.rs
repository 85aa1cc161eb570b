// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attached-file fan-out.

use futures::future::join_all;
use genzsmart_core::{FileContentSource, Message};
use tracing::warn;

/// Text pulled from the files that could be read.
#[derive(Debug, Default, PartialEq)]
pub struct AttachedFiles {
    /// `(file_id, text)` in attachment order.
    pub contents: Vec<(String, String)>,
}

impl AttachedFiles {
    pub fn processed_ids(&self) -> Vec<String> {
        self.contents.iter().map(|(id, _)| id.clone()).collect()
    }

    /// A single system message with every extract, or `None` when nothing
    /// could be read.
    pub fn to_message(&self) -> Option<Message> {
        if self.contents.is_empty() {
            return None;
        }
        let sections: Vec<String> = self
            .contents
            .iter()
            .map(|(id, text)| format!("File: {id}\n{text}"))
            .collect();
        Some(Message::system(format!(
            "Attached file contents:\n\n{}",
            sections.join("\n\n")
        )))
    }
}

/// Extract every file concurrently. A file that fails is logged and left
/// out; it never fails the batch.
pub async fn load_attached_files(source: &dyn FileContentSource, file_ids: &[String]) -> AttachedFiles {
    let results = join_all(file_ids.iter().map(|id| source.extract_text(id))).await;

    let mut contents = Vec::with_capacity(file_ids.len());
    for (id, result) in file_ids.iter().zip(results) {
        match result {
            Ok(text) => contents.push((id.clone(), text)),
            Err(e) => warn!(file_id = id.as_str(), error = %e, "attached file extraction failed"),
        }
    }
    AttachedFiles { contents }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genzsmart_core::MessageRole;
    use genzsmart_test_utils::StaticFileSource;

    #[tokio::test]
    async fn one_failing_file_does_not_fail_the_batch() {
        let source = StaticFileSource::new()
            .with_file("a", "alpha text")
            .with_failure("b", "corrupt pdf")
            .with_file("c", "gamma text");
        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string(), "missing".to_string()];

        let files = load_attached_files(&source, &ids).await;
        assert_eq!(files.processed_ids(), ["a", "c"]);

        let message = files.to_message().unwrap();
        assert_eq!(message.role, MessageRole::System);
        assert_eq!(
            message.content,
            "Attached file contents:\n\nFile: a\nalpha text\n\nFile: c\ngamma text"
        );
    }

    #[tokio::test]
    async fn nothing_readable_adds_no_message() {
        let source = StaticFileSource::new().with_failure("x", "boom");
        let files = load_attached_files(&source, &["x".to_string()]).await;
        assert!(files.processed_ids().is_empty());
        assert!(files.to_message().is_none());
    }
}
