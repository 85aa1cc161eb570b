// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly for orchestrated turns.

use genzsmart_core::{Message, SearchResponse};

use crate::history::HistoryTurn;

/// Search results shown to the model.
const SEARCH_CONTEXT_RESULTS: usize = 5;

/// Substrings that suggest the answer depends on fresh information.
const SEARCH_KEYWORDS: &[&str] = &[
    "current", "latest", "news", "today", "weather", "price", "stock", "market", "recent",
    "update", "happening", "now", "2024", "2025", "2026",
];

const TOOL_CAPABILITIES: &str = "You have access to the following tools:
- web_search: Search the web for current information
- calculate: Perform mathematical calculations
- get_datetime: Get current date and time

When you need to use a tool, indicate it clearly in your response.";

pub(crate) const SYNTHESIS_INSTRUCTION: &str =
    "Based on the tool results above, provide a helpful response to the user.";

/// Whether `message` likely needs a web search.
pub fn needs_search(message: &str) -> bool {
    let lower = message.to_lowercase();
    SEARCH_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Base prompt, then the memory digest (if any), then the tool list (if
/// tools are enabled), separated by blank lines.
pub fn build_system_prompt(base: &str, memory_digest: Option<&str>, tools_enabled: bool) -> String {
    let mut prompt = base.to_string();
    if let Some(digest) = memory_digest.filter(|d| !d.is_empty()) {
        prompt.push_str("\n\n");
        prompt.push_str(digest);
    }
    if tools_enabled {
        prompt.push_str("\n\n");
        prompt.push_str(TOOL_CAPABILITIES);
    }
    prompt
}

/// The top results as a numbered list with source and snippet.
pub fn format_search_context(response: &SearchResponse) -> String {
    let mut lines = Vec::new();
    for (i, result) in response
        .results
        .iter()
        .take(SEARCH_CONTEXT_RESULTS)
        .enumerate()
    {
        lines.push(format!("{}. {}", i + 1, or_placeholder(&result.title, "No title")));
        lines.push(format!("   Source: {}", or_placeholder(&result.source, "Unknown")));
        lines.push(format!("   {}", or_placeholder(&result.snippet, "No snippet")));
        lines.push(String::new());
    }
    lines.join("\n")
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() { placeholder } else { value }
}

/// System message carrying search results; `None` when there are none.
pub fn search_message(response: &SearchResponse) -> Option<Message> {
    if response.results.is_empty() {
        return None;
    }
    Some(Message::system(format!(
        "Recent web search results:\n{}",
        format_search_context(response)
    )))
}

/// The last `limit` turns in prompt form.
pub fn history_messages(history: &[HistoryTurn], limit: usize) -> Vec<Message> {
    history[history.len().saturating_sub(limit)..]
        .iter()
        .map(HistoryTurn::to_message)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use genzsmart_core::{MessageRole, SearchResult};

    fn result(title: &str, source: &str, snippet: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            url: "https://example.com".to_string(),
            snippet: snippet.to_string(),
            source: source.to_string(),
            published_date: None,
            thumbnail: None,
        }
    }

    #[test]
    fn search_keywords_trigger() {
        assert!(needs_search("What's the latest Rust release?"));
        assert!(needs_search("weather in Paris"));
        assert!(needs_search("events in 2025"));
        assert!(!needs_search("Explain borrowing"));
    }

    #[test]
    fn system_prompt_sections_in_order() {
        let prompt = build_system_prompt("Base.", Some("## User Information\n"), true);
        let memory_at = prompt.find("## User Information").unwrap();
        let tools_at = prompt.find("You have access to the following tools:").unwrap();
        assert!(prompt.starts_with("Base.\n\n"));
        assert!(memory_at < tools_at);

        assert_eq!(build_system_prompt("Base.", Some(""), false), "Base.");
    }

    #[test]
    fn search_context_lists_top_five() {
        let results = (1..=7)
            .map(|i| result(&format!("T{i}"), "src.io", &format!("S{i}")))
            .collect();
        let response = SearchResponse::new("q", "mock", results, 0.1);
        let text = format_search_context(&response);
        assert!(text.starts_with("1. T1\n   Source: src.io\n   S1\n\n2. T2"));
        assert!(text.contains("5. T5"));
        assert!(!text.contains("6. T6"));
    }

    #[test]
    fn search_context_placeholders() {
        let response = SearchResponse::new("q", "mock", vec![result("", "", "")], 0.1);
        assert_eq!(
            format_search_context(&response),
            "1. No title\n   Source: Unknown\n   No snippet\n"
        );
    }

    #[test]
    fn empty_results_add_no_message() {
        let response = SearchResponse::new("q", "mock", vec![], 0.1);
        assert!(search_message(&response).is_none());
    }

    #[test]
    fn history_is_truncated_to_most_recent() {
        let history: Vec<HistoryTurn> = (0..12)
            .map(|i| {
                if i % 2 == 0 {
                    HistoryTurn::user(format!("u{i}"))
                } else {
                    HistoryTurn::assistant(format!("a{i}"))
                }
            })
            .collect();
        let messages = history_messages(&history, 10);
        assert_eq!(messages.len(), 10);
        assert_eq!(messages[0].content, "u2");
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[9].content, "a11");
    }
}
