// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic tool-call detection in free-form model output.
//!
//! Only two fixed phrasings are recognized: a search intent ("search for X",
//! "look up X", "find X") and an arithmetic request ("calculate EXPR",
//! "compute EXPR", "what is EXPR"). Matching is case-insensitive and every
//! match becomes a call. Providers with native function calling should be
//! preferred over this.

use std::sync::LazyLock;

use genzsmart_tools::ToolOutcome;
use regex::Regex;
use serde::Serialize;
use serde_json::{Value, json};

/// Results requested for searches the model asks for mid-answer.
pub const DETECTED_SEARCH_RESULTS: u64 = 3;

static SEARCH_INTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:search|look up|find)\s+(?:for\s+)?["']?([^"']+)["']?"#)
        .expect("search intent regex is valid")
});

static CALC_INTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:calculate|compute|what is)\s+([\d+\-*/().\s]+)")
        .expect("calculation intent regex is valid")
});

/// A tool invocation inferred from model text.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectedCall {
    Search { query: String },
    Calculate { expression: String },
}

impl DetectedCall {
    pub fn tool_name(&self) -> &'static str {
        match self {
            DetectedCall::Search { .. } => "web_search",
            DetectedCall::Calculate { .. } => "calculate",
        }
    }

    /// Arguments for [`genzsmart_tools::ToolRegistry::execute_tool`].
    pub fn arguments(&self) -> Value {
        match self {
            DetectedCall::Search { query } => {
                json!({"query": query, "num_results": DETECTED_SEARCH_RESULTS})
            }
            DetectedCall::Calculate { expression } => json!({"expression": expression}),
        }
    }

    pub fn into_record(self, result: ToolOutcome) -> ToolCallRecord {
        let executed = result.success;
        let tool = self.tool_name().to_string();
        let (query, expression) = match self {
            DetectedCall::Search { query } => (Some(query), None),
            DetectedCall::Calculate { expression } => (None, Some(expression)),
        };
        ToolCallRecord {
            tool,
            query,
            expression,
            result,
            executed,
        }
    }
}

/// What was called and what came back, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallRecord {
    pub tool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    pub result: ToolOutcome,
    /// True when the tool reported success.
    pub executed: bool,
}

/// All search intents in order, followed by all calculation intents.
pub fn detect_tool_calls(content: &str) -> Vec<DetectedCall> {
    let searches = SEARCH_INTENT
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|q| !q.is_empty())
        .map(|q| DetectedCall::Search {
            query: q.to_string(),
        });

    let calculations = CALC_INTENT
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|e| !e.is_empty())
        .map(|e| DetectedCall::Calculate {
            expression: e.to_string(),
        });

    searches.chain(calculations).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_search_phrasings() {
        let calls = detect_tool_calls("Let me search for \"rust async runtimes\" first.");
        assert_eq!(
            calls,
            [DetectedCall::Search {
                query: "rust async runtimes".to_string()
            }]
        );

        let calls = detect_tool_calls("I should LOOK UP the tide tables");
        assert_eq!(
            calls,
            [DetectedCall::Search {
                query: "the tide tables".to_string()
            }]
        );
    }

    #[test]
    fn detects_calculations() {
        let calls = detect_tool_calls("To answer, calculate (12 + 30) * 2 for the total.");
        assert_eq!(
            calls,
            [DetectedCall::Calculate {
                expression: "(12 + 30) * 2".to_string()
            }]
        );
        assert_eq!(calls[0].arguments(), json!({"expression": "(12 + 30) * 2"}));
    }

    #[test]
    fn what_is_without_digits_is_not_a_calculation() {
        assert!(detect_tool_calls("What is the capital of France?").is_empty());
    }

    #[test]
    fn searches_precede_calculations() {
        let calls = detect_tool_calls("Compute 2+2. Then find 'cheap flights'");
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].tool_name(), "web_search");
        assert_eq!(calls[1].tool_name(), "calculate");
        assert_eq!(
            calls[0].arguments(),
            json!({"query": "cheap flights", "num_results": 3})
        );
    }

    #[test]
    fn plain_answers_have_no_calls() {
        assert!(detect_tool_calls("Ownership means each value has one owner.").is_empty());
    }

    #[test]
    fn record_serializes_only_relevant_argument() {
        let record = DetectedCall::Calculate {
            expression: "2 + 2".to_string(),
        }
        .into_record(ToolOutcome::ok(json!({"result": 4, "expression": "2 + 2"})));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["tool"], "calculate");
        assert_eq!(value["executed"], true);
        assert!(value.get("query").is_none());
        assert_eq!(value["result"]["result"], 4);
    }
}
