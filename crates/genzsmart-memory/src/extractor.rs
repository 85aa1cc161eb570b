// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fact extraction from user messages.
//!
//! The model is asked first for a JSON array of facts. When that yields
//! nothing (no provider, call failure, unparseable or empty reply), a fixed
//! library of phrase patterns runs over the lowercased message instead.

use std::sync::{Arc, LazyLock};

use genzsmart_core::{ChatCompletionRequest, Message, MessageRole, ProviderAdapter};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::types::{ExtractedFact, FactCategory};

/// Messages shorter than this (in characters) are never mined.
const MIN_MESSAGE_CHARS: usize = 10;

/// Prior messages included in the AI prompt.
const CONTEXT_WINDOW: usize = 5;

const EXTRACTION_SYSTEM: &str =
    "You are a fact extraction assistant. Extract clear, factual information from user messages.";

const EXTRACTION_PROMPT: &str = r#"Analyze the following user message and extract any facts, preferences, personal information, goals, or skills mentioned.

Previous context:
{context}

Current message:
{message}

Extract facts in this JSON format:
[
  {
    "category": "preference|fact|skill|goal|personal_info",
    "content": "the fact in clear, third-person form",
    "confidence": 0.0-1.0
  }
]

Only include high-confidence facts. Return empty array if no clear facts are present."#;

const EXTRACTION_KEYWORDS: &[&str] = &[
    "my", "i am", "i'm", "i like", "i love", "i prefer", "i work", "i live", "my name",
    "my birthday", "i want", "my goal", "i can", "i know",
];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("fact pattern regex is valid"))
        .collect()
}

static PREFERENCE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"i (?:prefer|like|love|enjoy) (.+)",
        r"my favorite (.+) is (.+)",
        r"i (?:don't|do not) (?:like|prefer|enjoy) (.+)",
        r"i hate (.+)",
        r"i'm (?:not )?a fan of (.+)",
    ])
});

static PERSONAL_INFO_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"my name is (.+)",
        r"i (?:work|am employed) (?:at|for) (.+)",
        r"i'm a (.+) (?:at|working) (.+)",
        r"i live in (.+)",
        r"i'm from (.+)",
        r"my (?:job|profession|career) is (.+)",
    ])
});

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"my birthday is (.+)",
        r"i was born on (.+)",
        r"my anniversary is (.+)",
    ])
});

static GOAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"i want to (.+)",
        r"my goal is to (.+)",
        r"i'm trying to (.+)",
        r"i plan to (.+)",
        r"i'm working on (.+)",
    ])
});

static SKILL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"i know how to (.+)",
        r"i can (.+)",
        r"i'm good at (.+)",
        r"i'm skilled in (.+)",
        r"i have experience with (.+)",
    ])
});

/// Whether `message` is worth mining for facts.
///
/// Only user messages of at least ten characters that are not commands
/// (`/`, `!` or `?` prefix) and mention a first-person trigger phrase qualify.
pub fn should_extract(message: &str, role: MessageRole) -> bool {
    if role != MessageRole::User {
        return false;
    }
    if message.chars().count() < MIN_MESSAGE_CHARS {
        return false;
    }
    if message.starts_with(['/', '!', '?']) {
        return false;
    }
    let lower = message.to_lowercase();
    EXTRACTION_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Deterministic extraction over the five pattern families.
pub fn extract_facts_pattern(message: &str) -> Vec<ExtractedFact> {
    let lower = message.to_lowercase();
    let families: [(&[Regex], FactCategory, f64); 5] = [
        (PREFERENCE_PATTERNS.as_slice(), FactCategory::Preference, 0.7),
        (PERSONAL_INFO_PATTERNS.as_slice(), FactCategory::PersonalInfo, 0.8),
        (DATE_PATTERNS.as_slice(), FactCategory::Fact, 0.9),
        (GOAL_PATTERNS.as_slice(), FactCategory::Goal, 0.6),
        (SKILL_PATTERNS.as_slice(), FactCategory::Skill, 0.6),
    ];

    let mut facts = Vec::new();
    for (patterns, category, confidence) in families {
        for pattern in patterns {
            for m in pattern.find_iter(&lower) {
                facts.push(ExtractedFact {
                    category,
                    content: capitalize(m.as_str().trim()),
                    confidence,
                    source_message: Some(message.to_string()),
                });
            }
        }
    }
    facts
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Deserialize)]
struct RawFact {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Parse a model reply into facts.
///
/// Accepts a bare JSON array, one wrapped in a markdown fence, or one
/// surrounded by prose. Missing categories become `fact`, missing
/// confidences 0.5; confidences are clamped to [0, 1] and entries without
/// content are dropped. Any parse failure yields an empty list.
pub fn parse_extraction_response(response: &str, source_message: &str) -> Vec<ExtractedFact> {
    let trimmed = response.trim();
    let start = trimmed.find('[').unwrap_or(0);
    let end = trimmed.rfind(']').map(|i| i + 1).unwrap_or(trimmed.len());
    let json_str = if start < end { &trimmed[start..end] } else { trimmed };

    let raw = match serde_json::from_str::<Vec<RawFact>>(json_str) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Failed to parse extraction response: {e}");
            debug!("Raw response: {response}");
            return Vec::new();
        }
    };

    raw.into_iter()
        .filter_map(|fact| {
            let content = fact.content.unwrap_or_default().trim().to_string();
            if content.is_empty() {
                return None;
            }
            let confidence = fact.confidence.filter(|c| c.is_finite()).unwrap_or(0.5);
            Some(ExtractedFact {
                category: fact
                    .category
                    .as_deref()
                    .map(FactCategory::from_str_lenient)
                    .unwrap_or(FactCategory::Fact),
                content,
                confidence: confidence.clamp(0.0, 1.0),
                source_message: Some(source_message.to_string()),
            })
        })
        .collect()
}

fn build_extraction_prompt(message: &str, context: &[String]) -> String {
    let recent = &context[context.len().saturating_sub(CONTEXT_WINDOW)..];
    EXTRACTION_PROMPT
        .replace("{context}", &recent.join("\n"))
        .replace("{message}", message)
}

/// Extracts facts with an optional model and a pattern fallback.
pub struct MemoryExtractor {
    provider: Option<Arc<dyn ProviderAdapter>>,
    use_ai: bool,
}

impl MemoryExtractor {
    /// An extractor that consults `provider` before falling back to patterns.
    pub fn new(provider: Option<Arc<dyn ProviderAdapter>>) -> Self {
        Self {
            provider,
            use_ai: true,
        }
    }

    pub fn pattern_only() -> Self {
        Self {
            provider: None,
            use_ai: false,
        }
    }

    pub fn with_ai(mut self, use_ai: bool) -> Self {
        self.use_ai = use_ai;
        self
    }

    /// Model-driven extraction. Never fails; problems are logged and yield
    /// an empty list.
    pub async fn extract_facts_ai(&self, message: &str, context: &[String]) -> Vec<ExtractedFact> {
        let Some(provider) = &self.provider else {
            return Vec::new();
        };

        let request = ChatCompletionRequest::new(
            provider.default_model(),
            vec![
                Message::system(EXTRACTION_SYSTEM),
                Message::user(build_extraction_prompt(message, context)),
            ],
        )
        .with_temperature(0.1)
        .with_max_tokens(500);

        match provider.complete(request).await {
            Ok(response) => parse_extraction_response(&response.content, message),
            Err(e) => {
                warn!(provider = provider.provider_id(), "AI fact extraction failed: {e}");
                Vec::new()
            }
        }
    }

    /// Model extraction first, patterns when the model yields nothing.
    pub async fn extract_facts(&self, message: &str, context: &[String]) -> Vec<ExtractedFact> {
        if self.use_ai {
            let facts = self.extract_facts_ai(message, context).await;
            if !facts.is_empty() {
                debug!(count = facts.len(), "facts extracted by model");
                return facts;
            }
        }
        extract_facts_pattern(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genzsmart_core::GenzsmartError;
    use genzsmart_test_utils::MockProvider;
    use proptest::prelude::*;

    #[test]
    fn should_extract_gates() {
        assert!(!should_extract("ok", MessageRole::User));
        assert!(should_extract("My name is Sam and I live in Texas", MessageRole::User));
        assert!(!should_extract("My name is Sam and I live in Texas", MessageRole::Assistant));
        assert!(!should_extract("/remember my name is Sam", MessageRole::User));
        assert!(!should_extract("?what is my name again", MessageRole::User));
        assert!(!should_extract("The weather is nice today", MessageRole::User));
    }

    #[test]
    fn pattern_extraction_finds_personal_info() {
        let facts = extract_facts_pattern("My name is Sam and I live in Texas");
        let contents: Vec<&str> = facts.iter().map(|f| f.content.as_str()).collect();
        assert!(contents.contains(&"My name is sam and i live in texas"));
        assert!(contents.contains(&"I live in texas"));
        assert!(facts.iter().all(|f| f.category == FactCategory::PersonalInfo));
        assert!(facts.iter().all(|f| (f.confidence - 0.8).abs() < f64::EPSILON));
    }

    #[test]
    fn pattern_confidences_per_family() {
        let cases = [
            ("I love hiking in the alps", FactCategory::Preference, 0.7),
            ("my birthday is june 3rd", FactCategory::Fact, 0.9),
            ("my goal is to run a marathon", FactCategory::Goal, 0.6),
            ("i'm good at chess", FactCategory::Skill, 0.6),
        ];
        for (message, category, confidence) in cases {
            let facts = extract_facts_pattern(message);
            let fact = facts
                .iter()
                .find(|f| f.category == category)
                .unwrap_or_else(|| panic!("no {category} fact in {message:?}"));
            assert!((fact.confidence - confidence).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn pattern_content_is_capitalized() {
        let facts = extract_facts_pattern("Honestly I prefer green tea");
        assert_eq!(facts[0].content, "I prefer green tea");
        assert_eq!(facts[0].source_message.as_deref(), Some("Honestly I prefer green tea"));
    }

    #[test]
    fn no_patterns_no_facts() {
        assert!(extract_facts_pattern("What time is it in Tokyo?").is_empty());
    }

    #[test]
    fn parse_valid_json_array() {
        let response = r#"[
            {"category": "preference", "content": "User likes tea", "confidence": 0.9},
            {"category": "personal_info", "content": "User lives in Oslo", "confidence": 0.8}
        ]"#;
        let facts = parse_extraction_response(response, "msg");
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].category, FactCategory::Preference);
        assert_eq!(facts[1].content, "User lives in Oslo");
    }

    #[test]
    fn parse_markdown_fence_and_prose() {
        let response = "Here you go:\n```json\n[{\"content\": \"User uses Rust\"}]\n```\nDone.";
        let facts = parse_extraction_response(response, "msg");
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].category, FactCategory::Fact);
        assert!((facts[0].confidence - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_clamps_and_drops_empty() {
        let response = r#"[
            {"category": "goal", "content": "User wants to learn Go", "confidence": 1.7},
            {"category": "skill", "content": "", "confidence": 0.9},
            {"category": "hobby", "content": "User knits", "confidence": -2}
        ]"#;
        let facts = parse_extraction_response(response, "msg");
        assert_eq!(facts.len(), 2);
        assert!((facts[0].confidence - 1.0).abs() < f64::EPSILON);
        assert_eq!(facts[1].category, FactCategory::Fact);
        assert!(facts[1].confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn parse_malformed_returns_empty() {
        assert!(parse_extraction_response("This is not JSON at all.", "msg").is_empty());
        assert!(parse_extraction_response("] nonsense [", "msg").is_empty());
    }

    #[test]
    fn prompt_keeps_last_five_context_messages() {
        let context: Vec<String> = (1..=7).map(|i| format!("turn {i}")).collect();
        let prompt = build_extraction_prompt("I live in Lyon", &context);
        assert!(!prompt.contains("turn 2"));
        assert!(prompt.contains("turn 3\nturn 4\nturn 5\nturn 6\nturn 7"));
        assert!(prompt.contains("Current message:\nI live in Lyon"));
    }

    #[tokio::test]
    async fn ai_extraction_preferred_when_it_yields_facts() {
        let provider = Arc::new(MockProvider::with_responses(vec![
            r#"[{"category": "personal_info", "content": "User is named Sam", "confidence": 0.95}]"#
                .to_string(),
        ]));
        let extractor = MemoryExtractor::new(Some(provider.clone()));

        let facts = extractor.extract_facts("My name is Sam", &[]).await;
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].content, "User is named Sam");

        let requests = provider.requests().await;
        assert_eq!(requests.len(), 1);
        assert!((requests[0].temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(requests[0].max_tokens, Some(500));
        assert_eq!(requests[0].messages[0].content, EXTRACTION_SYSTEM);
    }

    #[tokio::test]
    async fn falls_back_to_patterns_on_empty_or_failed_ai() {
        let provider = Arc::new(MockProvider::with_responses(vec!["[]".to_string()]));
        provider.add_error(GenzsmartError::provider("down")).await;
        let extractor = MemoryExtractor::new(Some(provider));

        for _ in 0..2 {
            let facts = extractor.extract_facts("i live in berlin", &[]).await;
            assert_eq!(facts.len(), 1);
            assert_eq!(facts[0].content, "I live in berlin");
        }
    }

    #[tokio::test]
    async fn pattern_only_never_calls_model() {
        let extractor = MemoryExtractor::pattern_only();
        let facts = extractor.extract_facts("I can speak French", &[]).await;
        assert_eq!(facts[0].category, FactCategory::Skill);
    }

    proptest! {
        #[test]
        fn parsed_confidence_always_in_unit_range(c in -1.0e6f64..1.0e6) {
            let response = format!(r#"[{{"content": "x", "confidence": {c}}}]"#);
            for fact in parse_extraction_response(&response, "m") {
                prop_assert!((0.0..=1.0).contains(&fact.confidence));
            }
        }
    }
}
