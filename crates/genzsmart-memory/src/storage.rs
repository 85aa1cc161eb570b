// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Confidence-weighted fact storage on top of a [`FactRepository`].

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use genzsmart_config::model::MemoryConfig;
use genzsmart_core::{GenzsmartError, MemoryLookup, RecalledFact};
use tracing::{debug, info};
use uuid::Uuid;

use crate::repository::{FactRepository, InMemoryFactRepository, SqliteFactRepository};
use crate::types::{FactCategory, FactUpdate, MemoryFact, MemoryStats, NewFact, ScoredFact};

/// Facts below this confidence never reach a prompt.
pub const CONTEXT_MIN_CONFIDENCE: f64 = 0.5;

/// Query tokens of this many characters or fewer are ignored for relevance.
const MIN_KEYWORD_CHARS: usize = 3;

/// Default page size for [`MemoryStorage::list_facts`].
pub const DEFAULT_LIST_LIMIT: usize = 50;

fn by_confidence_desc(a: &MemoryFact, b: &MemoryFact) -> Ordering {
    b.confidence
        .partial_cmp(&a.confidence)
        .unwrap_or(Ordering::Equal)
}

fn validate_content(content: &str) -> Result<(), GenzsmartError> {
    if content.trim().is_empty() {
        return Err(GenzsmartError::validation("content", "fact content must not be empty"));
    }
    Ok(())
}

fn validate_confidence(confidence: f64) -> Result<(), GenzsmartError> {
    if !(0.0..=1.0).contains(&confidence) {
        return Err(GenzsmartError::validation(
            "confidence",
            format!("confidence must be between 0 and 1, got {confidence}"),
        ));
    }
    Ok(())
}

pub struct MemoryStorage {
    repo: Arc<dyn FactRepository>,
}

impl MemoryStorage {
    pub fn new(repo: Arc<dyn FactRepository>) -> Self {
        Self { repo }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryFactRepository::new()))
    }

    /// SQLite storage when `database_path` is set, process memory otherwise.
    pub async fn from_config(config: &MemoryConfig) -> Result<Self, GenzsmartError> {
        match &config.database_path {
            Some(path) => {
                if let Some(parent) = Path::new(path).parent()
                    && !parent.as_os_str().is_empty()
                {
                    tokio::fs::create_dir_all(parent).await.map_err(|e| {
                        GenzsmartError::Storage {
                            source: Box::new(e),
                        }
                    })?;
                }
                info!(path = %path, "opening memory database");
                Ok(Self::new(Arc::new(SqliteFactRepository::open(path).await?)))
            }
            None => Ok(Self::in_memory()),
        }
    }

    pub async fn add_fact(&self, new: NewFact) -> Result<MemoryFact, GenzsmartError> {
        validate_content(&new.content)?;
        validate_confidence(new.confidence)?;

        let now = Utc::now();
        let fact = MemoryFact {
            id: Uuid::new_v4().to_string(),
            conversation_id: new.conversation_id,
            category: new.category,
            content: new.content.trim().to_string(),
            confidence: new.confidence,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.repo.insert(&fact).await?;
        debug!(id = %fact.id, category = %fact.category, "stored memory fact");
        Ok(fact)
    }

    /// An active fact by id.
    pub async fn get_fact(&self, id: &str) -> Result<Option<MemoryFact>, GenzsmartError> {
        Ok(self.repo.get(id).await?.filter(|f| f.is_active))
    }

    /// Active facts, highest confidence first.
    pub async fn list_facts(
        &self,
        category: Option<FactCategory>,
        limit: usize,
        min_confidence: f64,
    ) -> Result<Vec<MemoryFact>, GenzsmartError> {
        let mut facts: Vec<MemoryFact> = self
            .repo
            .list_active()
            .await?
            .into_iter()
            .filter(|f| f.confidence >= min_confidence)
            .filter(|f| category.is_none_or(|c| f.category == c))
            .collect();
        facts.sort_by(by_confidence_desc);
        facts.truncate(limit);
        Ok(facts)
    }

    /// Apply a partial update to an active fact. `Ok(None)` when no active
    /// fact has this id.
    pub async fn update_fact(
        &self,
        id: &str,
        update: FactUpdate,
    ) -> Result<Option<MemoryFact>, GenzsmartError> {
        let Some(mut fact) = self.get_fact(id).await? else {
            return Ok(None);
        };

        if let Some(content) = update.content {
            validate_content(&content)?;
            fact.content = content.trim().to_string();
        }
        if let Some(confidence) = update.confidence {
            validate_confidence(confidence)?;
            fact.confidence = confidence;
        }
        if let Some(is_active) = update.is_active {
            fact.is_active = is_active;
        }
        fact.updated_at = Utc::now();

        if !self.repo.update(&fact).await? {
            return Ok(None);
        }
        Ok(Some(fact))
    }

    /// Soft delete. Returns false if no fact has this id.
    pub async fn delete_fact(&self, id: &str) -> Result<bool, GenzsmartError> {
        self.repo.soft_delete(id).await
    }

    /// Case-insensitive substring search, best matches first.
    ///
    /// Similarity is `min(2 * len(query) / len(content), 1)`: the larger the
    /// share of the fact the query covers, the better the hit.
    pub async fn search_facts(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ScoredFact>, GenzsmartError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let query_len = needle.chars().count() as f64;

        let mut hits: Vec<ScoredFact> = self
            .repo
            .list_active()
            .await?
            .into_iter()
            .filter(|f| f.content.to_lowercase().contains(&needle))
            .map(|fact| {
                let content_len = fact.content.chars().count().max(1) as f64;
                let similarity = (query_len / content_len * 2.0).min(1.0);
                ScoredFact { fact, similarity }
            })
            .collect();
        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        hits.truncate(limit);
        Ok(hits)
    }

    /// Facts relevant to `query` for prompt injection.
    ///
    /// Each active fact with confidence >= 0.5 scores one point per query
    /// token (longer than three characters) found in its content, times its
    /// confidence. Facts scoring zero are dropped; the top `max_facts` are
    /// returned.
    pub async fn get_facts_for_context(
        &self,
        query: &str,
        max_facts: usize,
        categories: Option<&[FactCategory]>,
    ) -> Result<Vec<MemoryFact>, GenzsmartError> {
        let lowered = query.to_lowercase();
        let keywords: Vec<&str> = lowered
            .split_whitespace()
            .filter(|k| k.chars().count() > MIN_KEYWORD_CHARS)
            .collect();
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(MemoryFact, f64)> = self
            .repo
            .list_active()
            .await?
            .into_iter()
            .filter(|f| f.confidence >= CONTEXT_MIN_CONFIDENCE)
            .filter(|f| categories.is_none_or(|cs| cs.is_empty() || cs.contains(&f.category)))
            .filter_map(|fact| {
                let content = fact.content.to_lowercase();
                let hits = keywords.iter().filter(|k| content.contains(**k)).count();
                (hits > 0).then(|| {
                    let score = hits as f64 * fact.confidence;
                    (fact, score)
                })
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        Ok(scored
            .into_iter()
            .take(max_facts)
            .map(|(fact, _)| fact)
            .collect())
    }

    /// Deactivate near-duplicate facts.
    ///
    /// Every pair of active same-category facts whose lowercased contents
    /// have normalized Levenshtein similarity >= `threshold` is resolved by
    /// deactivating the lower-confidence one (the earlier-listed one wins
    /// ties). A fact deactivated during the sweep is not compared again.
    /// Returns the number of facts deactivated.
    ///
    /// Quadratic in the number of active facts.
    pub async fn merge_similar_facts(&self, threshold: f64) -> Result<usize, GenzsmartError> {
        let mut facts = self.repo.list_active().await?;
        facts.sort_by(by_confidence_desc);
        let lowered: Vec<String> = facts.iter().map(|f| f.content.to_lowercase()).collect();
        let mut inactive = vec![false; facts.len()];

        for i in 0..facts.len() {
            if inactive[i] {
                continue;
            }
            for j in (i + 1)..facts.len() {
                if inactive[j] || facts[i].category != facts[j].category {
                    continue;
                }
                let similarity = strsim::normalized_levenshtein(&lowered[i], &lowered[j]);
                if similarity < threshold {
                    continue;
                }
                let loser = if facts[i].confidence >= facts[j].confidence { j } else { i };
                inactive[loser] = true;
                if loser == i {
                    break;
                }
            }
        }

        let mut merged = 0;
        for (fact, _) in facts.iter().zip(&inactive).filter(|(_, gone)| **gone) {
            if self.repo.soft_delete(&fact.id).await? {
                merged += 1;
            }
        }
        if merged > 0 {
            info!(merged, threshold, "merged similar memory facts");
        }
        Ok(merged)
    }

    pub async fn stats(&self) -> Result<MemoryStats, GenzsmartError> {
        let active = self.repo.list_active().await?;
        let mut by_category: BTreeMap<String, usize> = FactCategory::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), 0))
            .collect();
        for fact in &active {
            *by_category.entry(fact.category.as_str().to_string()).or_default() += 1;
        }
        Ok(MemoryStats {
            total_facts: active.len(),
            by_category,
        })
    }
}

#[async_trait]
impl MemoryLookup for MemoryStorage {
    async fn recall(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<RecalledFact>, GenzsmartError> {
        let facts = self.get_facts_for_context(query, max_results, None).await?;
        Ok(facts
            .into_iter()
            .map(|f| RecalledFact {
                category: f.category.to_string(),
                content: f.content,
                confidence: f.confidence,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded(facts: &[(&str, FactCategory, f64)]) -> MemoryStorage {
        let storage = MemoryStorage::in_memory();
        for (content, category, confidence) in facts {
            storage
                .add_fact(NewFact::new(*content, *category, *confidence))
                .await
                .unwrap();
        }
        storage
    }

    #[tokio::test]
    async fn add_fact_validates_input() {
        let storage = MemoryStorage::in_memory();
        let err = storage
            .add_fact(NewFact::new("x", FactCategory::Fact, 1.5))
            .await
            .unwrap_err();
        assert!(matches!(err, GenzsmartError::Validation { ref field, .. } if field.as_deref() == Some("confidence")));

        let err = storage
            .add_fact(NewFact::new("   ", FactCategory::Fact, 0.5))
            .await
            .unwrap_err();
        assert!(matches!(err, GenzsmartError::Validation { .. }));

        assert!(storage.add_fact(NewFact::new("x", FactCategory::Fact, f64::NAN)).await.is_err());
    }

    #[tokio::test]
    async fn merge_keeps_higher_confidence_duplicate() {
        let storage = seeded(&[
            ("I like pizza.", FactCategory::Preference, 0.6),
            ("I like pizza", FactCategory::Preference, 0.9),
        ])
        .await;

        let merged = storage.merge_similar_facts(0.8).await.unwrap();
        assert_eq!(merged, 1);

        let remaining = storage.list_facts(None, 50, 0.0).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].content, "I like pizza");
        assert!((remaining[0].confidence - 0.9).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn merge_ignores_other_categories_and_distant_text() {
        let storage = seeded(&[
            ("I like pizza", FactCategory::Preference, 0.9),
            ("I like pizza", FactCategory::Goal, 0.6),
            ("I live in Madrid", FactCategory::Preference, 0.7),
        ])
        .await;
        assert_eq!(storage.merge_similar_facts(0.8).await.unwrap(), 0);
        assert_eq!(storage.stats().await.unwrap().total_facts, 3);
    }

    #[tokio::test]
    async fn merge_chain_deactivates_each_loser_once() {
        let storage = seeded(&[
            ("I like pizza", FactCategory::Preference, 0.9),
            ("I like pizza!", FactCategory::Preference, 0.8),
            ("I like pizza!!", FactCategory::Preference, 0.7),
        ])
        .await;
        assert_eq!(storage.merge_similar_facts(0.8).await.unwrap(), 2);
        let remaining = storage.list_facts(None, 50, 0.0).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].content, "I like pizza");
    }

    #[tokio::test]
    async fn list_facts_orders_filters_and_limits() {
        let storage = seeded(&[
            ("low", FactCategory::Fact, 0.2),
            ("mid", FactCategory::Fact, 0.6),
            ("high", FactCategory::Skill, 0.95),
        ])
        .await;

        let all = storage.list_facts(None, 50, 0.0).await.unwrap();
        let contents: Vec<&str> = all.iter().map(|f| f.content.as_str()).collect();
        assert_eq!(contents, ["high", "mid", "low"]);

        let facts_only = storage.list_facts(Some(FactCategory::Fact), 50, 0.5).await.unwrap();
        assert_eq!(facts_only.len(), 1);
        assert_eq!(facts_only[0].content, "mid");

        assert_eq!(storage.list_facts(None, 1, 0.0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn soft_delete_hides_fact() {
        let storage = MemoryStorage::in_memory();
        let fact = storage
            .add_fact(NewFact::new("I work at Acme", FactCategory::PersonalInfo, 0.8))
            .await
            .unwrap();
        assert!(storage.delete_fact(&fact.id).await.unwrap());
        assert!(storage.get_fact(&fact.id).await.unwrap().is_none());
        assert!(!storage.delete_fact("missing").await.unwrap());
        assert_eq!(storage.stats().await.unwrap().total_facts, 0);
    }

    #[tokio::test]
    async fn update_fact_applies_partial_changes() {
        let storage = MemoryStorage::in_memory();
        let fact = storage
            .add_fact(NewFact::new("I like tea", FactCategory::Preference, 0.6))
            .await
            .unwrap();

        let updated = storage
            .update_fact(
                &fact.id,
                FactUpdate {
                    confidence: Some(0.9),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.content, "I like tea");
        assert!((updated.confidence - 0.9).abs() < f64::EPSILON);

        let bad = FactUpdate {
            confidence: Some(-0.1),
            ..Default::default()
        };
        assert!(storage.update_fact(&fact.id, bad).await.is_err());
        assert!(storage.update_fact("missing", FactUpdate::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_facts_scores_by_coverage() {
        let storage = seeded(&[
            ("I like tea", FactCategory::Preference, 0.7),
            ("My sister likes green tea a lot", FactCategory::Fact, 0.7),
            ("I like coffee", FactCategory::Preference, 0.7),
        ])
        .await;

        let hits = storage.search_facts("TEA", 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].fact.content, "I like tea");
        assert!((hits[0].similarity - 0.6).abs() < 1e-9);
        assert!(hits[0].similarity > hits[1].similarity);

        assert!(storage.search_facts("  ", 10).await.unwrap().is_empty());
        assert_eq!(storage.search_facts("like", 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn context_retrieval_weights_keyword_hits_by_confidence() {
        let storage = seeded(&[
            ("I enjoy hiking in the mountains", FactCategory::Preference, 0.6),
            ("Weekend hiking trips to the mountains with family", FactCategory::Fact, 0.9),
            ("I like hiking", FactCategory::Preference, 0.4),
            ("I play the cello", FactCategory::Skill, 0.9),
        ])
        .await;

        let facts = storage
            .get_facts_for_context("planning a hiking trip to the mountains", 5, None)
            .await
            .unwrap();
        let contents: Vec<&str> = facts.iter().map(|f| f.content.as_str()).collect();
        assert_eq!(
            contents,
            ["Weekend hiking trips to the mountains with family", "I enjoy hiking in the mountains"]
        );

        let prefs = storage
            .get_facts_for_context("hiking", 5, Some(&[FactCategory::Preference]))
            .await
            .unwrap();
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs[0].category, FactCategory::Preference);

        assert!(storage.get_facts_for_context("the a an", 5, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stats_counts_every_category() {
        let storage = seeded(&[
            ("a", FactCategory::Goal, 0.7),
            ("b", FactCategory::Goal, 0.7),
            ("c", FactCategory::Skill, 0.7),
        ])
        .await;
        let stats = storage.stats().await.unwrap();
        assert_eq!(stats.total_facts, 3);
        assert_eq!(stats.by_category["goal"], 2);
        assert_eq!(stats.by_category["skill"], 1);
        assert_eq!(stats.by_category["personal_info"], 0);
        assert_eq!(stats.by_category.len(), 5);
    }

    #[tokio::test]
    async fn recall_maps_context_facts() {
        let storage = seeded(&[("I live in Porto", FactCategory::PersonalInfo, 0.8)]).await;
        let recalled = storage.recall("where do I live, Porto?", 5).await.unwrap();
        assert!(recalled.is_empty(), "punctuation is part of the token");

        let recalled = storage.recall("weather in porto today", 5).await.unwrap();
        assert_eq!(recalled.len(), 1);
        assert_eq!(recalled[0].category, "personal_info");
    }
}
