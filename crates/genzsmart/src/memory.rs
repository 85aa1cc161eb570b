// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `genzsmart memory` command implementation.

use std::str::FromStr;
use std::sync::Arc;

use clap::{Args, Subcommand};
use colored::Colorize;
use genzsmart_config::GenzsmartConfig;
use genzsmart_core::GenzsmartError;
use genzsmart_memory::{FactCategory, MemoryContextBuilder, MemoryFact, MemoryStorage, NewFact};

#[derive(Args, Debug)]
pub struct MemoryArgs {
    #[command(subcommand)]
    pub command: MemoryCommand,
}

#[derive(Subcommand, Debug)]
pub enum MemoryCommand {
    /// List active facts, most confident first.
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
        #[arg(long, default_value_t = 0.0)]
        min_confidence: f64,
    },
    /// Store a fact by hand.
    Add {
        content: String,
        #[arg(long, default_value = "fact")]
        category: String,
        #[arg(long, default_value_t = 1.0)]
        confidence: f64,
    },
    /// Substring search over stored facts.
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print the digest that would be injected for a message.
    Context { query: Option<String> },
    /// Deactivate near-duplicate facts.
    Merge {
        /// Similarity threshold; defaults to `memory.merge_threshold`.
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Soft-delete a fact.
    Forget { id: String },
    /// Fact counts per category.
    Stats,
}

/// Runs the `genzsmart memory` command.
pub async fn run_memory(config: &GenzsmartConfig, args: MemoryArgs) -> Result<(), GenzsmartError> {
    if config.memory.database_path.is_none() {
        eprintln!(
            "{}",
            "memory.database_path is not set; facts live only for this command".yellow()
        );
    }
    let storage = Arc::new(MemoryStorage::from_config(&config.memory).await?);
    let output = execute(&storage, config, args.command).await?;
    print!("{output}");
    Ok(())
}

async fn execute(
    storage: &Arc<MemoryStorage>,
    config: &GenzsmartConfig,
    command: MemoryCommand,
) -> Result<String, GenzsmartError> {
    let output = match command {
        MemoryCommand::List {
            category,
            limit,
            min_confidence,
        } => {
            let category = category.as_deref().map(parse_category).transpose()?;
            let facts = storage.list_facts(category, limit, min_confidence).await?;
            facts.iter().map(format_fact).collect()
        }
        MemoryCommand::Add {
            content,
            category,
            confidence,
        } => {
            let fact = storage
                .add_fact(NewFact::new(content, parse_category(&category)?, confidence))
                .await?;
            format!("stored {}\n", fact.id)
        }
        MemoryCommand::Search { query, limit } => storage
            .search_facts(&query, limit)
            .await?
            .into_iter()
            .map(|hit| format!("{:.2}  {}", hit.similarity, format_fact(&hit.fact)))
            .collect(),
        MemoryCommand::Context { query } => {
            let digest = MemoryContextBuilder::new(storage.clone())
                .build_memory_context(query.as_deref(), config.memory.context_max_facts, None)
                .await?;
            if digest.is_empty() {
                "no facts qualify\n".to_string()
            } else {
                digest
            }
        }
        MemoryCommand::Merge { threshold } => {
            let threshold = threshold.unwrap_or(config.memory.merge_threshold);
            let merged = storage.merge_similar_facts(threshold).await?;
            format!("merged {merged} facts\n")
        }
        MemoryCommand::Forget { id } => {
            if !storage.delete_fact(&id).await? {
                return Err(GenzsmartError::NotFound {
                    resource: "fact".to_string(),
                    id,
                });
            }
            format!("forgot {id}\n")
        }
        MemoryCommand::Stats => {
            let stats = storage.stats().await?;
            let mut out = format!("total: {}\n", stats.total_facts);
            for (category, count) in &stats.by_category {
                out.push_str(&format!("  {category}: {count}\n"));
            }
            out
        }
    };
    Ok(output)
}

fn parse_category(name: &str) -> Result<FactCategory, GenzsmartError> {
    FactCategory::from_str(name.trim()).map_err(|_| {
        GenzsmartError::validation("category", format!("unknown fact category: {name}"))
    })
}

fn format_fact(fact: &MemoryFact) -> String {
    format!(
        "{}  [{}] {:.2}  {}\n",
        fact.id, fact.category, fact.confidence, fact.content
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(storage: &Arc<MemoryStorage>, command: MemoryCommand) -> String {
        execute(storage, &GenzsmartConfig::default(), command)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn add_list_and_stats() {
        let storage = Arc::new(MemoryStorage::in_memory());
        let added = run(
            &storage,
            MemoryCommand::Add {
                content: "User likes tea".to_string(),
                category: "preference".to_string(),
                confidence: 0.9,
            },
        )
        .await;
        assert!(added.starts_with("stored "));

        let listed = run(
            &storage,
            MemoryCommand::List {
                category: Some("preference".to_string()),
                limit: 50,
                min_confidence: 0.0,
            },
        )
        .await;
        assert!(listed.contains("[preference] 0.90  User likes tea"));

        let stats = run(&storage, MemoryCommand::Stats).await;
        assert!(stats.starts_with("total: 1\n"));
        assert!(stats.contains("  preference: 1\n"));
    }

    #[tokio::test]
    async fn merge_uses_configured_threshold() {
        let storage = Arc::new(MemoryStorage::in_memory());
        for (content, confidence) in [("I like pizza", 0.9), ("I like pizza.", 0.6)] {
            storage
                .add_fact(NewFact::new(content, FactCategory::Preference, confidence))
                .await
                .unwrap();
        }
        let out = run(&storage, MemoryCommand::Merge { threshold: None }).await;
        assert_eq!(out, "merged 1 facts\n");
        let remaining = storage.list_facts(None, 50, 0.0).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].confidence, 0.9);
    }

    #[tokio::test]
    async fn forgetting_unknown_fact_is_not_found() {
        let storage = Arc::new(MemoryStorage::in_memory());
        let err = execute(
            &storage,
            &GenzsmartConfig::default(),
            MemoryCommand::Forget {
                id: "nope".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(parse_category("hobby").is_err());
        assert_eq!(parse_category("personal_info").unwrap(), FactCategory::PersonalInfo);
    }
}
