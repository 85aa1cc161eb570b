// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence seam for memory facts.
//!
//! [`FactRepository`] covers row-level CRUD plus a listing of active facts.
//! Ranking, similarity and validation live in [`crate::MemoryStorage`].

use std::path::Path;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use genzsmart_core::GenzsmartError;
use rusqlite::types::Type;
use tokio_rusqlite::Connection;

use crate::types::{FactCategory, MemoryFact};

#[async_trait]
pub trait FactRepository: Send + Sync {
    async fn insert(&self, fact: &MemoryFact) -> Result<(), GenzsmartError>;

    /// Fetch by id regardless of `is_active`.
    async fn get(&self, id: &str) -> Result<Option<MemoryFact>, GenzsmartError>;

    /// All active facts in insertion order.
    async fn list_active(&self) -> Result<Vec<MemoryFact>, GenzsmartError>;

    /// Overwrite the stored row with the same id. Returns false if absent.
    async fn update(&self, fact: &MemoryFact) -> Result<bool, GenzsmartError>;

    /// Mark a fact inactive. Returns false if no fact has this id.
    async fn soft_delete(&self, id: &str) -> Result<bool, GenzsmartError>;
}

/// Process-local repository; contents are lost on drop.
#[derive(Debug, Default)]
pub struct InMemoryFactRepository {
    facts: RwLock<Vec<MemoryFact>>,
}

impl InMemoryFactRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FactRepository for InMemoryFactRepository {
    async fn insert(&self, fact: &MemoryFact) -> Result<(), GenzsmartError> {
        let mut facts = self.facts.write().unwrap_or_else(PoisonError::into_inner);
        if facts.iter().any(|f| f.id == fact.id) {
            return Err(GenzsmartError::Validation {
                message: format!("duplicate fact id {}", fact.id),
                field: Some("id".to_string()),
            });
        }
        facts.push(fact.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<MemoryFact>, GenzsmartError> {
        let facts = self.facts.read().unwrap_or_else(PoisonError::into_inner);
        Ok(facts.iter().find(|f| f.id == id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<MemoryFact>, GenzsmartError> {
        let facts = self.facts.read().unwrap_or_else(PoisonError::into_inner);
        Ok(facts.iter().filter(|f| f.is_active).cloned().collect())
    }

    async fn update(&self, fact: &MemoryFact) -> Result<bool, GenzsmartError> {
        let mut facts = self.facts.write().unwrap_or_else(PoisonError::into_inner);
        match facts.iter_mut().find(|f| f.id == fact.id) {
            Some(slot) => {
                *slot = fact.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete(&self, id: &str) -> Result<bool, GenzsmartError> {
        let mut facts = self.facts.write().unwrap_or_else(PoisonError::into_inner);
        match facts.iter_mut().find(|f| f.id == id) {
            Some(fact) => {
                fact.is_active = false;
                fact.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Helper to convert tokio_rusqlite errors into GenzsmartError::Storage.
fn storage_err(e: tokio_rusqlite::Error) -> GenzsmartError {
    GenzsmartError::Storage {
        source: Box::new(e),
    }
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS memory_facts (
        id TEXT PRIMARY KEY NOT NULL,
        conversation_id TEXT,
        category TEXT NOT NULL,
        content TEXT NOT NULL,
        confidence REAL NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_memory_facts_active ON memory_facts(is_active, category);";

const COLUMNS: &str =
    "id, conversation_id, category, content, confidence, is_active, created_at, updated_at";

/// SQLite-backed repository. The schema is created when the database is opened.
pub struct SqliteFactRepository {
    conn: Connection,
}

impl SqliteFactRepository {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, GenzsmartError> {
        let conn = Connection::open(path.as_ref()).await.map_err(|e| storage_err(e.into()))?;
        Self::with_connection(conn).await
    }

    pub async fn open_in_memory() -> Result<Self, GenzsmartError> {
        let conn = Connection::open_in_memory().await.map_err(|e| storage_err(e.into()))?;
        Self::with_connection(conn).await
    }

    async fn with_connection(conn: Connection) -> Result<Self, GenzsmartError> {
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(storage_err)?;
        Ok(Self { conn })
    }
}

fn timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: String) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_fact(row: &rusqlite::Row) -> Result<MemoryFact, rusqlite::Error> {
    let category: String = row.get(2)?;
    Ok(MemoryFact {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        category: FactCategory::from_str_lenient(&category),
        content: row.get(3)?,
        confidence: row.get(4)?,
        is_active: row.get(5)?,
        created_at: parse_timestamp(6, row.get(6)?)?,
        updated_at: parse_timestamp(7, row.get(7)?)?,
    })
}

#[async_trait]
impl FactRepository for SqliteFactRepository {
    async fn insert(&self, fact: &MemoryFact) -> Result<(), GenzsmartError> {
        let id = fact.id.clone();
        let conversation_id = fact.conversation_id.clone();
        let category = fact.category.as_str();
        let content = fact.content.clone();
        let confidence = fact.confidence;
        let is_active = fact.is_active;
        let created_at = timestamp(&fact.created_at);
        let updated_at = timestamp(&fact.updated_at);

        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    &format!("INSERT INTO memory_facts ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
                    rusqlite::params![id, conversation_id, category, content, confidence, is_active, created_at, updated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    async fn get(&self, id: &str) -> Result<Option<MemoryFact>, GenzsmartError> {
        let id = id.to_string();
        self.conn
            .call(move |conn| -> Result<Option<MemoryFact>, rusqlite::Error> {
                let mut stmt =
                    conn.prepare(&format!("SELECT {COLUMNS} FROM memory_facts WHERE id = ?1"))?;
                let fact = stmt
                    .query_row(rusqlite::params![id], row_to_fact)
                    .optional()?;
                Ok(fact)
            })
            .await
            .map_err(storage_err)
    }

    async fn list_active(&self) -> Result<Vec<MemoryFact>, GenzsmartError> {
        self.conn
            .call(move |conn| -> Result<Vec<MemoryFact>, rusqlite::Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM memory_facts WHERE is_active = 1 ORDER BY rowid"
                ))?;
                let facts = stmt
                    .query_map([], row_to_fact)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(facts)
            })
            .await
            .map_err(storage_err)
    }

    async fn update(&self, fact: &MemoryFact) -> Result<bool, GenzsmartError> {
        let id = fact.id.clone();
        let category = fact.category.as_str();
        let content = fact.content.clone();
        let confidence = fact.confidence;
        let is_active = fact.is_active;
        let updated_at = timestamp(&fact.updated_at);

        self.conn
            .call(move |conn| -> Result<bool, rusqlite::Error> {
                let changed = conn.execute(
                    "UPDATE memory_facts SET category = ?1, content = ?2, confidence = ?3, is_active = ?4, updated_at = ?5 WHERE id = ?6",
                    rusqlite::params![category, content, confidence, is_active, updated_at, id],
                )?;
                Ok(changed > 0)
            })
            .await
            .map_err(storage_err)
    }

    async fn soft_delete(&self, id: &str) -> Result<bool, GenzsmartError> {
        let id = id.to_string();
        let updated_at = timestamp(&Utc::now());
        self.conn
            .call(move |conn| -> Result<bool, rusqlite::Error> {
                let changed = conn.execute(
                    "UPDATE memory_facts SET is_active = 0, updated_at = ?1 WHERE id = ?2",
                    rusqlite::params![updated_at, id],
                )?;
                Ok(changed > 0)
            })
            .await
            .map_err(storage_err)
    }
}

/// Extension trait for optional row queries.
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
