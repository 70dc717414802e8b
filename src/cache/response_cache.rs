use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use std::path::Path;

use crate::db::{migrate, Db};
use crate::endpoint::AnswerRecord;
use crate::error::{BenchError, Result};

/// Persistent cache of endpoint responses keyed by (endpoint, dataset, question).
///
/// When disabled, lookups always miss and stores do nothing, without touching
/// the database file.
pub struct ResponseCache {
    db: Option<Db>,
}

impl ResponseCache {
    /// Open (and migrate) the cache database at `path`.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = Db::new(path);
        db.with_connection(migrate::run_migrations).await?;
        log::debug!("Response cache ready at {}", db.path().display());
        Ok(Self { db: Some(db) })
    }

    pub fn disabled() -> Self {
        Self { db: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.db.is_some()
    }

    /// Previously stored response, if any.
    pub async fn lookup(
        &self,
        endpoint: &str,
        dataset: &str,
        question: &str,
    ) -> Result<Option<AnswerRecord>> {
        let Some(db) = &self.db else {
            return Ok(None);
        };

        let key = (endpoint.to_string(), dataset.to_string(), question.to_string());
        let stored = db
            .with_connection(move |conn| {
                conn.query_row(
                    "SELECT response FROM responses WHERE endpoint = ?1 AND dataset = ?2 AND question = ?3",
                    params![key.0, key.1, key.2],
                    |row| row.get::<_, String>(0),
                )
                .optional()
                .map_err(BenchError::Database)
            })
            .await?;

        stored
            .map(|json| serde_json::from_str(&json).map_err(BenchError::Json))
            .transpose()
    }

    /// Persist a response; committed before this returns.
    pub async fn store(
        &self,
        endpoint: &str,
        dataset: &str,
        question: &str,
        record: &AnswerRecord,
    ) -> Result<()> {
        let Some(db) = &self.db else {
            return Ok(());
        };

        let response = serde_json::to_string(record)?;
        let cached_at = Utc::now().to_rfc3339();
        let key = (endpoint.to_string(), dataset.to_string(), question.to_string());

        db.with_connection(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO responses (endpoint, dataset, question, response, cached_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![key.0, key.1, key.2, response, cached_at],
            )?;
            Ok(())
        })
        .await
    }

    /// Number of cached responses (0 when disabled).
    pub async fn len(&self) -> Result<usize> {
        let Some(db) = &self.db else {
            return Ok(0);
        };
        db.with_connection(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}
