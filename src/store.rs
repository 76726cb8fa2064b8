// SPDX-FileCopyrightText: 2026 T.S Plumbing
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission storage.

use crate::config::StorageConfig;
use crate::validator::ContactSubmission;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Storage error types.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Sink for validated submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Insert a submission and return its generated id.
    async fn insert(
        &self,
        submission: &ContactSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<i64, StoreError>;
}

/// A stored submission row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredSubmission {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub project_type: String,
    pub description: String,
    pub submitted_at: DateTime<Utc>,
}

/// SQL-backed store.
#[derive(Clone)]
pub struct SqlSubmissionStore {
    pool: SqlitePool,
}

impl SqlSubmissionStore {
    /// Connect and make sure the schema exists.
    pub async fn connect(config: &StorageConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        info!("Submission store ready");
        Ok(store)
    }

    /// Wrap an existing pool. The schema is created if missing.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contact_submissions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                phone TEXT NOT NULL,
                project_type TEXT NOT NULL,
                description TEXT NOT NULL,
                submitted_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetch a submission by id.
    pub async fn get(&self, id: i64) -> Result<Option<StoredSubmission>, StoreError> {
        let row = sqlx::query_as::<_, StoredSubmission>(
            "SELECT id, name, phone, project_type, description, submitted_at \
             FROM contact_submissions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Number of stored submissions.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contact_submissions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl SubmissionStore for SqlSubmissionStore {
    async fn insert(
        &self,
        submission: &ContactSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO contact_submissions \
             (name, phone, project_type, description, submitted_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&submission.name)
        .bind(&submission.phone)
        .bind(&submission.project_type)
        .bind(&submission.description)
        .bind(submitted_at)
        .fetch_one(&self.pool)
        .await?;

        debug!(id, "Stored submission");
        Ok(id)
    }
}
