// src/repositories/results.rs

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use sqlx::PgPool;

use super::StorageError;
use crate::{models::result::ResultRecord, utils::telemetry::QueryTimer};

/// Durable record of submissions. Writes are best effort; no retries here.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    async fn save(&self, record: &ResultRecord) -> Result<(), StorageError>;
}

/// Repository backed by the `results` table.
#[derive(Debug, Clone)]
pub struct PgResultRepository {
    pool: PgPool,
}

impl PgResultRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultRepository for PgResultRepository {
    async fn save(&self, record: &ResultRecord) -> Result<(), StorageError> {
        let timer = QueryTimer::start("insert_result");
        let outcome = sqlx::query(
            r#"
            INSERT INTO results (user_id, score, policy, transaction_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&record.user_id)
        .bind(record.score)
        .bind(&record.policy)
        .bind(&record.transaction_id)
        .execute(&self.pool)
        .await;
        drop(timer);

        outcome.map(|_| ()).map_err(|e| {
            tracing::error!("Failed to insert result: {:?}", e);
            StorageError::from(e)
        })
    }
}

/// Appends records to a shared vector.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResultRepository {
    records: Arc<Mutex<Vec<ResultRecord>>>,
}

impl InMemoryResultRepository {
    pub fn records(&self) -> Vec<ResultRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ResultRepository for InMemoryResultRepository {
    async fn save(&self, record: &ResultRecord) -> Result<(), StorageError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}
