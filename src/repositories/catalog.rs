// src/repositories/catalog.rs

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use super::StorageError;
use crate::{
    models::question::{Paradigm, Question, QuestionRow},
    utils::telemetry::QueryTimer,
};

/// Read-only source of the questionnaire.
#[async_trait]
pub trait QuestionCatalog: Send + Sync {
    /// All questions, ordered by id.
    async fn questions(&self) -> Result<Vec<Question>, StorageError>;

    async fn paradigms(&self) -> Result<Vec<Paradigm>, StorageError>;
}

/// Catalog backed by the `questions` and `paradigms` tables.
#[derive(Debug, Clone)]
pub struct PgQuestionCatalog {
    pool: PgPool,
}

impl PgQuestionCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionCatalog for PgQuestionCatalog {
    /// Rows with a selector we cannot score are left out and logged.
    async fn questions(&self) -> Result<Vec<Question>, StorageError> {
        let timer = QueryTimer::start("select_questions");
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT
                id,
                paradigm_id,
                text,
                selector,
                options,
                weight
            FROM questions
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        drop(timer);

        let rows = rows.map_err(|e| {
            tracing::error!("Failed to fetch questions: {:?}", e);
            StorageError::from(e)
        })?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                Question::try_from(row)
                    .map_err(|reason| tracing::warn!(question_id = id, "Skipping question: {}", reason))
                    .ok()
            })
            .collect())
    }

    async fn paradigms(&self) -> Result<Vec<Paradigm>, StorageError> {
        let timer = QueryTimer::start("select_paradigms");
        let paradigms = sqlx::query_as::<_, Paradigm>(
            "SELECT id, name, description FROM paradigms ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await;
        drop(timer);

        paradigms.map_err(|e| {
            tracing::error!("Failed to fetch paradigms: {:?}", e);
            StorageError::from(e)
        })
    }
}

/// Fixed catalog held in memory. Used for tests and local runs without a database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuestionCatalog {
    questions: Arc<Vec<Question>>,
    paradigms: Arc<Vec<Paradigm>>,
}

impl InMemoryQuestionCatalog {
    pub fn new(questions: Vec<Question>, paradigms: Vec<Paradigm>) -> Self {
        Self {
            questions: Arc::new(questions),
            paradigms: Arc::new(paradigms),
        }
    }
}

#[async_trait]
impl QuestionCatalog for InMemoryQuestionCatalog {
    async fn questions(&self) -> Result<Vec<Question>, StorageError> {
        Ok(self.questions.as_ref().clone())
    }

    async fn paradigms(&self) -> Result<Vec<Paradigm>, StorageError> {
        Ok(self.paradigms.as_ref().clone())
    }
}
