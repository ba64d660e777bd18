// src/services/submission.rs

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    config::DEFAULT_REQUEST_TIMEOUT_SECS,
    error::AppError,
    models::{
        question::{Paradigm, Question},
        result::{ResultRecord, ScoreResult, SubmissionReceipt},
    },
    repositories::{QuestionCatalog, ResultRepository, StorageError},
    services::{
        normalizer::normalize,
        result_store::ResultStore,
        scoring::{ScoringConfig, ScoringError, evaluate},
    },
    utils::telemetry::{SubmissionEvent, SubmissionOutcome, SubmissionSink},
};

/// Runs the submit / result workflow.
///
/// Cheap to clone; every collaborator sits behind an `Arc`.
#[derive(Clone)]
pub struct SubmissionService {
    catalog: Arc<dyn QuestionCatalog>,
    repository: Arc<dyn ResultRepository>,
    sink: Arc<dyn SubmissionSink>,
    store: ResultStore,
    scoring: Arc<ScoringConfig>,
    timeout: Duration,
}

impl SubmissionService {
    pub fn new(
        catalog: Arc<dyn QuestionCatalog>,
        repository: Arc<dyn ResultRepository>,
        sink: Arc<dyn SubmissionSink>,
        store: ResultStore,
    ) -> Self {
        Self {
            catalog,
            repository,
            sink,
            store,
            scoring: Arc::new(ScoringConfig::default()),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = Arc::new(scoring);
        self
    }

    /// Deadline applied to each catalog and persistence call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub async fn questions(&self) -> Result<Vec<Question>, AppError> {
        self.read_catalog("questions", self.catalog.questions()).await
    }

    pub async fn paradigms(&self) -> Result<Vec<Paradigm>, AppError> {
        self.read_catalog("paradigms", self.catalog.paradigms()).await
    }

    /// Scores a submission and records it.
    ///
    /// * Fetches the catalog, normalizes and scores the answers.
    /// * Persists `(user_id, score, policy)` under a fresh transaction id.
    /// * Only after a successful insert is the result cached for `result()`;
    ///   a failed insert leaves the previous cached value in place.
    pub async fn submit(
        &self,
        user_id: &str,
        raw_answers: &HashMap<i64, Value>,
    ) -> Result<SubmissionReceipt, AppError> {
        let transaction_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("submission", %transaction_id, %user_id);

        self.run_submission(user_id, raw_answers, transaction_id)
            .instrument(span)
            .await
    }

    pub fn result(&self, user_id: &str) -> Result<ScoreResult, AppError> {
        self.store.get(user_id)
    }

    async fn run_submission(
        &self,
        user_id: &str,
        raw_answers: &HashMap<i64, Value>,
        transaction_id: String,
    ) -> Result<SubmissionReceipt, AppError> {
        let event = |outcome, result: Option<&ScoreResult>| SubmissionEvent {
            transaction_id: transaction_id.clone(),
            user_id: user_id.to_string(),
            outcome,
            score: result.map(|r| r.total_score),
            policy: result.map(|r| r.policy.clone()),
        };

        // 1. Catalog
        let questions = match self.questions().await {
            Ok(questions) => questions,
            Err(err) => {
                self.sink
                    .record_submission(&event(SubmissionOutcome::CatalogUnavailable, None));
                return Err(err);
            }
        };

        // 2-3. Normalize and score
        let evaluation = normalize(raw_answers, &questions, self.scoring.error_policy)
            .and_then(|normalized| {
                let mut evaluation = evaluate(&normalized.answers, &questions, &self.scoring)?;
                let mut warnings = normalized.warnings;
                warnings.append(&mut evaluation.warnings);
                evaluation.warnings = warnings;
                Ok(evaluation)
            })
            .map_err(|err: ScoringError| {
                tracing::warn!("Submission rejected: {}", err);
                self.sink.record_submission(&event(SubmissionOutcome::Rejected, None));
                AppError::from(err)
            })?;

        for warning in &evaluation.warnings {
            tracing::warn!(question_id = warning.question_id(), "Question skipped: {}", warning);
        }

        let result = evaluation.result();

        // 4. Persist, then cache
        let record = ResultRecord {
            user_id: user_id.to_string(),
            score: result.total_score,
            policy: result.policy.clone(),
            transaction_id: transaction_id.clone(),
        };

        let saved = match self.with_deadline("saving result", self.repository.save(&record)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(AppError::PersistenceFailed(err.to_string())),
            Err(timeout) => Err(timeout),
        };

        if let Err(err) = saved {
            self.sink
                .record_submission(&event(SubmissionOutcome::PersistenceFailed, Some(&result)));
            return Err(err);
        }

        self.sink
            .record_submission(&event(SubmissionOutcome::Saved, Some(&result)));
        self.store.put(user_id, result.clone());

        Ok(SubmissionReceipt {
            result,
            transaction_id,
            submitted_at: Utc::now(),
            warnings: evaluation.warnings.iter().map(ToString::to_string).collect(),
        })
    }

    async fn read_catalog<T>(
        &self,
        what: &'static str,
        fut: impl Future<Output = Result<T, StorageError>>,
    ) -> Result<T, AppError> {
        self.with_deadline(what, fut)
            .await?
            .map_err(|err| AppError::CatalogUnavailable(err.to_string()))
    }

    /// Outer error: the deadline passed. Inner error: the call itself failed.
    async fn with_deadline<T>(
        &self,
        what: &'static str,
        fut: impl Future<Output = Result<T, StorageError>>,
    ) -> Result<Result<T, StorageError>, AppError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| AppError::Timeout(format!("{} exceeded {:?}", what, self.timeout)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::{
        models::question::SelectionKind,
        repositories::{InMemoryQuestionCatalog, InMemoryResultRepository},
        services::scoring::ErrorPolicy,
    };

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<SubmissionEvent>>,
    }

    impl RecordingSink {
        fn outcomes(&self) -> Vec<SubmissionOutcome> {
            self.events.lock().unwrap().iter().map(|e| e.outcome).collect()
        }
    }

    impl SubmissionSink for RecordingSink {
        fn record_submission(&self, event: &SubmissionEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    struct FailingRepository;

    #[async_trait]
    impl ResultRepository for FailingRepository {
        async fn save(&self, _record: &ResultRecord) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("insert refused".to_string()))
        }
    }

    struct SlowCatalog;

    #[async_trait]
    impl QuestionCatalog for SlowCatalog {
        async fn questions(&self) -> Result<Vec<Question>, StorageError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }

        async fn paradigms(&self) -> Result<Vec<Paradigm>, StorageError> {
            Ok(Vec::new())
        }
    }

    fn catalog() -> InMemoryQuestionCatalog {
        let q = |id, kind, weight, options: &[&str]| Question {
            id,
            paradigm: "101".to_string(),
            text: format!("Question {}", id),
            kind,
            weight,
            options: options.iter().map(|o| o.to_string()).collect(),
        };
        InMemoryQuestionCatalog::new(
            vec![
                q(1, SelectionKind::SingleChoice, 10, &["Yes", "No"]),
                q(2, SelectionKind::MultiChoice, 10, &["AWS", "GCP", "Azure"]),
                q(3, SelectionKind::SingleChoice, 15, &["Yes", "No"]),
            ],
            Vec::new(),
        )
    }

    fn answers(value: serde_json::Value) -> HashMap<i64, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn successful_submission_is_persisted_and_cached() {
        let repository = Arc::new(InMemoryResultRepository::default());
        let sink = Arc::new(RecordingSink::default());
        let service = SubmissionService::new(
            Arc::new(catalog()),
            repository.clone(),
            sink.clone(),
            ResultStore::new(),
        );

        let receipt = service
            .submit("12", &answers(json!({"1": "Yes", "2": ["AWS", "GCP"], "3": "No"})))
            .await
            .unwrap();

        assert_eq!(receipt.result.total_score, 16);
        assert_eq!(receipt.result.policy, "Basic");
        assert_eq!(service.result("12").unwrap(), receipt.result);

        let records = repository.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user_id, "12");
        assert_eq!(records[0].score, 16);
        assert_eq!(records[0].transaction_id, receipt.transaction_id);
        assert_eq!(sink.outcomes(), vec![SubmissionOutcome::Saved]);
    }

    #[tokio::test]
    async fn persistence_failure_keeps_the_previous_result() {
        let store = ResultStore::new();
        store.put("12", ScoreResult {
            total_score: 35,
            policy: "Standard".to_string(),
        });
        let sink = Arc::new(RecordingSink::default());
        let service = SubmissionService::new(
            Arc::new(catalog()),
            Arc::new(FailingRepository),
            sink.clone(),
            store.clone(),
        );

        let err = service
            .submit("12", &answers(json!({"1": "No"})))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PersistenceFailed(_)));
        assert_eq!(store.get("12").unwrap().total_score, 35);
        assert_eq!(sink.outcomes(), vec![SubmissionOutcome::PersistenceFailed]);

        let events = sink.events.lock().unwrap();
        assert_eq!(events[0].score, Some(0));
        assert_eq!(events[0].policy.as_deref(), Some("Basic"));
    }

    #[tokio::test]
    async fn slow_catalog_times_out() {
        let sink = Arc::new(RecordingSink::default());
        let service = SubmissionService::new(
            Arc::new(SlowCatalog),
            Arc::new(InMemoryResultRepository::default()),
            sink.clone(),
            ResultStore::new(),
        )
        .with_timeout(Duration::from_millis(50));

        let err = service
            .submit("12", &answers(json!({"1": "Yes"})))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Timeout(_)));
        assert!(service.store().is_empty());
        assert_eq!(sink.outcomes(), vec![SubmissionOutcome::CatalogUnavailable]);
    }

    #[tokio::test]
    async fn skipped_questions_surface_as_warnings() {
        let service = SubmissionService::new(
            Arc::new(catalog()),
            Arc::new(InMemoryResultRepository::default()),
            Arc::new(RecordingSink::default()),
            ResultStore::new(),
        );

        let receipt = service
            .submit("7", &answers(json!({"1": ["Yes"], "2": [1, 2], "3": "Yes"})))
            .await
            .unwrap();

        assert_eq!(receipt.result.total_score, 15);
        assert_eq!(receipt.warnings.len(), 2);
        // Normalizer warnings come first
        assert!(receipt.warnings[0].contains("question 2"));
        assert!(receipt.warnings[1].contains("question 1"));
    }

    #[tokio::test]
    async fn strict_scoring_rejects_without_saving() {
        let repository = Arc::new(InMemoryResultRepository::default());
        let sink = Arc::new(RecordingSink::default());
        let service = SubmissionService::new(
            Arc::new(catalog()),
            repository.clone(),
            sink.clone(),
            ResultStore::new(),
        )
        .with_scoring(ScoringConfig {
            error_policy: ErrorPolicy::Abort,
            ..ScoringConfig::default()
        });

        let err = service
            .submit("7", &answers(json!({"1": "Yes", "2": "AWS"})))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(repository.records().is_empty());
        assert!(service.result("7").is_err());
        assert_eq!(sink.outcomes(), vec![SubmissionOutcome::Rejected]);
    }

    #[tokio::test]
    async fn each_submission_gets_its_own_transaction_id() {
        let service = SubmissionService::new(
            Arc::new(catalog()),
            Arc::new(InMemoryResultRepository::default()),
            Arc::new(RecordingSink::default()),
            ResultStore::new(),
        );
        let raw = answers(json!({"1": "Yes"}));

        let first = service.submit("1", &raw).await.unwrap();
        let second = service.submit("1", &raw).await.unwrap();

        assert_ne!(first.transaction_id, second.transaction_id);
    }
}
