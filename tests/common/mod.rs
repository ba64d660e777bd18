// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cyber_assessment::{
    config::Config,
    models::{
        question::{Paradigm, Question, SelectionKind},
        result::ResultRecord,
    },
    repositories::{InMemoryQuestionCatalog, QuestionCatalog, ResultRepository, StorageError},
    routes,
    services::{ResultStore, SubmissionService},
    state::AppState,
    utils::telemetry::{SubmissionEvent, SubmissionSink},
};

/// Catalog used by the end-to-end scenarios.
pub fn cloud_catalog() -> InMemoryQuestionCatalog {
    let q = |id: i64, paradigm: &str, kind, weight, options: &[&str]| Question {
        id,
        paradigm: paradigm.to_string(),
        text: format!("Question {}", id),
        kind,
        weight,
        options: options.iter().map(|o| o.to_string()).collect(),
    };

    InMemoryQuestionCatalog::new(
        vec![
            q(1, "101", SelectionKind::SingleChoice, 10, &["Yes", "No"]),
            q(2, "102", SelectionKind::MultiChoice, 10, &["AWS", "GCP", "Azure"]),
            q(3, "103", SelectionKind::SingleChoice, 15, &["Yes", "No"]),
        ],
        vec![
            Paradigm {
                id: 1,
                name: "Threat".to_string(),
                description: "Potential threats to the organization".to_string(),
            },
            Paradigm {
                id: 2,
                name: "Vulnerability".to_string(),
                description: "Internal weaknesses".to_string(),
            },
        ],
    )
}

pub struct BrokenCatalog;

#[async_trait]
impl QuestionCatalog for BrokenCatalog {
    async fn questions(&self) -> Result<Vec<Question>, StorageError> {
        Err(StorageError::Unavailable("connection refused".to_string()))
    }

    async fn paradigms(&self) -> Result<Vec<Paradigm>, StorageError> {
        Err(StorageError::Unavailable("connection refused".to_string()))
    }
}

/// Never finishes within any sensible test deadline.
pub struct SlowRepository;

#[async_trait]
impl ResultRepository for SlowRepository {
    async fn save(&self, _record: &ResultRecord) -> Result<(), StorageError> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(())
    }
}

pub struct FailingRepository;

#[async_trait]
impl ResultRepository for FailingRepository {
    async fn save(&self, _record: &ResultRecord) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("insert refused".to_string()))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SubmissionEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SubmissionEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl SubmissionSink for RecordingSink {
    fn record_submission(&self, event: &SubmissionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        log_dir: "logs".to_string(),
        request_timeout_secs: 1,
        metrics_scrape_interval_secs: 30,
        scoring_strict: false,
        ranked_lax_fallback: false,
    }
}

pub fn service_with(
    catalog: Arc<dyn QuestionCatalog>,
    repository: Arc<dyn ResultRepository>,
    sink: Arc<dyn SubmissionSink>,
) -> SubmissionService {
    SubmissionService::new(catalog, repository, sink, ResultStore::new())
        .with_timeout(Duration::from_millis(200))
}

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
pub async fn spawn_app(submissions: SubmissionService) -> String {
    let state = AppState {
        submissions,
        config: test_config(),
        metrics: None,
    };

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}
