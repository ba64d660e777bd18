// src/utils/telemetry.rs

use std::time::{Duration, Instant};

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;

use crate::services::result_store::ResultStore;

/// Grace period before the first scrape so the listener is up.
const SCRAPER_STARTUP_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Scored, persisted and cached.
    Saved,
    /// Scored but the durable insert failed or timed out.
    PersistenceFailed,
    /// The question catalog could not be read.
    CatalogUnavailable,
    /// Refused by strict scoring.
    Rejected,
}

impl SubmissionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionOutcome::Saved => "saved",
            SubmissionOutcome::PersistenceFailed => "persistence_failed",
            SubmissionOutcome::CatalogUnavailable => "catalog_unavailable",
            SubmissionOutcome::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionEvent {
    pub transaction_id: String,
    pub user_id: String,
    pub outcome: SubmissionOutcome,
    pub score: Option<i64>,
    pub policy: Option<String>,
}

/// Receives one event per submission attempt.
///
/// Implementations must not block and cannot fail: the request path never
/// waits on, or reacts to, the sink.
pub trait SubmissionSink: Send + Sync {
    fn record_submission(&self, event: &SubmissionEvent);
}

/// Default sink: a structured log line plus Prometheus series.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetrySink;

impl SubmissionSink for TelemetrySink {
    fn record_submission(&self, event: &SubmissionEvent) {
        metrics::counter!("submissions_total", "outcome" => event.outcome.as_str()).increment(1);

        match event.outcome {
            SubmissionOutcome::Saved => {
                if let Some(score) = event.score {
                    metrics::histogram!("submission_score").record(score as f64);
                }
                tracing::info!(
                    transaction_id = %event.transaction_id,
                    user_id = %event.user_id,
                    score = event.score,
                    policy = event.policy.as_deref(),
                    "Saved result"
                );
            }
            outcome => {
                tracing::warn!(
                    transaction_id = %event.transaction_id,
                    user_id = %event.user_id,
                    outcome = outcome.as_str(),
                    score = event.score,
                    policy = event.policy.as_deref(),
                    "Submission not saved"
                );
            }
        }
    }
}

/// Times a database round trip into `db_query_duration_seconds`.
///
/// The sample is recorded on drop, so a query cancelled by the request
/// deadline still shows up with the time it ran before being dropped.
#[derive(Debug)]
pub struct QueryTimer {
    query: &'static str,
    started: Instant,
}

impl QueryTimer {
    pub fn start(query: &'static str) -> Self {
        Self {
            query,
            started: Instant::now(),
        }
    }
}

impl Drop for QueryTimer {
    fn drop(&mut self) {
        metrics::histogram!("db_query_duration_seconds", "query" => self.query)
            .record(self.started.elapsed().as_secs_f64());
    }
}

/// Periodically renders the Prometheus registry and logs that it is alive.
///
/// Read-only with respect to request state: it only reads the store size.
pub fn spawn_metrics_scraper(
    handle: PrometheusHandle,
    store: ResultStore,
    interval: Duration,
) -> JoinHandle<()> {
    let interval = interval.max(Duration::from_secs(1));

    tokio::spawn(async move {
        tokio::time::sleep(SCRAPER_STARTUP_DELAY).await;
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;
            metrics::gauge!("result_store_entries").set(store.len() as f64);

            let exposition = handle.render();
            tracing::info!(
                samples = count_samples(&exposition),
                "Scraper tick: metrics endpoint available"
            );
        }
    })
}

/// Number of sample lines in a Prometheus text exposition.
pub fn count_samples(exposition: &str) -> usize {
    exposition
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .count()
}
