// src/models/result.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Outcome of scoring one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub total_score: i64,
    pub policy: String,
}

/// Represents the 'results' table in the database.
/// One row per successful submission, written best effort.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ResultRecord {
    pub user_id: String,
    pub score: i64,
    pub policy: String,
    pub transaction_id: String,
}

/// DTO returned by the submit endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    #[serde(flatten)]
    pub result: ScoreResult,

    /// Trace token shared by the log lines, metrics and the stored row.
    pub transaction_id: String,

    pub submitted_at: chrono::DateTime<chrono::Utc>,

    /// Questions skipped during scoring, one message each.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
