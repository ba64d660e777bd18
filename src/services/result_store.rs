// src/services/result_store.rs

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::{error::AppError, models::result::ScoreResult};

/// Latest score per user, kept for the lifetime of the process.
///
/// Cloning the store clones the handle; all clones share the same map.
/// Values are replaced whole under the write lock, so readers never see a
/// half-written result. The lock is never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    results: Arc<RwLock<HashMap<String, ScoreResult>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `result` for `user_id`, replacing any previous one.
    pub fn put(&self, user_id: &str, result: ScoreResult) {
        let mut guard = self
            .results
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard.insert(user_id.to_string(), result);
    }

    pub fn get(&self, user_id: &str) -> Result<ScoreResult, AppError> {
        let guard = self
            .results
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        guard
            .get(user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Result not found".to_string()))
    }

    pub fn len(&self) -> usize {
        self.results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
