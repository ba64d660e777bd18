// src/config.rs

use std::env;
use std::time::Duration;

use dotenvy::dotenv;

use crate::services::scoring::{ErrorPolicy, ScoringConfig};

/// The literal a single-choice answer must equal to earn the question's weight.
pub const AFFIRMATIVE_ANSWER: &str = "Yes";

/// Policy ladder: a total score below the bound gets the label.
/// Scores past the last bound fall through to `CATCH_ALL_POLICY`.
pub const POLICY_TIERS: &[(i64, &str)] = &[(20, "Basic"), (50, "Standard")];
pub const CATCH_ALL_POLICY: &str = "Premium";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_SCRAPE_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub bind_addr: String,
    pub log_dir: String,
    pub request_timeout_secs: u64,
    pub metrics_scrape_interval_secs: u64,
    /// Abort the whole submission on the first scoring error instead of skipping the question.
    pub scoring_strict: bool,
    /// Score unknown ranked-choice answers as the first option instead of rejecting them.
    pub ranked_lax_fallback: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let log_dir = env::var("LOG_DIR")
            .unwrap_or_else(|_| "logs".to_string());

        let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let metrics_scrape_interval_secs = env::var("METRICS_SCRAPE_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SCRAPE_INTERVAL_SECS);

        Self {
            database_url,
            rust_log,
            bind_addr,
            log_dir,
            request_timeout_secs,
            metrics_scrape_interval_secs,
            scoring_strict: env_flag("SCORING_STRICT"),
            ranked_lax_fallback: env_flag("RANKED_LAX_FALLBACK"),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn scrape_interval(&self) -> Duration {
        Duration::from_secs(self.metrics_scrape_interval_secs)
    }

    /// Builds the scoring configuration from the policy constants and the env toggles.
    pub fn scoring(&self) -> ScoringConfig {
        ScoringConfig {
            error_policy: if self.scoring_strict {
                ErrorPolicy::Abort
            } else {
                ErrorPolicy::SkipAndWarn
            },
            lax_ranked_fallback: self.ranked_lax_fallback,
            ..ScoringConfig::default()
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
