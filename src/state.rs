use crate::config::Config;
use crate::services::SubmissionService;
use axum::extract::FromRef;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub submissions: SubmissionService,
    pub config: Config,
    /// Absent when no Prometheus recorder was installed (tests).
    pub metrics: Option<PrometheusHandle>,
}

impl FromRef<AppState> for SubmissionService {
    fn from_ref(state: &AppState) -> Self {
        state.submissions.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
