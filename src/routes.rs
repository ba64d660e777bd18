// src/routes.rs

use axum::{
    Router,
    body::Body,
    http::{HeaderName, Method, Request},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{assessment, system},
    state::AppState,
};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Assembles the main application router.
///
/// * Questionnaire routes (questions, paradigms, submit, result).
/// * Health and metrics endpoints.
/// * Global middleware: request id, trace span per request, CORS.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let assessment_routes = Router::new()
        .route("/questions", get(assessment::get_questions))
        .route("/paradigms", get(assessment::get_paradigms))
        .route("/submit", post(assessment::submit))
        .route("/result/{user_id}", get(assessment::get_result));

    let system_routes = Router::new()
        .route("/health", get(system::health))
        .route("/metrics", get(system::metrics));

    Router::new()
        .merge(assessment_routes)
        .merge(system_routes)
        // Global Middleware (first listed runs first)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
        .layer(cors)
        .with_state(state)
}
