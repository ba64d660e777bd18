// src/handlers/assessment.rs

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
};
use validator::Validate;

use crate::{error::AppError, models::answer::SubmitRequest, services::SubmissionService};

/// Returns the full question catalog.
pub async fn get_questions(
    State(service): State<SubmissionService>,
) -> Result<impl IntoResponse, AppError> {
    let questions = service.questions().await?;
    Ok(Json(questions))
}

/// Returns every paradigm (question category).
pub async fn get_paradigms(
    State(service): State<SubmissionService>,
) -> Result<impl IntoResponse, AppError> {
    let paradigms = service.paradigms().await?;
    Ok(Json(paradigms))
}

/// Submits a questionnaire and returns the computed score.
///
/// * Rejects unparsable bodies and invalid user ids with 400.
/// * Scores the answers against the current catalog.
/// * Saves the result, then makes it available on `/result/{user_id}`.
pub async fn submit(
    State(service): State<SubmissionService>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    if let Err(validation_errors) = req.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let receipt = service.submit(&req.user_id, &req.answers).await?;
    Ok(Json(receipt))
}

/// Returns the latest result of a user, or 404 if they never submitted.
pub async fn get_result(
    State(service): State<SubmissionService>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = service.result(&user_id)?;
    Ok(Json(result))
}
