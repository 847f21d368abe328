use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::quiz_dto::{CreateSessionRequest, RecordAnswerRequest};
use crate::middleware::auth::AuthUser;
use crate::models::session::Advance;
use crate::services::grading_service::{GradingService, KeywordGrader};
use crate::AppState;

#[axum::debug_handler]
pub async fn create_session(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<CreateSessionRequest>,
) -> crate::error::Result<Response> {
    req.validate()
        .map_err(|e| crate::error::Error::Validation(e.to_string()))?;

    let snapshot = state
        .session_service
        .create(user_id, req.topic.trim().to_string(), req.questions)?;
    tracing::info!(session_id = %snapshot.id, total = snapshot.total_questions, "Quiz session started");
    Ok((StatusCode::CREATED, Json(snapshot)).into_response())
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let snapshot = state.session_service.snapshot(id, user_id)?;
    Ok(Json(snapshot).into_response())
}

#[axum::debug_handler]
pub async fn record_answer(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<RecordAnswerRequest>,
) -> crate::error::Result<Response> {
    state
        .session_service
        .record_answer(id, user_id, req.index, req.answer)?;
    Ok(Json(json!({ "saved": true, "index": req.index })).into_response())
}

/// Moves to the next question, or submits on the last one. Submission grades
/// every question, aggregates the score, and persists best-effort: a failed
/// save is logged and reported via `saved: false`, but the computed summary
/// is still returned.
#[axum::debug_handler]
pub async fn advance_session(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    match state.session_service.advance(id, user_id, &KeywordGrader)? {
        Advance::Moved { current_index } => Ok(Json(json!({
            "completed": false,
            "current_index": current_index,
        }))
        .into_response()),
        Advance::Completed { questions } => {
            let summary = GradingService::aggregate(&questions)?;
            let topic = state.session_service.topic(id, user_id)?;
            tracing::info!(session_id = %id, score = summary.score, "Quiz completed");

            let (saved, result_id) = match state
                .result_service
                .save_result(user_id, &topic, &summary, &questions)
                .await
            {
                Ok(result) => (true, Some(result.id)),
                Err(e) => {
                    tracing::error!(session_id = %id, error = %e, "Failed to save quiz result");
                    (false, None)
                }
            };

            Ok(Json(json!({
                "completed": true,
                "summary": summary,
                "saved": saved,
                "result_id": result_id,
                "questions": questions,
            }))
            .into_response())
        }
    }
}

#[axum::debug_handler]
pub async fn retreat_session(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let current_index = state.session_service.retreat(id, user_id)?;
    Ok(Json(json!({ "current_index": current_index })).into_response())
}

#[axum::debug_handler]
pub async fn discard_session(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.session_service.discard(id, user_id)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
