use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
};

use crate::dto::quiz_dto::{GenerateFromTextRequest, GenerateFromTopicRequest, GenerateResponse};
use crate::models::generation::{GenerationRequest, QuizSource};
use crate::AppState;

#[axum::debug_handler]
pub async fn generate_from_text(
    State(state): State<AppState>,
    Json(req): Json<GenerateFromTextRequest>,
) -> crate::error::Result<Response> {
    let request = GenerationRequest::build(
        req.question_count.as_ref(),
        req.question_types.as_deref(),
        QuizSource::Text(req.text),
    )?;

    let questions = state.generation_service.generate(&request).await?;
    tracing::info!(count = questions.len(), "Generated questions from text");
    Ok(Json(GenerateResponse { questions }).into_response())
}

#[axum::debug_handler]
pub async fn generate_from_topic(
    State(state): State<AppState>,
    Json(req): Json<GenerateFromTopicRequest>,
) -> crate::error::Result<Response> {
    let request = GenerationRequest::build(
        req.question_count.as_ref(),
        req.question_types.as_deref(),
        QuizSource::Topic(req.topic),
    )?;

    let questions = state.generation_service.generate(&request).await?;
    tracing::info!(count = questions.len(), "Generated questions from topic");
    Ok(Json(GenerateResponse { questions }).into_response())
}
