use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_results(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> crate::error::Result<Response> {
    let results = state.result_service.list_results(user_id).await?;
    Ok(Json(json!({ "results": results })).into_response())
}

#[axum::debug_handler]
pub async fn get_result(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let (result, questions) = state.result_service.get_result(user_id, id).await?;
    Ok(Json(json!({
        "result": result,
        "questions": questions,
    }))
    .into_response())
}
