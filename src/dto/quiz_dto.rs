use crate::models::question::GeneratedQuestion;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

/// Body of `POST /api/quiz/generate`. `questionCount` is accepted as any
/// JSON value and coerced by the request builder.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateFromTextRequest {
    pub text: String,
    #[serde(default)]
    pub question_count: Option<JsonValue>,
    #[serde(default)]
    pub question_types: Option<Vec<String>>,
}

/// Body of `POST /api/quiz/generate-from-topic`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateFromTopicRequest {
    pub topic: String,
    #[serde(default)]
    pub question_count: Option<JsonValue>,
    #[serde(default)]
    pub question_types: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, message = "Topic label is required"))]
    pub topic: String,
    pub questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct RecordAnswerRequest {
    pub index: usize,
    #[serde(default)]
    pub answer: String,
}
