use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Aggregate snapshot of one completed quiz. Created once at completion,
/// append-only afterward.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub topic: String,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub score: i32,
    pub question_types: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-question review row belonging to a test result.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestQuestionRecord {
    pub id: Uuid,
    pub test_result_id: Uuid,
    pub user_id: Uuid,
    pub question_type: String,
    pub question: String,
    pub options: Option<JsonValue>,
    pub correct_answer: String,
    pub user_answer: Option<String>,
    pub is_correct: bool,
    pub question_number: i32,
}
