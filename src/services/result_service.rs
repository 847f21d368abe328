use crate::error::{Error, Result};
use crate::models::question::QuizQuestion;
use crate::models::result::{TestQuestionRecord, TestResult};
use crate::services::grading_service::ScoreSummary;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ResultService {
    pool: PgPool,
}

impl ResultService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persists a completed quiz: the parent result row first, then one
    /// review row per question. A child failure after the parent is in is
    /// reported as-is; there is no automatic rollback, so the parent row
    /// survives and the error message names it.
    pub async fn save_result(
        &self,
        user_id: Uuid,
        topic: &str,
        summary: &ScoreSummary,
        questions: &[QuizQuestion],
    ) -> Result<TestResult> {
        let result: TestResult = sqlx::query_as(
            r#"
            INSERT INTO test_results (user_id, topic, total_questions, correct_answers, score, question_types)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, topic, total_questions, correct_answers, score, question_types, created_at
            "#,
        )
        .bind(user_id)
        .bind(topic)
        .bind(summary.total_questions)
        .bind(summary.correct_answers)
        .bind(summary.score)
        .bind(&summary.question_types)
        .fetch_one(&self.pool)
        .await?;

        for q in questions {
            let options = q
                .inner
                .options
                .as_ref()
                .map(serde_json::to_value)
                .transpose()?;
            let user_answer = if q.user_answer.is_empty() {
                None
            } else {
                Some(q.user_answer.as_str())
            };

            sqlx::query(
                r#"
                INSERT INTO test_questions
                    (test_result_id, user_id, question_type, question, options,
                     correct_answer, user_answer, is_correct, question_number)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(result.id)
            .bind(user_id)
            .bind(q.inner.question_type.as_str())
            .bind(&q.inner.question)
            .bind(&options)
            .bind(&q.inner.correct_answer)
            .bind(user_answer)
            .bind(q.is_correct.unwrap_or(false))
            .bind(q.question_number)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Internal(format!(
                    "Result {} was saved but its question rows were not: {}",
                    result.id, e
                ))
            })?;
        }

        Ok(result)
    }

    /// History for one user, newest first.
    pub async fn list_results(&self, user_id: Uuid) -> Result<Vec<TestResult>> {
        let results = sqlx::query_as(
            r#"
            SELECT id, user_id, topic, total_questions, correct_answers, score, question_types, created_at
            FROM test_results
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(results)
    }

    pub async fn get_result(
        &self,
        user_id: Uuid,
        result_id: Uuid,
    ) -> Result<(TestResult, Vec<TestQuestionRecord>)> {
        let result: TestResult = sqlx::query_as(
            r#"
            SELECT id, user_id, topic, total_questions, correct_answers, score, question_types, created_at
            FROM test_results
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(result_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let questions: Vec<TestQuestionRecord> = sqlx::query_as(
            r#"
            SELECT id, test_result_id, user_id, question_type, question, options,
                   correct_answer, user_answer, is_correct, question_number
            FROM test_questions
            WHERE test_result_id = $1 AND user_id = $2
            ORDER BY question_number
            "#,
        )
        .bind(result_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok((result, questions))
    }
}
