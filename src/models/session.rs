use crate::error::{Error, Result};
use crate::models::question::{GeneratedQuestion, QuizQuestion};
use crate::services::grading_service::AnswerChecker;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    InProgress,
    Completed,
}

/// Outcome of `advance()`: either the session moved to the next question, or
/// the final question was submitted and the fully graded sequence is emitted.
#[derive(Debug)]
pub enum Advance {
    Moved { current_index: usize },
    Completed { questions: Vec<QuizQuestion> },
}

/// One user's quiz, owned by the session store and driven by discrete
/// actions. `current_index` stays within bounds while the quiz is in
/// progress; answers may be recorded for any index, in any order, and the
/// final submission re-grades all of them.
#[derive(Debug, Clone)]
pub struct QuizSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub topic: String,
    pub created_at: DateTime<Utc>,
    questions: Vec<QuizQuestion>,
    current_index: usize,
    phase: Phase,
}

impl QuizSession {
    pub fn new(user_id: Uuid, topic: String, generated: Vec<GeneratedQuestion>) -> Result<Self> {
        if generated.is_empty() {
            return Err(Error::Validation(
                "A quiz needs at least one question".to_string(),
            ));
        }
        let questions = generated
            .into_iter()
            .enumerate()
            .map(|(i, q)| QuizQuestion::new(i as i32 + 1, q))
            .collect();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            topic,
            created_at: Utc::now(),
            questions,
            current_index: 0,
            phase: Phase::Setup,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn current_question(&self) -> &QuizQuestion {
        &self.questions[self.current_index]
    }

    pub fn begin(&mut self) -> Result<()> {
        if self.phase != Phase::Setup {
            return Err(Error::Validation("Quiz has already started".to_string()));
        }
        self.phase = Phase::InProgress;
        Ok(())
    }

    /// Stores or overwrites the answer for a question. Content is not
    /// validated; an empty answer is allowed.
    pub fn record_answer(&mut self, index: usize, answer: String) -> Result<()> {
        if self.phase != Phase::InProgress {
            return Err(Error::Validation(
                "Answers can only be recorded while the quiz is in progress".to_string(),
            ));
        }
        let Some(question) = self.questions.get_mut(index) else {
            return Err(Error::Validation(format!(
                "Question index {} is out of range",
                index
            )));
        };
        question.user_answer = answer;
        Ok(())
    }

    /// Moves to the next question, or submits the quiz when already on the
    /// last one: every question is graded in order (an unanswered question
    /// counts as an empty submission) and the annotated sequence is emitted
    /// exactly once.
    pub fn advance(&mut self, checker: &dyn AnswerChecker) -> Result<Advance> {
        if self.phase != Phase::InProgress {
            return Err(Error::Validation(
                "Quiz is not in progress".to_string(),
            ));
        }
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            return Ok(Advance::Moved {
                current_index: self.current_index,
            });
        }

        for q in &mut self.questions {
            q.is_correct = Some(checker.check(&q.inner, &q.user_answer));
        }
        self.phase = Phase::Completed;
        Ok(Advance::Completed {
            questions: self.questions.clone(),
        })
    }

    pub fn retreat(&mut self) -> Result<usize> {
        if self.phase != Phase::InProgress {
            return Err(Error::Validation(
                "Quiz is not in progress".to_string(),
            ));
        }
        self.current_index = self.current_index.saturating_sub(1);
        Ok(self.current_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionType;
    use crate::services::grading_service::KeywordGrader;

    fn mcq(correct: &str) -> GeneratedQuestion {
        GeneratedQuestion {
            question_type: QuestionType::Mcq,
            question: "pick one".into(),
            options: Some(vec![correct.to_string(), "other".into()]),
            correct_answer: correct.to_string(),
        }
    }

    fn session(n: usize) -> QuizSession {
        let questions = (0..n).map(|i| mcq(&format!("answer {}", i))).collect();
        let mut s = QuizSession::new(Uuid::new_v4(), "topic".into(), questions).unwrap();
        s.begin().unwrap();
        s
    }

    #[test]
    fn question_numbers_are_one_based_and_sequential() {
        let s = session(3);
        let numbers: Vec<i32> = s.questions().iter().map(|q| q.question_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn empty_question_list_is_rejected() {
        assert!(QuizSession::new(Uuid::new_v4(), "t".into(), vec![]).is_err());
    }

    #[test]
    fn gap_answers_are_graded_as_empty_on_submission() {
        let mut s = session(3);
        s.record_answer(0, "answer 0".into()).unwrap();
        s.record_answer(2, "answer 2".into()).unwrap();

        // index 0 -> 1 -> 2, then submit from the last question
        assert!(matches!(
            s.advance(&KeywordGrader).unwrap(),
            Advance::Moved { current_index: 1 }
        ));
        assert!(matches!(
            s.advance(&KeywordGrader).unwrap(),
            Advance::Moved { current_index: 2 }
        ));
        let Advance::Completed { questions } = s.advance(&KeywordGrader).unwrap() else {
            panic!("expected completion");
        };

        assert_eq!(s.phase(), Phase::Completed);
        assert_eq!(questions[0].is_correct, Some(true));
        assert_eq!(questions[1].user_answer, "");
        assert_eq!(questions[1].is_correct, Some(false));
        assert_eq!(questions[2].is_correct, Some(true));
    }

    #[test]
    fn completion_is_emitted_exactly_once() {
        let mut s = session(1);
        s.record_answer(0, "answer 0".into()).unwrap();
        assert!(matches!(
            s.advance(&KeywordGrader).unwrap(),
            Advance::Completed { .. }
        ));
        assert!(s.advance(&KeywordGrader).is_err());
        assert!(s.retreat().is_err());
        assert!(s.record_answer(0, "late".into()).is_err());
    }

    #[test]
    fn retreat_floors_at_zero() {
        let mut s = session(2);
        assert_eq!(s.retreat().unwrap(), 0);
        s.advance(&KeywordGrader).unwrap();
        assert_eq!(s.retreat().unwrap(), 0);
    }

    #[test]
    fn earlier_answers_can_be_revisited_and_overwritten() {
        let mut s = session(2);
        s.record_answer(0, "wrong".into()).unwrap();
        s.advance(&KeywordGrader).unwrap();
        // revisit and fix the first answer before final submission
        s.record_answer(0, "answer 0".into()).unwrap();
        let Advance::Completed { questions } = s.advance(&KeywordGrader).unwrap() else {
            panic!("expected completion");
        };
        assert_eq!(questions[0].is_correct, Some(true));
    }

    #[test]
    fn answers_cannot_be_recorded_before_begin() {
        let questions = vec![mcq("a")];
        let mut s = QuizSession::new(Uuid::new_v4(), "t".into(), questions).unwrap();
        assert_eq!(s.phase(), Phase::Setup);
        assert!(s.record_answer(0, "a".into()).is_err());
    }
}
