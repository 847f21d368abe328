use crate::error::{Error, Result};
use crate::models::question::{GeneratedQuestion, QuestionType, QuizQuestion};
use serde::Serialize;
use std::collections::BTreeSet;

/// Decides whether a submitted answer is correct. Kept behind a trait so the
/// keyword heuristic can be swapped for a stricter grader without touching
/// the session state machine.
#[cfg_attr(test, mockall::automock)]
pub trait AnswerChecker: Send + Sync {
    fn check(&self, question: &GeneratedQuestion, answer: &str) -> bool;
}

/// Default grader: exact normalized match for MCQ, keyword overlap for
/// free-text answers.
pub struct KeywordGrader;

impl AnswerChecker for KeywordGrader {
    fn check(&self, question: &GeneratedQuestion, answer: &str) -> bool {
        if question.question_type == QuestionType::Mcq {
            return answer.trim().to_lowercase() == question.correct_answer.trim().to_lowercase();
        }

        let correct = question.correct_answer.to_lowercase();
        let significant = significant_words(&correct);
        let submitted = answer.to_lowercase();
        let submitted_words: Vec<&str> = submitted.split_whitespace().collect();

        let matched = significant
            .iter()
            .filter(|w| submitted_words.iter().any(|sw| sw.contains(*w)))
            .count();

        // An answer key with no words longer than 3 characters yields a zero
        // threshold, so any submission (even empty) passes. Kept as-is; see
        // DESIGN.md.
        matched >= (significant.len() as f64 * 0.3).ceil() as usize
    }
}

/// Tokens of the answer key worth matching against: whitespace-split words
/// longer than 3 characters.
fn significant_words(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .collect()
}

/// Scored summary of a completed quiz.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub total_questions: i32,
    pub correct_answers: i32,
    pub score: i32,
    pub question_types: Vec<String>,
}

pub struct GradingService;

impl GradingService {
    /// Computes score, counts, and the distinct type set from an annotated
    /// question sequence. Pure and idempotent; refuses empty input.
    pub fn aggregate(questions: &[QuizQuestion]) -> Result<ScoreSummary> {
        if questions.is_empty() {
            return Err(Error::Validation(
                "Cannot aggregate an empty question list".to_string(),
            ));
        }

        let total = questions.len() as i32;
        let correct = questions
            .iter()
            .filter(|q| q.is_correct == Some(true))
            .count() as i32;
        let score = (f64::from(correct) * 100.0 / f64::from(total)).round() as i32;

        let question_types: Vec<String> = questions
            .iter()
            .map(|q| q.inner.question_type.as_str().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(ScoreSummary {
            total_questions: total,
            correct_answers: correct,
            score,
            question_types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq(correct: &str) -> GeneratedQuestion {
        GeneratedQuestion {
            question_type: QuestionType::Mcq,
            question: "q".into(),
            options: Some(vec![correct.to_string(), "other".into()]),
            correct_answer: correct.to_string(),
        }
    }

    fn vsa(correct: &str) -> GeneratedQuestion {
        GeneratedQuestion {
            question_type: QuestionType::Vsa,
            question: "q".into(),
            options: None,
            correct_answer: correct.to_string(),
        }
    }

    #[test]
    fn mcq_requires_exact_normalized_match() {
        let q = mcq("Paris");
        assert!(KeywordGrader.check(&q, "  paris "));
        assert!(KeywordGrader.check(&q, "PARIS"));
        assert!(!KeywordGrader.check(&q, "Pariss"));
        assert!(!KeywordGrader.check(&q, ""));
    }

    #[test]
    fn vsa_matches_on_any_significant_word() {
        // significant words: mitochondria, produces, energy; threshold ceil(0.9) = 1
        let q = vsa("The mitochondria produces energy");
        assert!(KeywordGrader.check(&q, "it makes energy for the cell"));
        assert!(KeywordGrader.check(&q, "the MITOCHONDRIA"));
        assert!(!KeywordGrader.check(&q, "no idea at all"));
        assert!(!KeywordGrader.check(&q, ""));
    }

    #[test]
    fn vsa_match_is_substring_within_a_token() {
        let q = vsa("photosynthesis happens in chloroplasts");
        assert!(KeywordGrader.check(&q, "plants-photosynthesis-stuff"));
    }

    #[test]
    fn vsa_threshold_scales_with_answer_length() {
        // 10 significant words, threshold ceil(3.0) = 3
        let q = vsa("alpha1 beta2 gamma3 delta4 epsilon5 zeta6 eta7 theta8 iota9 kappa10");
        assert!(!KeywordGrader.check(&q, "alpha1 beta2"));
        assert!(KeywordGrader.check(&q, "alpha1 beta2 gamma3"));
    }

    #[test]
    fn answer_key_without_significant_words_is_trivially_correct() {
        let q = vsa("it is a b");
        assert!(KeywordGrader.check(&q, ""));
        assert!(KeywordGrader.check(&q, "anything"));
    }

    fn answered(n: usize, correct: usize) -> Vec<QuizQuestion> {
        (0..n)
            .map(|i| {
                let mut q = QuizQuestion::new(i as i32 + 1, mcq("a"));
                q.is_correct = Some(i < correct);
                q
            })
            .collect()
    }

    #[test]
    fn aggregate_rounds_to_integer_percent() {
        let summary = GradingService::aggregate(&answered(10, 7)).unwrap();
        assert_eq!(summary.score, 70);
        assert_eq!(summary.correct_answers, 7);
        assert_eq!(summary.total_questions, 10);

        let summary = GradingService::aggregate(&answered(3, 2)).unwrap();
        assert_eq!(summary.score, 67);
    }

    #[test]
    fn aggregate_refuses_empty_input() {
        let err = GradingService::aggregate(&[]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn aggregate_collects_distinct_types() {
        let mut questions = answered(2, 1);
        let mut extra = QuizQuestion::new(3, vsa("something significant"));
        extra.is_correct = Some(false);
        questions.push(extra);

        let summary = GradingService::aggregate(&questions).unwrap();
        assert_eq!(summary.question_types, vec!["mcq", "vsa"]);
    }

    #[test]
    fn aggregate_is_idempotent_and_does_not_mutate() {
        let questions = answered(4, 2);
        let a = GradingService::aggregate(&questions).unwrap();
        let b = GradingService::aggregate(&questions).unwrap();
        assert_eq!(a, b);
        assert_eq!(questions.len(), 4);
    }

    #[test]
    fn ungraded_questions_count_as_incorrect() {
        let questions: Vec<QuizQuestion> =
            (0..2).map(|i| QuizQuestion::new(i + 1, mcq("a"))).collect();
        let summary = GradingService::aggregate(&questions).unwrap();
        assert_eq!(summary.correct_answers, 0);
        assert_eq!(summary.score, 0);
    }
}
