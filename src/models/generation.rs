use crate::error::{Error, Result};
use crate::models::question::QuestionType;
use serde_json::Value as JsonValue;

pub const MIN_QUESTION_COUNT: i64 = 1;
pub const MAX_QUESTION_COUNT: i64 = 50;
pub const DEFAULT_QUESTION_COUNT: i64 = 5;

pub const MIN_TEXT_CHARS: usize = 50;
pub const MAX_TEXT_CHARS: usize = 50_000;
pub const MIN_TOPIC_CHARS: usize = 2;
pub const MAX_TOPIC_CHARS: usize = 200;

/// The grounding material a generation request starts from.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizSource {
    /// Raw text extracted from uploaded study material.
    Text(String),
    /// A topic name to be researched before question generation.
    Topic(String),
}

/// A validated, immutable generation request. Construction is the only way
/// to obtain one, so every request reaching the generation service already
/// satisfies the size and type-set bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    source: QuizSource,
    count: usize,
    types: Vec<QuestionType>,
}

impl GenerationRequest {
    /// Validates and clamps user-chosen parameters. Performs no I/O.
    pub fn build(
        raw_count: Option<&JsonValue>,
        raw_types: Option<&[String]>,
        source: QuizSource,
    ) -> Result<Self> {
        match &source {
            QuizSource::Text(text) => {
                if text.trim().chars().count() < MIN_TEXT_CHARS {
                    return Err(Error::Validation(format!(
                        "Please provide enough text content (at least {} characters) to generate questions.",
                        MIN_TEXT_CHARS
                    )));
                }
                if text.chars().count() > MAX_TEXT_CHARS {
                    return Err(Error::Validation(format!(
                        "Text content must be under {} characters.",
                        MAX_TEXT_CHARS
                    )));
                }
            }
            QuizSource::Topic(topic) => {
                if topic.trim().chars().count() < MIN_TOPIC_CHARS {
                    return Err(Error::Validation(format!(
                        "Please provide a valid topic (at least {} characters).",
                        MIN_TOPIC_CHARS
                    )));
                }
                if topic.chars().count() > MAX_TOPIC_CHARS {
                    return Err(Error::Validation(format!(
                        "Topic must be under {} characters.",
                        MAX_TOPIC_CHARS
                    )));
                }
            }
        }

        let count = coerce_count(raw_count).clamp(MIN_QUESTION_COUNT, MAX_QUESTION_COUNT) as usize;

        let types = match raw_types {
            None => vec![QuestionType::Mcq],
            Some(raw) => {
                let mut types: Vec<QuestionType> = Vec::new();
                for t in raw {
                    if let Ok(parsed) = t.parse::<QuestionType>() {
                        if !types.contains(&parsed) {
                            types.push(parsed);
                        }
                    }
                }
                if types.is_empty() {
                    return Err(Error::Validation(
                        "At least one valid question type required".to_string(),
                    ));
                }
                types
            }
        };

        Ok(Self {
            source,
            count,
            types,
        })
    }

    pub fn source(&self) -> &QuizSource {
        &self.source
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn types(&self) -> &[QuestionType] {
        &self.types
    }
}

fn coerce_count(raw: Option<&JsonValue>) -> i64 {
    match raw {
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(DEFAULT_QUESTION_COUNT),
        Some(JsonValue::String(s)) => s.trim().parse().unwrap_or(DEFAULT_QUESTION_COUNT),
        _ => DEFAULT_QUESTION_COUNT,
    }
}
