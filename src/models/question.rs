use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Mcq,
    Vsa,
    Lsa,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::Vsa => "vsa",
            QuestionType::Lsa => "lsa",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuestionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mcq" => Ok(QuestionType::Mcq),
            "vsa" => Ok(QuestionType::Vsa),
            "lsa" => Ok(QuestionType::Lsa),
            _ => Err(()),
        }
    }
}

/// A question as returned by the AI gateway. MCQ questions carry exactly the
/// option texts; vsa/lsa questions carry `options: null` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question_type: QuestionType,
    pub question: String,
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
}

impl GeneratedQuestion {
    /// True when the correct answer equals one of the options, compared
    /// case- and whitespace-insensitively.
    pub fn correct_answer_is_an_option(&self) -> bool {
        let Some(options) = &self.options else {
            return false;
        };
        let normalized = self.correct_answer.trim().to_lowercase();
        options.iter().any(|o| o.trim().to_lowercase() == normalized)
    }
}

/// A generated question placed in a quiz: numbered at session creation,
/// answered during play, graded only at submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    #[serde(flatten)]
    pub inner: GeneratedQuestion,
    pub question_number: i32,
    #[serde(default)]
    pub user_answer: String,
    #[serde(default)]
    pub is_correct: Option<bool>,
}

impl QuizQuestion {
    pub fn new(number: i32, inner: GeneratedQuestion) -> Self {
        Self {
            inner,
            question_number: number,
            user_answer: String::new(),
            is_correct: None,
        }
    }
}
