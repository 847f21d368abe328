use crate::error::{Error, Result};
use crate::models::generation::{GenerationRequest, QuizSource};
use crate::models::question::{GeneratedQuestion, QuestionType};
use crate::utils::text::truncate_chars;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Grounding material handed to the question-generation call is capped at
/// this many characters.
pub const GROUNDING_CHAR_LIMIT: usize = 15_000;

#[derive(Clone)]
pub struct GenerationService {
    client: Client,
    gateway_url: String,
    api_key: String,
    model: String,
}

impl GenerationService {
    pub fn new(gateway_url: String, api_key: String, model: String, client: Client) -> Self {
        Self {
            client,
            gateway_url,
            api_key,
            model,
        }
    }

    /// Produces questions for a validated request. Text mode grounds the
    /// generation call on the user-supplied text directly; topic mode first
    /// researches the topic and grounds on the overview.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Vec<GeneratedQuestion>> {
        match request.source() {
            QuizSource::Text(text) => {
                let grounding = truncate_chars(text, GROUNDING_CHAR_LIMIT);
                self.generate_questions(grounding, request.count(), request.types(), None)
                    .await
            }
            QuizSource::Topic(topic) => {
                let topic = topic.trim();
                let overview = self.research_topic(topic).await?;
                let grounding = truncate_chars(&overview, GROUNDING_CHAR_LIMIT);
                self.generate_questions(grounding, request.count(), request.types(), Some(topic))
                    .await
            }
        }
    }

    /// Stage one of topic mode: ask the gateway for a factual overview that
    /// the generation stage can treat as source material.
    pub async fn research_topic(&self, topic: &str) -> Result<String> {
        let prompt = format!(
            "You are a subject matter expert. Provide a comprehensive, factual overview of the \
             following topic that can be used to generate educational assessment questions. Cover \
             key concepts, definitions, principles, important facts, and relationships. Be thorough \
             and accurate.\n\nTopic: {}\n\nProvide a detailed overview in 2000-3000 words.",
            topic
        );

        let messages = serde_json::json!([
            {"role": "user", "content": prompt}
        ]);

        let content = self.chat(messages, 0.5).await.map_err(|e| match e {
            Error::Generation(_) => Error::Generation("Failed to research topic".to_string()),
            other => other,
        })?;

        if content.trim().is_empty() {
            return Err(Error::Generation(
                "No research content generated".to_string(),
            ));
        }
        Ok(content)
    }

    /// Stage two: one completion call that must yield a JSON array of exactly
    /// `count` questions grounded on the given material.
    pub async fn generate_questions(
        &self,
        grounding: &str,
        count: usize,
        types: &[QuestionType],
        topic: Option<&str>,
    ) -> Result<Vec<GeneratedQuestion>> {
        let system_prompt = generation_prompt(count, types, topic);
        let user_content = match topic {
            Some(_) => format!("Generate {} questions from this research:\n\n{}", count, grounding),
            None => format!("Generate {} questions from this text:\n\n{}", count, grounding),
        };

        let messages = serde_json::json!([
            {"role": "system", "content": system_prompt},
            {"role": "user", "content": user_content},
        ]);

        let content = self.chat(messages, 0.7).await?;
        parse_questions(&content)
    }

    async fn chat(&self, messages: JsonValue, temperature: f64) -> Result<String> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": temperature,
        });

        let res = self
            .client
            .post(&self.gateway_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, "AI gateway error");
            return Err(map_upstream_status(status.as_u16()));
        }

        let body: JsonValue = res.json().await?;
        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Generation("No content returned from AI".to_string()))
    }
}

fn map_upstream_status(status: u16) -> Error {
    match status {
        429 => Error::RateLimited("Rate limit exceeded. Please try again in a moment.".to_string()),
        402 => Error::QuotaExhausted(
            "AI credits exhausted. Please add funds to continue.".to_string(),
        ),
        _ => Error::Generation("Failed to generate questions. Please try again.".to_string()),
    }
}

fn generation_prompt(count: usize, types: &[QuestionType], topic: Option<&str>) -> String {
    let mut type_instructions = String::new();
    if types.contains(&QuestionType::Mcq) {
        type_instructions.push_str(
            "\n- MCQ (Multiple Choice Questions): Provide exactly 4 options labeled A, B, C, D. \
             Each option must be a complete sentence or phrase - never truncate with \"...\" or \
             ellipsis. The correct_answer should be the full text of the correct option.",
        );
    }
    if types.contains(&QuestionType::Vsa) {
        type_instructions.push_str(
            "\n- VSA (Very Short Answer): Questions that require a brief answer of 1-3 sentences. \
             Set options to null. The correct_answer should be a concise but complete answer.",
        );
    }
    if types.contains(&QuestionType::Lsa) {
        type_instructions.push_str(
            "\n- LSA (Long/Short Answer): Questions requiring detailed explanations of 3-6 \
             sentences. Set options to null. The correct_answer should be a thorough explanation.",
        );
    }

    let type_list = types
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let grounding_clause = match topic {
        Some(topic) => format!("based on the provided research content about \"{}\"", topic),
        None => "based ONLY on the provided text content".to_string(),
    };

    format!(
        "You are an expert educational assessment creator. Generate exactly {count} practice test \
         questions {grounding_clause}.\n\n\
         Question types to generate: {type_list}\n{type_instructions}\n\n\
         CRITICAL RULES:\n\
         1. ALL questions MUST be answerable from the provided content alone. Do NOT create \
         questions about topics not covered in it.\n\
         2. Distribute question types as evenly as possible among the requested types.\n\
         3. For MCQ options, write COMPLETE sentences/phrases. NEVER truncate with \"...\" or \
         ellipsis.\n\
         4. Questions should test understanding at various cognitive levels (recall, \
         comprehension, application, analysis).\n\
         5. Make questions clear and unambiguous.\n\n\
         You MUST respond with a valid JSON array using this exact structure:\n\
         [\n  {{\n    \"question_type\": \"mcq\" | \"vsa\" | \"lsa\",\n    \"question\": \"The \
         full question text\",\n    \"options\": [\"Option A full text\", \"Option B full text\", \
         \"Option C full text\", \"Option D full text\"] | null,\n    \"correct_answer\": \"The \
         complete correct answer text\"\n  }}\n]\n\n\
         Respond ONLY with the JSON array. No markdown, no code blocks, no explanation."
    )
}

/// Parses the raw completion text into validated questions. The reply is
/// expected to be a JSON array, possibly wrapped in a fenced code block.
pub fn parse_questions(content: &str) -> Result<Vec<GeneratedQuestion>> {
    let cleaned = strip_code_fence(content);

    let value: JsonValue = serde_json::from_str(cleaned).map_err(|_| {
        tracing::error!(raw = cleaned, "Failed to parse AI response");
        Error::UpstreamParse("Failed to parse generated questions".to_string())
    })?;

    let Some(entries) = value.as_array() else {
        return Err(Error::UpstreamParse(
            "Invalid questions format received".to_string(),
        ));
    };

    let mut questions = Vec::with_capacity(entries.len());
    for entry in entries {
        match serde_json::from_value::<GeneratedQuestion>(entry.clone()) {
            Ok(q) => {
                if let Some(q) = sanitize_question(q) {
                    questions.push(q);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed generated question");
            }
        }
    }

    if questions.is_empty() {
        return Err(Error::UpstreamParse(
            "Invalid questions format received".to_string(),
        ));
    }
    Ok(questions)
}

/// Enforces the shape invariants: free-text questions carry no options, and
/// an MCQ's correct answer must be one of its options.
fn sanitize_question(mut q: GeneratedQuestion) -> Option<GeneratedQuestion> {
    match q.question_type {
        QuestionType::Mcq => {
            let has_options = q.options.as_ref().is_some_and(|o| !o.is_empty());
            if !has_options || !q.correct_answer_is_an_option() {
                tracing::warn!(question = %q.question, "Dropping MCQ with inconsistent options");
                return None;
            }
            Some(q)
        }
        QuestionType::Vsa | QuestionType::Lsa => {
            q.options = None;
            Some(q)
        }
    }
}

fn strip_code_fence(content: &str) -> &str {
    let mut s = content.trim();
    if let Some(rest) = s.strip_prefix("```") {
        s = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
        s = s.trim_end();
        if let Some(body) = s.strip_suffix("```") {
            s = body.trim_end();
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_ARRAY: &str = r#"[
        {"question_type":"mcq","question":"Capital of France?","options":["Paris","London","Berlin","Madrid"],"correct_answer":"Paris"},
        {"question_type":"vsa","question":"What does the mitochondria do?","options":null,"correct_answer":"It produces energy"}
    ]"#;

    #[test]
    fn parses_a_plain_json_array() {
        let questions = parse_questions(VALID_ARRAY).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question_type, QuestionType::Mcq);
        assert_eq!(questions[1].options, None);
    }

    #[test]
    fn strips_fenced_code_blocks() {
        let fenced = format!("```json\n{}\n```", VALID_ARRAY);
        assert_eq!(parse_questions(&fenced).unwrap().len(), 2);

        let fenced = format!("```\n{}\n```", VALID_ARRAY);
        assert_eq!(parse_questions(&fenced).unwrap().len(), 2);
    }

    #[test]
    fn unparseable_reply_is_a_parse_failure() {
        let err = parse_questions("The questions are as follows: ...").unwrap_err();
        assert!(matches!(err, Error::UpstreamParse(msg) if msg.contains("parse")));
    }

    #[test]
    fn non_array_reply_is_invalid_format() {
        let err = parse_questions(r#"{"questions":[]}"#).unwrap_err();
        assert!(matches!(err, Error::UpstreamParse(msg) if msg.contains("Invalid")));

        let err = parse_questions("[]").unwrap_err();
        assert!(matches!(err, Error::UpstreamParse(_)));
    }

    #[test]
    fn mcq_with_foreign_correct_answer_is_dropped() {
        let raw = r#"[
            {"question_type":"mcq","question":"bad","options":["A","B"],"correct_answer":"C"},
            {"question_type":"mcq","question":"good","options":["A","B"],"correct_answer":"b"}
        ]"#;
        let questions = parse_questions(raw).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "good");
    }

    #[test]
    fn free_text_options_are_forced_to_null() {
        let raw = r#"[
            {"question_type":"lsa","question":"explain","options":["stray"],"correct_answer":"A detailed explanation"}
        ]"#;
        let questions = parse_questions(raw).unwrap();
        assert_eq!(questions[0].options, None);
    }

    #[test]
    fn upstream_statuses_map_to_the_error_taxonomy() {
        assert!(matches!(map_upstream_status(429), Error::RateLimited(_)));
        assert!(matches!(map_upstream_status(402), Error::QuotaExhausted(_)));
        assert!(matches!(map_upstream_status(503), Error::Generation(_)));
    }

    #[test]
    fn prompt_only_mentions_requested_types() {
        let prompt = generation_prompt(5, &[QuestionType::Vsa], None);
        assert!(prompt.contains("exactly 5"));
        assert!(prompt.contains("VSA"));
        assert!(!prompt.contains("- MCQ"));
        assert!(!prompt.contains("- LSA"));

        let prompt = generation_prompt(
            10,
            &[QuestionType::Mcq, QuestionType::Vsa, QuestionType::Lsa],
            Some("Photosynthesis"),
        );
        assert!(prompt.contains("mcq, vsa, lsa"));
        assert!(prompt.contains("Photosynthesis"));
    }
}
