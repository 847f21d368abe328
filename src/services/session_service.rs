use crate::error::{Error, Result};
use crate::models::question::{GeneratedQuestion, QuizQuestion};
use crate::models::session::{Advance, Phase, QuizSession};
use crate::services::grading_service::AnswerChecker;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// What a caller sees of their session between actions.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub topic: String,
    pub phase: Phase,
    pub current_index: usize,
    pub total_questions: usize,
    pub current_question: QuizQuestion,
}

/// Owns every active quiz session, keyed by id and scoped to the user that
/// created it. Each action locks the store, runs to completion, and releases,
/// so no two mutations of the same session can interleave.
#[derive(Clone, Default)]
pub struct SessionService {
    sessions: Arc<Mutex<HashMap<Uuid, QuizSession>>>,
}

impl SessionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &self,
        user_id: Uuid,
        topic: String,
        questions: Vec<GeneratedQuestion>,
    ) -> Result<SessionSnapshot> {
        let mut session = QuizSession::new(user_id, topic, questions)?;
        session.begin()?;
        let snapshot = snapshot_of(&session);
        self.lock().insert(session.id, session);
        Ok(snapshot)
    }

    pub fn snapshot(&self, id: Uuid, user_id: Uuid) -> Result<SessionSnapshot> {
        self.with(id, user_id, |s| Ok(snapshot_of(s)))
    }

    pub fn topic(&self, id: Uuid, user_id: Uuid) -> Result<String> {
        self.with(id, user_id, |s| Ok(s.topic.clone()))
    }

    pub fn record_answer(
        &self,
        id: Uuid,
        user_id: Uuid,
        index: usize,
        answer: String,
    ) -> Result<()> {
        self.with(id, user_id, |s| s.record_answer(index, answer))
    }

    pub fn advance(&self, id: Uuid, user_id: Uuid, checker: &dyn AnswerChecker) -> Result<Advance> {
        self.with(id, user_id, |s| s.advance(checker))
    }

    pub fn retreat(&self, id: Uuid, user_id: Uuid) -> Result<usize> {
        self.with(id, user_id, |s| s.retreat())
    }

    /// Retake: the session is dropped entirely; a completed quiz is never
    /// mutated in place.
    pub fn discard(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let mut guard = self.lock();
        match guard.get(&id) {
            Some(s) if s.user_id == user_id => {
                guard.remove(&id);
                Ok(())
            }
            _ => Err(Error::NotFound("Quiz session not found".to_string())),
        }
    }

    fn with<T>(
        &self,
        id: Uuid,
        user_id: Uuid,
        f: impl FnOnce(&mut QuizSession) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self.lock();
        match guard.get_mut(&id) {
            // A foreign session id reads as not-found rather than forbidden.
            Some(s) if s.user_id == user_id => f(s),
            _ => Err(Error::NotFound("Quiz session not found".to_string())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, QuizSession>> {
        self.sessions.lock().expect("session store mutex poisoned")
    }
}

fn snapshot_of(session: &QuizSession) -> SessionSnapshot {
    SessionSnapshot {
        id: session.id,
        topic: session.topic.clone(),
        phase: session.phase(),
        current_index: session.current_index(),
        total_questions: session.questions().len(),
        current_question: session.current_question().clone(),
    }
}
