//! Conversation session aggregate.
//!
//! A `ConversationSession` owns everything one conversation accumulates:
//! the requirements record, the message history, the state machine position
//! and, once it ends, the prediction. Sessions are owned by a
//! [`SessionStore`](super::SessionStore) and never shared across keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::ConversationMessage;
use super::state::ConversationState;
use crate::error::{DyelabError, Result};
use crate::prediction::PredictionResult;
use crate::requirements::RequirementsRecord;
use crate::schema::ParameterField;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    /// Opaque session key
    pub id: String,
    pub state: ConversationState,
    /// Parameters gathered so far
    pub record: RequirementsRecord,
    /// Every message of the conversation in arrival order
    pub history: Vec<ConversationMessage>,
    /// Set once the session reaches `PREDICTED` or `FAILED`
    pub prediction: Option<PredictionResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationSession {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            state: ConversationState::default(),
            record: RequirementsRecord::new(),
            history: Vec::new(),
            prediction: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the state machine to `next`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the move is not allowed from the
    /// current state. The session is left unchanged in that case.
    pub fn transition(&mut self, next: ConversationState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(DyelabError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(
            "[Conversation] session {}: {} -> {}",
            self.id,
            self.state,
            next
        );
        self.state = next;
        self.touch();
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn push_message(&mut self, message: ConversationMessage) {
        self.history.push(message);
        self.touch();
    }

    /// The field asked by the most recent assistant message, if that message
    /// was a question.
    pub fn last_asked_field(&self) -> Option<ParameterField> {
        self.history
            .iter()
            .rev()
            .find(|m| !m.is_user())
            .and_then(|m| m.asked_field)
    }

    /// Drops the gathered parameters. Used when the conversation ends.
    pub fn discard_record(&mut self) {
        self.record = RequirementsRecord::new();
    }

    /// Terminates the session with a failed prediction result.
    ///
    /// Allowed from any non-terminal state.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<()> {
        self.transition(ConversationState::Failed)?;
        self.prediction = Some(PredictionResult::failure(error));
        self.discard_record();
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_gathering() {
        let session = ConversationSession::new("abc");
        assert_eq!(session.state, ConversationState::Gathering);
        assert!(session.record.is_empty());
        assert!(session.history.is_empty());
        assert!(!session.is_terminal());
    }

    #[test]
    fn test_invalid_transition_leaves_state() {
        let mut session = ConversationSession::new("abc");

        let err = session
            .transition(ConversationState::Predicted)
            .unwrap_err();

        assert!(matches!(
            err,
            DyelabError::InvalidTransition {
                from: ConversationState::Gathering,
                to: ConversationState::Predicted
            }
        ));
        assert_eq!(session.state, ConversationState::Gathering);
    }

    #[test]
    fn test_fail_discards_record() {
        let mut session = ConversationSession::new("abc");
        session.record.insert(ParameterField::SaltGl, 50.0);
        session.transition(ConversationState::AwaitingUser).unwrap();

        session.fail("extractor offline").unwrap();

        assert_eq!(session.state, ConversationState::Failed);
        assert!(session.record.is_empty());
        let result = session.prediction.as_ref().unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("extractor offline"));
    }

    #[test]
    fn test_last_asked_field_tracks_latest_question() {
        let mut session = ConversationSession::new("abc");
        session.push_message(ConversationMessage::user("red 4.2"));
        session.push_message(ConversationMessage::question(
            "What is the salt concentration?",
            ParameterField::SaltGl,
        ));
        session.push_message(ConversationMessage::user("50"));

        assert_eq!(session.last_asked_field(), Some(ParameterField::SaltGl));

        session.push_message(ConversationMessage::assistant("Thanks."));
        assert_eq!(session.last_asked_field(), None);
    }
}
