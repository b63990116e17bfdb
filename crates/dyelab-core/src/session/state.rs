//! Conversation state machine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Where a conversation currently stands.
///
/// ```text
/// GATHERING --(complete)--> COMPLETE --(predict)--> PREDICTED
/// GATHERING --(incomplete)--> AWAITING_USER --(reply)--> GATHERING
/// any non-terminal --(failure)--> FAILED
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationState {
    /// Extraction and completeness checking are running for the latest message.
    #[default]
    Gathering,
    /// A question was asked; waiting for the next user message.
    AwaitingUser,
    /// All twelve parameters are valid; prediction is about to run.
    Complete,
    /// Prediction produced a colour. Terminal.
    Predicted,
    /// Extraction or prediction failed. Terminal.
    Failed,
}

impl ConversationState {
    /// Returns true when the machine allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: ConversationState) -> bool {
        use ConversationState::*;

        match (self, next) {
            (Gathering, Complete | AwaitingUser | Failed) => true,
            (AwaitingUser, Gathering | Failed) => true,
            (Complete, Predicted | Failed) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Predicted | Self::Failed)
    }

    /// True when the front-end should expect another message from the user.
    pub fn requires_input(self) -> bool {
        matches!(self, Self::AwaitingUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_display_matches_wire_form() {
        assert_eq!(ConversationState::AwaitingUser.to_string(), "AWAITING_USER");
        assert_eq!(
            serde_json::to_string(&ConversationState::AwaitingUser).unwrap(),
            "\"AWAITING_USER\""
        );
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for terminal in [ConversationState::Predicted, ConversationState::Failed] {
            assert!(terminal.is_terminal());
            for next in ConversationState::iter() {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_every_live_state_can_fail() {
        for state in ConversationState::iter().filter(|s| !s.is_terminal()) {
            assert!(state.can_transition_to(ConversationState::Failed), "{state}");
        }
    }

    #[test]
    fn test_cannot_skip_prediction() {
        assert!(!ConversationState::Gathering.can_transition_to(ConversationState::Predicted));
        assert!(!ConversationState::AwaitingUser.can_transition_to(ConversationState::Complete));
    }
}
