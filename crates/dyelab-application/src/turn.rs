use dyelab_core::prediction::PredictionResult;
use dyelab_core::requirements::RequirementsRecord;
use dyelab_core::session::ConversationState;
use serde::{Deserialize, Serialize};

/// Reply to one user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResponse {
    pub session_id: String,
    /// Text to show the user.
    pub response: String,
    /// True while the conversation waits for another message.
    pub requires_input: bool,
    pub state: ConversationState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionResult>,
    /// Parameters gathered so far, or the final set once the session ends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<RequirementsRecord>,
    /// Values from this turn that failed validation and were ignored.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl TurnResponse {
    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }
}
