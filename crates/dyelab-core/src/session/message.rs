//! Conversation message types.
//!
//! This module contains types for representing messages in a conversation,
//! including roles and message content.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::schema::ParameterField;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the assistant.
    Assistant,
    /// System-generated message.
    System,
}

/// A single message in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
    /// The field an assistant question asks about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asked_field: Option<ParameterField>,
}

impl ConversationMessage {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now().to_rfc3339(),
            asked_field: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// An assistant message asking for a specific field.
    pub fn question(content: impl Into<String>, field: ParameterField) -> Self {
        Self {
            asked_field: Some(field),
            ..Self::new(MessageRole::Assistant, content)
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}
