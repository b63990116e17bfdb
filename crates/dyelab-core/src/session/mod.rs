//! Conversation session domain module.
//!
//! # Module Structure
//!
//! - `state`: Conversation state machine (`ConversationState`)
//! - `message`: Conversation message types (`MessageRole`, `ConversationMessage`)
//! - `model`: Per-session aggregate (`ConversationSession`)
//! - `store`: Store trait for keyed session ownership (`SessionStore`)
//!
//! # Usage
//!
//! ```ignore
//! use dyelab_core::session::{ConversationSession, ConversationState, SessionStore};
//! use dyelab_core::session::{ConversationMessage, MessageRole};
//! ```

mod message;
mod model;
mod state;
mod store;

// Re-export public API
pub use message::{ConversationMessage, MessageRole};
pub use model::ConversationSession;
pub use state::ConversationState;
pub use store::{SessionStore, SharedSession};
