//! Application layer for dyelab.
//!
//! Wires the conversation state machine to an extractor, a session store and
//! the prediction pipeline behind a single entry point,
//! [`ConversationUseCase::start_or_resume`].

pub mod conversation_usecase;
pub mod factory;
pub mod turn;

pub use conversation_usecase::ConversationUseCase;
pub use factory::build_usecase;
pub use turn::TurnResponse;
