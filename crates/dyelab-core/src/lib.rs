//! Domain core for conversational dye colour prediction.
//!
//! # Module Structure
//!
//! - `schema`: The twelve recipe parameters and their valid ranges
//! - `requirements`: Gathered-parameter record and completeness checking
//! - `session`: Conversation state machine, messages and the session store trait
//! - `extraction`: Extractor trait mapping conversation onto the schema
//! - `prediction`: Model traits and the prediction pipeline
//! - `config`: Application configuration model
//! - `error`: Shared error type

pub mod config;
pub mod error;
pub mod extraction;
pub mod prediction;
pub mod requirements;
pub mod schema;
pub mod session;

// Re-export common types
pub use error::{DyelabError, Result};
pub use schema::{FEATURE_COUNT, ParameterField};
