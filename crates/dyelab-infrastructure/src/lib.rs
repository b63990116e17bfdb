//! Infrastructure for dyelab: model artifacts, session storage,
//! configuration files and logging.
//!
//! # Module Structure
//!
//! - `model`: JSON model artifacts and the regressors they describe
//! - `session_store`: In-memory `SessionStore` with idle expiry
//! - `config_service`: TOML config loading with environment overrides
//! - `paths`: Platform config and data locations
//! - `logging`: `tracing-subscriber` setup

pub mod config_service;
pub mod logging;
pub mod model;
pub mod paths;
pub mod session_store;

pub use config_service::ConfigService;
pub use logging::init_logging;
pub use model::{JsonModelLoader, parse_artifact};
pub use paths::DyelabPaths;
pub use session_store::InMemorySessionStore;
