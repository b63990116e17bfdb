//! Model artifact loading.
//!
//! # Module Structure
//!
//! - `artifact`: JSON artifact format and validation (`parse_artifact`)
//! - `linear`: Multi-output linear regressor (`LinearRegressor`)
//! - `forest`: Decision-tree ensemble regressor (`ForestRegressor`)
//! - `loader`: File-backed [`ModelLoader`](dyelab_core::prediction::ModelLoader) (`JsonModelLoader`)

mod artifact;
mod forest;
mod linear;
mod loader;

pub use artifact::{ModelArtifact, ModelSpec, TreeSpec, parse_artifact};
pub use forest::{DecisionTree, ForestRegressor};
pub use linear::LinearRegressor;
pub use loader::JsonModelLoader;
