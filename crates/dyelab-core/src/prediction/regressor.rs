use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::schema::FEATURE_COUNT;

/// Number of model outputs (R, G, B).
pub const TARGET_COUNT: usize = 3;

/// A trained multi-output regressor mapping recipe features to raw RGB.
///
/// Outputs are continuous and unclamped. Implementations must be read-only
/// after construction so that one instance can serve every session.
pub trait ColourRegressor: Send + Sync {
    /// Short model family name used in logs, e.g. `"linear"`.
    fn kind(&self) -> &str;

    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> [f64; TARGET_COUNT];
}

/// Source of a regressor, typically a file on disk.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    /// Loads the model.
    ///
    /// # Errors
    ///
    /// Returns `ModelUnavailable` when the artifact is missing or malformed.
    async fn load(&self) -> Result<Arc<dyn ColourRegressor>>;

    /// Human-readable description of where the model comes from.
    fn describe(&self) -> String;
}
