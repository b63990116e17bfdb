//! Colour prediction.
//!
//! # Module Structure
//!
//! - `regressor`: Model traits (`ColourRegressor`, `ModelLoader`)
//! - `result`: Prediction outcome and channel formatting (`PredictionResult`)
//! - `pipeline`: Lazy model loading and prediction (`PredictionPipeline`)

mod pipeline;
mod regressor;
mod result;

pub use pipeline::PredictionPipeline;
pub use regressor::{ColourRegressor, ModelLoader, TARGET_COUNT};
pub use result::{PredictionResult, clamp_channel, to_hex};
