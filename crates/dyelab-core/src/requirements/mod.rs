//! Requirements domain module.
//!
//! # Module Structure
//!
//! - `record`: The mutable accumulator of gathered parameters (`RequirementsRecord`)
//! - `completeness`: Missing-field detection and next-question selection
//! - `complete`: Typed proof of completeness consumed by the prediction pipeline

mod complete;
mod completeness;
mod record;

pub use complete::CompleteRequirements;
pub use completeness::{CompletenessChecker, CompletenessResult};
pub use record::{MergeReport, RequirementsRecord};
