use dyelab_core::FEATURE_COUNT;
use dyelab_core::prediction::{ColourRegressor, TARGET_COUNT};

/// `y[t] = intercepts[t] + Σ coefficients[t][f] · x[f]`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegressor {
    coefficients: [[f64; FEATURE_COUNT]; TARGET_COUNT],
    intercepts: [f64; TARGET_COUNT],
}

impl LinearRegressor {
    pub fn new(
        coefficients: [[f64; FEATURE_COUNT]; TARGET_COUNT],
        intercepts: [f64; TARGET_COUNT],
    ) -> Self {
        Self {
            coefficients,
            intercepts,
        }
    }
}

impl ColourRegressor for LinearRegressor {
    fn kind(&self) -> &str {
        "linear"
    }

    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> [f64; TARGET_COUNT] {
        std::array::from_fn(|target| {
            self.coefficients[target]
                .iter()
                .zip(features)
                .fold(self.intercepts[target], |acc, (c, x)| acc + c * x)
        })
    }
}
