use serde::{Deserialize, Serialize};

use super::regressor::TARGET_COUNT;

/// Outcome of one prediction.
///
/// On success `R`, `G`, `B` and `hex` are present; on failure only `error`
/// is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub success: bool,
    #[serde(rename = "R", default, skip_serializing_if = "Option::is_none")]
    pub r: Option<u8>,
    #[serde(rename = "G", default, skip_serializing_if = "Option::is_none")]
    pub g: Option<u8>,
    #[serde(rename = "B", default, skip_serializing_if = "Option::is_none")]
    pub b: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictionResult {
    pub fn success([r, g, b]: [u8; TARGET_COUNT]) -> Self {
        Self {
            success: true,
            r: Some(r),
            g: Some(g),
            b: Some(b),
            hex: Some(to_hex([r, g, b])),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            r: None,
            g: None,
            b: None,
            hex: None,
            error: Some(error.into()),
        }
    }

    pub fn rgb(&self) -> Option<[u8; TARGET_COUNT]> {
        Some([self.r?, self.g?, self.b?])
    }
}

/// Truncates toward zero and clamps to a colour channel.
///
/// Callers must reject non-finite values first.
pub fn clamp_channel(raw: f64) -> u8 {
    raw.trunc().clamp(0.0, 255.0) as u8
}

/// Lowercase `#rrggbb`.
pub fn to_hex([r, g, b]: [u8; TARGET_COUNT]) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}
