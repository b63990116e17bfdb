//! JSON model artifact.
//!
//! ```json
//! {
//!   "feature_names": ["dye_red_owf", "...", "soap_time_min"],
//!   "targets": ["R", "G", "B"],
//!   "model": { "type": "linear", "coefficients": [[...], [...], [...]], "intercepts": [0, 0, 0] }
//! }
//! ```
//!
//! Forests use the flattened tree arrays of scikit-learn exports: a node is a
//! leaf when `children_left[i] == -1`, a split sends `x[feature] <= threshold`
//! to the left child.

use std::sync::Arc;

use dyelab_core::FEATURE_COUNT;
use dyelab_core::ParameterField;
use dyelab_core::error::{DyelabError, Result};
use dyelab_core::prediction::{ColourRegressor, TARGET_COUNT};
use serde::{Deserialize, Serialize};

use super::forest::{DecisionTree, ForestRegressor, Node};
use super::linear::LinearRegressor;

pub const TARGET_NAMES: [&str; TARGET_COUNT] = ["R", "G", "B"];

const LEAF: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    pub targets: Vec<String>,
    pub model: ModelSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear {
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
    Forest {
        trees: Vec<TreeSpec>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSpec {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

/// Parses and validates an artifact into a ready regressor.
///
/// # Errors
///
/// Every problem is reported as `ModelUnavailable`.
pub fn parse_artifact(json: &str) -> Result<Arc<dyn ColourRegressor>> {
    let artifact: ModelArtifact = serde_json::from_str(json)
        .map_err(|e| DyelabError::model_unavailable(format!("invalid model JSON: {}", e)))?;
    artifact.into_regressor()
}

impl ModelArtifact {
    pub fn into_regressor(self) -> Result<Arc<dyn ColourRegressor>> {
        self.check_columns()?;
        match self.model {
            ModelSpec::Linear {
                coefficients,
                intercepts,
            } => Ok(Arc::new(build_linear(&coefficients, &intercepts)?)),
            ModelSpec::Forest { trees } => Ok(Arc::new(build_forest(&trees)?)),
        }
    }

    fn check_columns(&self) -> Result<()> {
        let expected: Vec<&str> = ParameterField::all().map(|f| f.name()).collect();
        if self.feature_names != expected {
            return Err(DyelabError::model_unavailable(format!(
                "feature names {:?} do not match the schema order {:?}",
                self.feature_names, expected
            )));
        }
        if self.targets != TARGET_NAMES {
            return Err(DyelabError::model_unavailable(format!(
                "expected targets {:?}, found {:?}",
                TARGET_NAMES, self.targets
            )));
        }
        Ok(())
    }
}

fn fixed<const N: usize>(values: &[f64], what: &str) -> Result<[f64; N]> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(DyelabError::model_unavailable(format!(
            "{} contains a non-finite value",
            what
        )));
    }
    values.try_into().map_err(|_| {
        DyelabError::model_unavailable(format!(
            "{} has {} values, expected {}",
            what,
            values.len(),
            N
        ))
    })
}

fn build_linear(coefficients: &[Vec<f64>], intercepts: &[f64]) -> Result<LinearRegressor> {
    if coefficients.len() != TARGET_COUNT {
        return Err(DyelabError::model_unavailable(format!(
            "expected {} coefficient rows, found {}",
            TARGET_COUNT,
            coefficients.len()
        )));
    }
    let mut rows = [[0.0; FEATURE_COUNT]; TARGET_COUNT];
    for (target, row) in coefficients.iter().enumerate() {
        rows[target] = fixed(row, &format!("coefficients[{}]", target))?;
    }
    Ok(LinearRegressor::new(rows, fixed(intercepts, "intercepts")?))
}

fn build_forest(trees: &[TreeSpec]) -> Result<ForestRegressor> {
    if trees.is_empty() {
        return Err(DyelabError::model_unavailable("forest has no trees"));
    }
    let trees = trees
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            build_tree(spec).map_err(|reason| {
                DyelabError::model_unavailable(format!("tree {}: {}", i, reason))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ForestRegressor::new(trees))
}

fn build_tree(spec: &TreeSpec) -> std::result::Result<DecisionTree, String> {
    let n = spec.children_left.len();
    if n == 0 {
        return Err("tree has no nodes".to_string());
    }
    let lengths = [
        spec.children_right.len(),
        spec.feature.len(),
        spec.threshold.len(),
        spec.value.len(),
    ];
    if lengths.iter().any(|&len| len != n) {
        return Err("node arrays have different lengths".to_string());
    }

    let child = |parent: usize, raw: i64| -> std::result::Result<usize, String> {
        usize::try_from(raw)
            .ok()
            .filter(|&c| c > parent && c < n)
            .ok_or_else(|| format!("node {} has invalid child {}", parent, raw))
    };

    let mut nodes = Vec::with_capacity(n);
    for i in 0..n {
        let node = if spec.children_left[i] == LEAF {
            if spec.children_right[i] != LEAF {
                return Err(format!("node {} has only one child", i));
            }
            let value = spec.value[i].as_slice();
            if value.len() != TARGET_COUNT || value.iter().any(|v| !v.is_finite()) {
                return Err(format!("leaf {} must hold {} finite values", i, TARGET_COUNT));
            }
            Node::Leaf([value[0], value[1], value[2]])
        } else {
            let feature = usize::try_from(spec.feature[i])
                .ok()
                .filter(|&f| f < FEATURE_COUNT)
                .ok_or_else(|| format!("node {} splits on unknown feature {}", i, spec.feature[i]))?;
            let threshold = spec.threshold[i];
            if !threshold.is_finite() {
                return Err(format!("node {} has a non-finite threshold", i));
            }
            Node::Split {
                feature,
                threshold,
                left: child(i, spec.children_left[i])?,
                right: child(i, spec.children_right[i])?,
            }
        };
        nodes.push(node);
    }
    Ok(DecisionTree::new(nodes))
}
