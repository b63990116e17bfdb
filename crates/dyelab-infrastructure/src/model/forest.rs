use dyelab_core::FEATURE_COUNT;
use dyelab_core::prediction::{ColourRegressor, TARGET_COUNT};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf([f64; TARGET_COUNT]),
}

/// A single regression tree in flattened form. Node 0 is the root.
///
/// Child indices always point past their parent, so traversal terminates.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    pub(crate) fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn predict(&self, features: &[f64; FEATURE_COUNT]) -> [f64; TARGET_COUNT] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Mean of the trees' outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestRegressor {
    trees: Vec<DecisionTree>,
}

impl ForestRegressor {
    /// `trees` must not be empty.
    pub(crate) fn new(trees: Vec<DecisionTree>) -> Self {
        Self { trees }
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl ColourRegressor for ForestRegressor {
    fn kind(&self) -> &str {
        "forest"
    }

    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> [f64; TARGET_COUNT] {
        let mut sum = [0.0; TARGET_COUNT];
        for tree in &self.trees {
            for (acc, v) in sum.iter_mut().zip(tree.predict(features)) {
                *acc += v;
            }
        }
        let n = self.trees.len() as f64;
        sum.map(|v| v / n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Splits on salt (column 3) at 60 g/L.
    fn salt_stump(low: f64, high: f64) -> DecisionTree {
        DecisionTree::new(vec![
            Node::Split {
                feature: 3,
                threshold: 60.0,
                left: 1,
                right: 2,
            },
            Node::Leaf([low; TARGET_COUNT]),
            Node::Leaf([high; TARGET_COUNT]),
        ])
    }

    #[test]
    fn test_split_goes_left_on_equal() {
        let tree = salt_stump(10.0, 20.0);
        let mut x = [0.0; FEATURE_COUNT];

        x[3] = 60.0;
        assert_eq!(tree.predict(&x), [10.0; TARGET_COUNT]);

        x[3] = 60.5;
        assert_eq!(tree.predict(&x), [20.0; TARGET_COUNT]);
    }

    #[test]
    fn test_forest_averages_trees() {
        let forest = ForestRegressor::new(vec![salt_stump(10.0, 20.0), salt_stump(30.0, 40.0)]);
        let mut x = [0.0; FEATURE_COUNT];
        x[3] = 50.0;

        assert_eq!(forest.predict(&x), [20.0; TARGET_COUNT]);
        assert_eq!(forest.tree_count(), 2);
    }
}
