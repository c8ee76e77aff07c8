//! Plausibility classifier
//!
//! A bagged ensemble of binary decision trees over n-gram count features.
//! Each tree is grown on a bootstrap sample with Gini splits chosen from a
//! random feature subset per node. The ensemble probability is the mean of
//! the per-tree leaf positive-class fractions.
//!
//! Training is deterministic under a fixed random source.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Ensemble construction parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        ForestParams {
            n_trees: 100,
            max_depth: 8,
            min_samples_split: 2,
        }
    }
}

/// One node of a decision tree, indexed into [`DecisionTree::nodes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TreeNode {
    Leaf {
        prob: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A single trained decision tree. The root is node 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Positive-class fraction at the leaf this row lands in.
    fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { prob } => return *prob,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row.get(*feature).copied().unwrap_or(0.0) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Bagged decision-tree ensemble for binary classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BaggedForest {
    trees: Vec<DecisionTree>,
}

/// Gini impurity of a binary node with positive fraction `p`.
fn gini(p: f64) -> f64 {
    2.0 * p * (1.0 - p)
}

fn positive_fraction(labels: &[u8], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let positives = indices.iter().filter(|&&i| labels[i] == 1).count();
    positives as f64 / indices.len() as f64
}

/// Best split for one feature: candidate thresholds are midpoints between
/// consecutive distinct values. Returns `(threshold, weighted_child_gini)`.
fn best_split_for_feature(
    rows: &[Vec<f64>],
    labels: &[u8],
    indices: &[usize],
    feature: usize,
) -> Option<(f64, f64)> {
    let mut values: Vec<f64> = indices.iter().map(|&i| rows[i][feature]).collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    values.dedup();
    if values.len() < 2 {
        return None;
    }

    let total = indices.len() as f64;
    let mut best_gini = f64::INFINITY;
    let mut best_threshold = None;

    for pair in values.windows(2) {
        let threshold = (pair[0] + pair[1]) / 2.0;
        let left: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| rows[i][feature] <= threshold)
            .collect();
        let right: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| rows[i][feature] > threshold)
            .collect();
        if left.is_empty() || right.is_empty() {
            continue;
        }

        let weighted = (left.len() as f64 / total) * gini(positive_fraction(labels, &left))
            + (right.len() as f64 / total) * gini(positive_fraction(labels, &right));

        if weighted < best_gini {
            best_gini = weighted;
            best_threshold = Some(threshold);
        }
    }

    best_threshold.map(|t| (t, best_gini))
}

/// Recursively grow a subtree over `indices`; returns the new node's index.
fn grow(
    rows: &[Vec<f64>],
    labels: &[u8],
    indices: &[usize],
    depth: usize,
    params: &ForestParams,
    rng: &mut StdRng,
    nodes: &mut Vec<TreeNode>,
) -> usize {
    let prob = positive_fraction(labels, indices);
    let node_index = nodes.len();
    nodes.push(TreeNode::Leaf { prob });

    if depth >= params.max_depth
        || indices.len() < params.min_samples_split
        || prob == 0.0
        || prob == 1.0
    {
        return node_index;
    }

    let n_features = rows.first().map_or(0, Vec::len);
    if n_features == 0 {
        return node_index;
    }

    // Random-subspace selection: sqrt(d) candidate features per node.
    let subset = ((n_features as f64).sqrt().round() as usize).clamp(1, n_features);
    let parent_gini = gini(prob);
    let mut best_gini = f64::INFINITY;
    let mut best_split = None;

    for feature in sample(rng, n_features, subset) {
        if let Some((threshold, weighted)) = best_split_for_feature(rows, labels, indices, feature)
        {
            if weighted < best_gini {
                best_gini = weighted;
                best_split = Some((feature, threshold));
            }
        }
    }

    let Some((feature, threshold)) = best_split else {
        return node_index;
    };
    if parent_gini - best_gini <= 1e-12 {
        // No impurity reduction: stay a leaf.
        return node_index;
    }

    let left_indices: Vec<usize> = indices
        .iter()
        .copied()
        .filter(|&i| rows[i][feature] <= threshold)
        .collect();
    let right_indices: Vec<usize> = indices
        .iter()
        .copied()
        .filter(|&i| rows[i][feature] > threshold)
        .collect();

    let left = grow(rows, labels, &left_indices, depth + 1, params, rng, nodes);
    let right = grow(rows, labels, &right_indices, depth + 1, params, rng, nodes);
    nodes[node_index] = TreeNode::Split {
        feature,
        threshold,
        left,
        right,
    };
    node_index
}

impl BaggedForest {
    /// Train an ensemble on a row-major feature matrix and binary labels
    /// (1 = real identifier, 0 = decoy).
    pub fn train(
        rows: &[Vec<f64>],
        labels: &[u8],
        params: &ForestParams,
        rng: &mut StdRng,
    ) -> Self {
        assert_eq!(rows.len(), labels.len(), "rows and labels must align");
        let n = rows.len();

        let trees = (0..params.n_trees)
            .map(|_| {
                // Bootstrap sample: n draws with replacement.
                let indices: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
                let mut nodes = Vec::new();
                grow(rows, labels, &indices, 0, params, rng, &mut nodes);
                DecisionTree { nodes }
            })
            .collect();

        BaggedForest { trees }
    }

    /// P(row belongs to the positive class), the mean over all trees.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        sum / self.trees.len() as f64
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
