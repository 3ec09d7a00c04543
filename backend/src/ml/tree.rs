//! CART regression tree builder
//!
//! Greedy variance-reduction splits over a random subset of features per
//! node. Nodes live in a flat arena; children are referenced by index.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::ModelIntegrityError;

/// How many features are examined at each split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    All,
    Sqrt,
    Fraction(f64),
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = match *self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::Fraction(f) => (n_features as f64 * f).floor() as usize,
        };
        n.clamp(1, n_features.max(1))
    }
}

/// Training parameters for a single tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// `None` grows until the stopping rule below applies
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
        }
    }
}

/// A tree node; leaves carry a value, internal nodes a split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub feature_index: u32,
    pub threshold: f64,
    pub left: u32,
    pub right: u32,
    pub value: Option<f64>,
}

impl Node {
    fn leaf(value: f64) -> Self {
        Self {
            feature_index: 0,
            threshold: 0.0,
            left: 0,
            right: 0,
            value: Some(value),
        }
    }
}

/// A fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<Node>,
}

impl RegressionTree {
    /// Walk from the root to a leaf. Rows go left when `x[feature] <= threshold`.
    pub fn predict_one(&self, x: &[f64]) -> f64 {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            if let Some(value) = node.value {
                return value;
            }
            idx = if x[node.feature_index as usize] <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
    }

    /// Check that every walk from the root ends at a finite leaf.
    ///
    /// Children always sit after their parent in the arena, so requiring
    /// `node < child < len` rules out both dangling indices and cycles.
    pub fn validate(&self, tree: usize, n_features: usize) -> Result<(), ModelIntegrityError> {
        if self.nodes.is_empty() {
            return Err(ModelIntegrityError::EmptyTree { tree });
        }

        let len = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            if let Some(value) = node.value {
                if !value.is_finite() {
                    return Err(ModelIntegrityError::NonFiniteValue { tree, node: idx });
                }
                continue;
            }

            for child in [node.left as usize, node.right as usize] {
                if child <= idx || child >= len {
                    return Err(ModelIntegrityError::InvalidChild {
                        tree,
                        node: idx,
                        child,
                        len,
                    });
                }
            }
            if node.feature_index as usize >= n_features {
                return Err(ModelIntegrityError::InvalidFeature {
                    tree,
                    node: idx,
                    feature: node.feature_index as usize,
                    n_features,
                });
            }
            if !node.threshold.is_finite() {
                return Err(ModelIntegrityError::NonFiniteValue { tree, node: idx });
            }
        }
        Ok(())
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.value.is_some()).count()
    }

    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            let node = &self.nodes[idx];
            if node.value.is_some() {
                max_depth = max_depth.max(depth);
            } else {
                stack.push((node.left as usize, depth + 1));
                stack.push((node.right as usize, depth + 1));
            }
        }
        max_depth
    }
}

/// Chosen split of a node
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    score: f64,
}

/// Pending node on the build stack
struct Pending {
    node_idx: usize,
    indices: Vec<usize>,
    depth: usize,
}

/// Builds one regression tree from (possibly repeated) row indices
pub struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    params: TreeParams,
    n_features: usize,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(x: &'a [Vec<f64>], y: &'a [f64], params: TreeParams) -> Self {
        assert_eq!(x.len(), y.len());
        let n_features = x.first().map(Vec::len).unwrap_or(0);
        Self {
            x,
            y,
            params,
            n_features,
        }
    }

    /// Build a tree over `indices`, drawing feature subsets from `rng`
    pub fn build(&self, indices: Vec<usize>, rng: &mut ChaCha8Rng) -> RegressionTree {
        let mut nodes = vec![Node::leaf(0.0)];
        let mut stack = vec![Pending {
            node_idx: 0,
            indices,
            depth: 0,
        }];

        while let Some(Pending {
            node_idx,
            indices,
            depth,
        }) = stack.pop()
        {
            let leaf_value = self.mean_target(&indices);

            if !self.can_split(&indices, depth) {
                nodes[node_idx] = Node::leaf(leaf_value);
                continue;
            }

            let split = match self.find_best_split(&indices, rng) {
                Some(s) => s,
                None => {
                    nodes[node_idx] = Node::leaf(leaf_value);
                    continue;
                }
            };

            let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| self.x[i][split.feature_idx] <= split.threshold);

            let left_idx = nodes.len();
            nodes.push(Node::leaf(0.0));
            let right_idx = nodes.len();
            nodes.push(Node::leaf(0.0));

            nodes[node_idx] = Node {
                feature_index: split.feature_idx as u32,
                threshold: split.threshold,
                left: left_idx as u32,
                right: right_idx as u32,
                value: None,
            };

            stack.push(Pending {
                node_idx: right_idx,
                indices: right_indices,
                depth: depth + 1,
            });
            stack.push(Pending {
                node_idx: left_idx,
                indices: left_indices,
                depth: depth + 1,
            });
        }

        RegressionTree { nodes }
    }

    fn can_split(&self, indices: &[usize], depth: usize) -> bool {
        if let Some(max_depth) = self.params.max_depth {
            if depth >= max_depth {
                return false;
            }
        }
        if indices.len() < self.params.min_samples_split.max(2)
            || indices.len() < 2 * self.params.min_samples_leaf
            || self.n_features == 0
        {
            return false;
        }
        // Pure node
        let first = self.y[indices[0]];
        indices.iter().any(|&i| self.y[i] != first)
    }

    fn mean_target(&self, indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        indices.iter().map(|&i| self.y[i]).sum::<f64>() / indices.len() as f64
    }

    /// Sample `max_features` distinct features, returned in ascending order
    fn sample_features(&self, rng: &mut ChaCha8Rng) -> Vec<usize> {
        let k = self.params.max_features.resolve(self.n_features);
        let mut features: Vec<usize> = (0..self.n_features).collect();
        if k < self.n_features {
            // Partial Fisher-Yates shuffle
            for i in 0..k {
                let j = rng.gen_range(i..self.n_features);
                features.swap(i, j);
            }
            features.truncate(k);
            features.sort_unstable();
        }
        features
    }

    /// Exact-greedy search maximizing `S_l^2/n_l + S_r^2/n_r`, which is
    /// equivalent to minimizing the summed squared error of both children.
    ///
    /// Ties keep the first candidate in (feature, threshold) order.
    fn find_best_split(&self, indices: &[usize], rng: &mut ChaCha8Rng) -> Option<SplitCandidate> {
        let min_leaf = self.params.min_samples_leaf.max(1);
        let n = indices.len();
        let total: f64 = indices.iter().map(|&i| self.y[i]).sum();

        let mut best: Option<SplitCandidate> = None;
        let mut column: Vec<(f64, f64)> = Vec::with_capacity(n);

        for feature_idx in self.sample_features(rng) {
            column.clear();
            column.extend(indices.iter().map(|&i| (self.x[i][feature_idx], self.y[i])));
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            for pos in 0..n - 1 {
                left_sum += column[pos].1;
                let n_left = pos + 1;
                let n_right = n - n_left;

                let (value, next_value) = (column[pos].0, column[pos + 1].0);
                if value == next_value || n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let right_sum = total - left_sum;
                let score =
                    left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64;

                let is_better = match best {
                    None => true,
                    Some(ref current) => score > current.score,
                };
                if is_better {
                    let mut threshold = value + (next_value - value) / 2.0;
                    // Midpoint can round up to the right value for adjacent floats
                    if threshold >= next_value {
                        threshold = value;
                    }
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        score,
                    });
                }
            }
        }

        best
    }
}
