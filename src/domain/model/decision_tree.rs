//! Regression tree with variance-reduction splits.

use ndarray::{Array1, Array2};

use crate::domain::model::ModelError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeConfig {
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

#[derive(Debug, Clone)]
pub struct RegressionTree {
    config: TreeConfig,
    root: Option<TreeNode>,
    n_features: usize,
}

struct Split {
    feature: usize,
    threshold: f64,
    /// Sorted position at which the right partition starts.
    cut: usize,
    order: Vec<usize>,
}

impl RegressionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            n_features: 0,
        }
    }

    /// Fit on the rows named by `samples` (repeats allowed, as in a bootstrap).
    pub fn fit_samples(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        samples: &[usize],
    ) -> Result<(), ModelError> {
        if samples.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if x.nrows() != y.len() {
            return Err(ModelError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }
        self.n_features = x.ncols();
        self.root = Some(self.build(x, y, samples.to_vec(), 0));
        Ok(())
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        let all: Vec<usize> = (0..x.nrows()).collect();
        self.fit_samples(x, y, &all)
    }

    pub fn predict_one(&self, row: &[f64]) -> Result<f64, ModelError> {
        let mut node = self.root.as_ref().ok_or(ModelError::NotFitted)?;
        if row.len() != self.n_features {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features,
                got: row.len(),
            });
        }
        loop {
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        self.root.as_ref().map_or(0, walk)
    }

    fn build(&self, x: &Array2<f64>, y: &Array1<f64>, samples: Vec<usize>, depth: usize) -> TreeNode {
        let n = samples.len();
        let sum: f64 = samples.iter().map(|&i| y[i]).sum();
        let mean = sum / n as f64;

        let depth_reached = self.config.max_depth.is_some_and(|d| depth >= d);
        if depth_reached || n < self.config.min_samples_split || n < 2 * self.config.min_samples_leaf {
            return TreeNode::Leaf { value: mean };
        }

        let sum_sq: f64 = samples.iter().map(|&i| y[i] * y[i]).sum();
        let parent_sse = sum_sq - sum * sum / n as f64;
        if parent_sse <= 1e-12 * sum_sq.max(1.0) {
            return TreeNode::Leaf { value: mean };
        }

        match self.best_split(x, y, &samples, parent_sse) {
            Some(split) => {
                let left: Vec<usize> = split.order[..split.cut].to_vec();
                let right: Vec<usize> = split.order[split.cut..].to_vec();
                TreeNode::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    left: Box::new(self.build(x, y, left, depth + 1)),
                    right: Box::new(self.build(x, y, right, depth + 1)),
                }
            }
            None => TreeNode::Leaf { value: mean },
        }
    }

    /// Scan every feature in sorted order with running sums; the split with
    /// the lowest combined SSE wins, earlier features winning ties.
    fn best_split(&self, x: &Array2<f64>, y: &Array1<f64>, samples: &[usize], parent_sse: f64) -> Option<Split> {
        let n = samples.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let mut best: Option<(f64, Split)> = None;

        for feature in 0..x.ncols() {
            let mut order = samples.to_vec();
            order.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

            let total: f64 = order.iter().map(|&i| y[i]).sum();
            let total_sq: f64 = order.iter().map(|&i| y[i] * y[i]).sum();
            let (mut left_sum, mut left_sq) = (0.0, 0.0);
            let mut feature_best: Option<(f64, usize)> = None;

            for cut in 1..n {
                let yi = y[order[cut - 1]];
                left_sum += yi;
                left_sq += yi * yi;

                if cut < min_leaf || n - cut < min_leaf {
                    continue;
                }
                if x[[order[cut - 1], feature]] == x[[order[cut], feature]] {
                    continue;
                }
                let nl = cut as f64;
                let nr = (n - cut) as f64;
                let right_sum = total - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / nl) + (right_sq - right_sum * right_sum / nr);
                if feature_best.is_none_or(|(b, _)| sse < b) {
                    feature_best = Some((sse, cut));
                }
            }

            if let Some((sse, cut)) = feature_best {
                let better = match &best {
                    None => sse < parent_sse,
                    Some((b, _)) => sse < *b,
                };
                if better {
                    let threshold = (x[[order[cut - 1], feature]] + x[[order[cut], feature]]) / 2.0;
                    best = Some((
                        sse,
                        Split {
                            feature,
                            threshold,
                            cut,
                            order,
                        },
                    ));
                }
            }
        }
        best.map(|(_, split)| split)
    }
}
