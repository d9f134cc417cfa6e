//! Bagged ensemble of regression trees.

use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::domain::model::decision_tree::{RegressionTree, TreeConfig};
use crate::domain::model::{ModelError, Regressor};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub tree: TreeConfig,
    pub bootstrap: bool,
    /// Tree `i` draws its bootstrap sample from `seed + i`.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 200,
            tree: TreeConfig::default(),
            bootstrap: true,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn sample_indices(&self, tree: usize, n: usize) -> Vec<usize> {
        if !self.config.bootstrap {
            return (0..n).collect();
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(tree as u64));
        (0..n).map(|_| rng.gen_range(0..n)).collect()
    }
}

impl Regressor for RandomForest {
    /// Trees are built in parallel; each depends only on its own seed and
    /// `collect` keeps tree order, so the fitted forest matches a sequential build.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        let n = x.nrows();
        if n == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }

        let trees: Result<Vec<RegressionTree>, ModelError> = (0..self.config.n_trees)
            .into_par_iter()
            .map(|i| {
                let samples = self.sample_indices(i, n);
                let mut tree = RegressionTree::new(self.config.tree);
                tree.fit_samples(x, y, &samples)?;
                Ok(tree)
            })
            .collect();
        self.trees = trees?;

        debug!(trees = self.trees.len(), rows = n, "fitted random forest");
        Ok(())
    }

    fn predict_one(&self, row: &[f64]) -> Result<f64, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted);
        }
        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.predict_one(row)?;
        }
        let value = sum / self.trees.len() as f64;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ModelError::NonFinite)
        }
    }
}
