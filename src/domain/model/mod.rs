//! Regression models used by the forecast engine.
//!
//! Models are ephemeral: fitted per forecast call on a fixed feature ordering
//! and dropped afterwards.

pub mod decision_tree;
pub mod random_forest;
pub mod ridge;

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::domain::error::StockcastError;
use crate::domain::model::random_forest::{ForestConfig, RandomForest};
use crate::domain::model::ridge::RidgeRegression;

pub const DEFAULT_RIDGE_ALPHA: f64 = 1.0;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ModelError {
    #[error("model has not been fitted yet")]
    NotFitted,

    #[error("empty training set")]
    EmptyTrainingSet,

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("invalid alpha value: {0}")]
    InvalidAlpha(f64),

    #[error("normal equations are not positive definite")]
    NotPositiveDefinite,

    #[error("non-finite prediction")]
    NonFinite,
}

impl From<ModelError> for StockcastError {
    fn from(err: ModelError) -> Self {
        StockcastError::ModelFailure {
            reason: err.to_string(),
        }
    }
}

/// A single-output regressor over dense feature rows.
pub trait Regressor: Send + Sync {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError>;

    fn predict_one(&self, row: &[f64]) -> Result<f64, ModelError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    #[default]
    Ridge,
    RandomForest,
}

impl ModelType {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelType::Ridge => "ridge",
            ModelType::RandomForest => "random_forest",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = StockcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ridge" => Ok(ModelType::Ridge),
            "random_forest" | "randomforest" | "rf" => Ok(ModelType::RandomForest),
            other => Err(StockcastError::invalid(format!(
                "unknown model type '{other}' (expected ridge or random_forest)"
            ))),
        }
    }
}

/// Normalised model parameters for one forecast call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelConfig {
    pub model_type: ModelType,
    /// Trailing bars used for training; `None` uses the whole series.
    pub window: Option<usize>,
    pub ridge_alpha: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_type: ModelType::Ridge,
            window: None,
            ridge_alpha: DEFAULT_RIDGE_ALPHA,
        }
    }
}

impl ModelConfig {
    pub fn build(&self) -> Box<dyn Regressor> {
        match self.model_type {
            ModelType::Ridge => Box::new(RidgeRegression::new(self.ridge_alpha)),
            ModelType::RandomForest => Box::new(RandomForest::new(ForestConfig::default())),
        }
    }
}
