//! Ridge regression (L2 regularisation).
//!
//! Minimises ||y - Xβ - b||² + α||β||² on standardised features, solving the
//! normal equations (XᵀX + αI)β = Xᵀy by Cholesky decomposition. Coefficients
//! are mapped back to raw feature space and the intercept recovered from the
//! means. `alpha` therefore acts on the standardised scale, not on raw
//! feature units.

use ndarray::{Array1, Array2, Axis};

use crate::domain::model::{ModelError, Regressor};

/// Standard deviations below this are treated as constant columns.
const MIN_STD: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct RidgeRegression {
    alpha: f64,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            coefficients: None,
            intercept: 0.0,
        }
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Regressor for RidgeRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        if !(self.alpha >= 0.0) {
            return Err(ModelError::InvalidAlpha(self.alpha));
        }
        if x.nrows() == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if x.nrows() != y.len() {
            return Err(ModelError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }

        let x_mean = x.mean_axis(Axis(0)).ok_or(ModelError::EmptyTrainingSet)?;
        let y_mean = y.mean().ok_or(ModelError::EmptyTrainingSet)?;
        let x_std = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s < MIN_STD { 1.0 } else { s });

        let x_scaled = (x - &x_mean) / &x_std;
        let y_centered = y - y_mean;

        let mut gram = x_scaled.t().dot(&x_scaled);
        for i in 0..gram.nrows() {
            gram[[i, i]] += self.alpha;
        }
        let rhs = x_scaled.t().dot(&y_centered);

        let scaled_coef = cholesky_solve(&gram, &rhs)?;
        let coefficients = &scaled_coef / &x_std;

        self.intercept = y_mean - x_mean.dot(&coefficients);
        self.coefficients = Some(coefficients);
        Ok(())
    }

    fn predict_one(&self, row: &[f64]) -> Result<f64, ModelError> {
        let coef = self.coefficients.as_ref().ok_or(ModelError::NotFitted)?;
        if row.len() != coef.len() {
            return Err(ModelError::DimensionMismatch {
                expected: coef.len(),
                got: row.len(),
            });
        }
        let value = self.intercept + row.iter().zip(coef.iter()).map(|(x, b)| x * b).sum::<f64>();
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ModelError::NonFinite)
        }
    }
}

/// Solve `a · x = b` for symmetric positive definite `a`.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, ModelError> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if !(diag > 0.0) {
                    return Err(ModelError::NotPositiveDefinite);
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * z[j];
        }
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // Lᵀ x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (z[i] - sum) / l[[i, i]];
    }
    Ok(x)
}
