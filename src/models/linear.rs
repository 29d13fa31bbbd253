//! Penalized linear models on standardized features.
//!
//! Both models own the scaler fitted on their training data, so any later
//! `predict` call (scenario tables included) is scaled the same way.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::math::{StandardScaler, solve_ridge};
use crate::models::ensemble::check_shapes;

pub const RIDGE_ALPHA: f64 = 1.0;
pub const ELASTIC_NET_ALPHA: f64 = 0.1;
pub const ELASTIC_NET_L1_RATIO: f64 = 0.5;
pub const ELASTIC_NET_MAX_ITER: usize = 1000;
pub const ELASTIC_NET_TOL: f64 = 1e-4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RidgeRegression {
    pub alpha: f64,
    scaler: StandardScaler,
    coef: Vec<f64>,
    intercept: f64,
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self {
            alpha: RIDGE_ALPHA,
            scaler: StandardScaler::default(),
            coef: Vec::new(),
            intercept: 0.0,
        }
    }
}

impl RidgeRegression {
    pub fn fit(&mut self, x: &DMatrix<f64>, y: &[f64]) -> Result<(), AppError> {
        check_shapes(x, y)?;
        self.scaler = StandardScaler::fit(x);
        let z = self.scaler.transform(x);

        // Standardized columns are centered, so the intercept is the target mean.
        let y_mean = y.iter().sum::<f64>() / y.len() as f64;
        let centered = DVector::from_iterator(y.len(), y.iter().map(|v| v - y_mean));

        let beta = solve_ridge(&z, &centered, self.alpha)
            .ok_or_else(|| AppError::model("Ridge system could not be solved."))?;
        self.coef = beta.iter().copied().collect();
        self.intercept = y_mean;
        Ok(())
    }

    pub fn predict(&self, x: &DMatrix<f64>) -> Vec<f64> {
        linear_predict(&self.scaler, &self.coef, self.intercept, x)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coef
    }

    pub fn feature_importance(&self) -> Vec<f64> {
        self.coef.iter().map(|c| c.abs()).collect()
    }
}

/// Elastic net minimizing
/// `1/(2n)·||y − Xw||² + α·ρ·||w||₁ + α·(1 − ρ)/2·||w||²`
/// by cyclic coordinate descent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticNet {
    pub alpha: f64,
    pub l1_ratio: f64,
    pub max_iter: usize,
    pub tol: f64,
    scaler: StandardScaler,
    coef: Vec<f64>,
    intercept: f64,
    /// Sweeps used by the last fit.
    pub n_iter: usize,
}

impl Default for ElasticNet {
    fn default() -> Self {
        Self {
            alpha: ELASTIC_NET_ALPHA,
            l1_ratio: ELASTIC_NET_L1_RATIO,
            max_iter: ELASTIC_NET_MAX_ITER,
            tol: ELASTIC_NET_TOL,
            scaler: StandardScaler::default(),
            coef: Vec::new(),
            intercept: 0.0,
            n_iter: 0,
        }
    }
}

impl ElasticNet {
    pub fn fit(&mut self, x: &DMatrix<f64>, y: &[f64]) -> Result<(), AppError> {
        check_shapes(x, y)?;
        self.scaler = StandardScaler::fit(x);
        let z = self.scaler.transform(x);
        let (n, p) = z.shape();
        let nf = n as f64;

        let y_mean = y.iter().sum::<f64>() / nf;
        let mut residual: Vec<f64> = y.iter().map(|v| v - y_mean).collect();
        let mut w = vec![0.0; p];

        let l1 = self.alpha * self.l1_ratio * nf;
        let l2 = self.alpha * (1.0 - self.l1_ratio) * nf;
        let col_norms: Vec<f64> = z.column_iter().map(|c| c.norm_squared()).collect();

        self.n_iter = 0;
        for sweep in 1..=self.max_iter {
            self.n_iter = sweep;
            let mut max_change: f64 = 0.0;
            let mut max_w: f64 = 0.0;

            for j in 0..p {
                if col_norms[j] == 0.0 {
                    continue;
                }
                let old = w[j];
                let col = z.column(j);
                let rho: f64 = col
                    .iter()
                    .zip(&residual)
                    .map(|(xij, r)| xij * (r + xij * old))
                    .sum();
                let new = soft_threshold(rho, l1) / (col_norms[j] + l2);
                if new != old {
                    let delta = new - old;
                    for (r, xij) in residual.iter_mut().zip(col.iter()) {
                        *r -= xij * delta;
                    }
                    w[j] = new;
                }
                max_change = max_change.max((new - old).abs());
                max_w = max_w.max(new.abs());
            }

            if max_w == 0.0 || max_change / max_w < self.tol {
                break;
            }
        }

        if w.iter().any(|v| !v.is_finite()) {
            return Err(AppError::model("Elastic net diverged."));
        }
        self.coef = w;
        self.intercept = y_mean;
        Ok(())
    }

    pub fn predict(&self, x: &DMatrix<f64>) -> Vec<f64> {
        linear_predict(&self.scaler, &self.coef, self.intercept, x)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coef
    }

    pub fn feature_importance(&self) -> Vec<f64> {
        self.coef.iter().map(|c| c.abs()).collect()
    }
}

fn soft_threshold(v: f64, lambda: f64) -> f64 {
    if v > lambda {
        v - lambda
    } else if v < -lambda {
        v + lambda
    } else {
        0.0
    }
}

fn linear_predict(scaler: &StandardScaler, coef: &[f64], intercept: f64, x: &DMatrix<f64>) -> Vec<f64> {
    if coef.is_empty() {
        return vec![intercept; x.nrows()];
    }
    let z = scaler.transform(x);
    let w = DVector::from_row_slice(coef);
    (z * w).iter().map(|v| v + intercept).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> (DMatrix<f64>, Vec<f64>) {
        // y = 3·x0 − 2·x1 + 10; x2 constant.
        let x = DMatrix::from_fn(12, 3, |i, j| match j {
            0 => i as f64,
            1 => ((i * 5) % 7) as f64,
            _ => 2.0,
        });
        let y: Vec<f64> = (0..12)
            .map(|i| 3.0 * i as f64 - 2.0 * ((i * 5) % 7) as f64 + 10.0)
            .collect();
        (x, y)
    }

    #[test]
    fn ridge_is_close_to_ols_with_small_penalty() {
        let (x, y) = data();
        let mut ridge = RidgeRegression {
            alpha: 1e-8,
            ..Default::default()
        };
        ridge.fit(&x, &y).unwrap();
        let pred = ridge.predict(&x);
        for (p, a) in pred.iter().zip(&y) {
            assert!((p - a).abs() < 1e-5);
        }
        assert!(ridge.coefficients()[2].abs() < 1e-9);
    }

    #[test]
    fn ridge_penalty_shrinks_coefficients() {
        let (x, y) = data();
        let mut loose = RidgeRegression {
            alpha: 1e-8,
            ..Default::default()
        };
        let mut tight = RidgeRegression {
            alpha: 100.0,
            ..Default::default()
        };
        loose.fit(&x, &y).unwrap();
        tight.fit(&x, &y).unwrap();
        assert!(tight.coefficients()[0].abs() < loose.coefficients()[0].abs());
    }

    #[test]
    fn ridge_predicts_mean_for_unseen_mean_row() {
        let (x, y) = data();
        let mut ridge = RidgeRegression::default();
        ridge.fit(&x, &y).unwrap();
        let means: Vec<f64> = x.column_iter().map(|c| c.mean()).collect();
        let at_means = DMatrix::from_row_slice(1, 3, &means);
        let y_mean = y.iter().sum::<f64>() / y.len() as f64;
        assert!((ridge.predict(&at_means)[0] - y_mean).abs() < 1e-9);
    }

    #[test]
    fn elastic_net_recovers_signs_and_converges() {
        let (x, y) = data();
        let mut enet = ElasticNet::default();
        enet.fit(&x, &y).unwrap();
        let c = enet.coefficients();
        assert!(c[0] > 0.0);
        assert!(c[1] < 0.0);
        assert_eq!(c[2], 0.0);
        assert!(enet.n_iter < ELASTIC_NET_MAX_ITER);
    }

    #[test]
    fn elastic_net_large_penalty_zeroes_everything() {
        let (x, y) = data();
        let mut enet = ElasticNet {
            alpha: 1e6,
            ..Default::default()
        };
        enet.fit(&x, &y).unwrap();
        assert!(enet.coefficients().iter().all(|c| *c == 0.0));
        let y_mean = y.iter().sum::<f64>() / y.len() as f64;
        assert!(enet.predict(&x).iter().all(|p| (*p - y_mean).abs() < 1e-12));
    }

    #[test]
    fn soft_threshold_shrinks_toward_zero() {
        assert_eq!(soft_threshold(3.0, 1.0), 2.0);
        assert_eq!(soft_threshold(-3.0, 1.0), -2.0);
        assert_eq!(soft_threshold(0.5, 1.0), 0.0);
    }
}
