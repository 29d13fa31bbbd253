//! Tree ensembles: bagged random forest and squared-loss gradient boosting.

use nalgebra::DMatrix;
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::tree::RegressionTree;

pub const DEFAULT_TREES: usize = 100;
pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_trees: usize,
    pub max_depth: usize,
    pub seed: u64,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn new(seed: u64) -> Self {
        Self {
            n_trees: DEFAULT_TREES,
            max_depth: DEFAULT_MAX_DEPTH,
            seed,
            trees: Vec::new(),
        }
    }

    pub fn fit(&mut self, x: &DMatrix<f64>, y: &[f64]) -> Result<(), AppError> {
        check_shapes(x, y)?;
        let n = x.nrows();
        let max_depth = self.max_depth;
        let seed = self.seed;

        // One RNG stream per tree keeps the result independent of thread scheduling.
        self.trees = (0..self.n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                let rows: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let mut tree = RegressionTree::new(max_depth);
                tree.fit_rows(x, y, &rows);
                tree
            })
            .collect();
        Ok(())
    }

    pub fn predict(&self, x: &DMatrix<f64>) -> Vec<f64> {
        if self.trees.is_empty() {
            return vec![0.0; x.nrows()];
        }
        let k = self.trees.len() as f64;
        (0..x.nrows())
            .map(|i| self.trees.iter().map(|t| t.predict_row(x, i)).sum::<f64>() / k)
            .collect()
    }

    pub fn feature_importance(&self) -> Vec<f64> {
        average_importance(&self.trees)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoosting {
    pub n_stages: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    init: f64,
    stages: Vec<RegressionTree>,
}

impl Default for GradientBoosting {
    fn default() -> Self {
        Self {
            n_stages: DEFAULT_TREES,
            learning_rate: DEFAULT_LEARNING_RATE,
            max_depth: DEFAULT_MAX_DEPTH,
            init: 0.0,
            stages: Vec::new(),
        }
    }
}

impl GradientBoosting {
    pub fn fit(&mut self, x: &DMatrix<f64>, y: &[f64]) -> Result<(), AppError> {
        check_shapes(x, y)?;
        self.init = y.iter().sum::<f64>() / y.len() as f64;
        self.stages = Vec::with_capacity(self.n_stages);

        let mut current = vec![self.init; y.len()];
        for _ in 0..self.n_stages {
            let residuals: Vec<f64> = y.iter().zip(&current).map(|(a, p)| a - p).collect();
            let mut tree = RegressionTree::new(self.max_depth);
            tree.fit(x, &residuals);
            for (i, p) in current.iter_mut().enumerate() {
                *p += self.learning_rate * tree.predict_row(x, i);
            }
            self.stages.push(tree);
        }
        Ok(())
    }

    pub fn predict(&self, x: &DMatrix<f64>) -> Vec<f64> {
        (0..x.nrows())
            .map(|i| {
                self.init
                    + self
                        .stages
                        .iter()
                        .map(|t| self.learning_rate * t.predict_row(x, i))
                        .sum::<f64>()
            })
            .collect()
    }

    pub fn feature_importance(&self) -> Vec<f64> {
        average_importance(&self.stages)
    }
}

pub(crate) fn check_shapes(x: &DMatrix<f64>, y: &[f64]) -> Result<(), AppError> {
    if x.nrows() == 0 {
        return Err(AppError::model("Cannot fit a model on zero rows."));
    }
    if x.nrows() != y.len() {
        return Err(AppError::model(format!(
            "Design matrix has {} rows but target has {} values.",
            x.nrows(),
            y.len()
        )));
    }
    Ok(())
}

/// Mean of per-tree normalized importances, renormalized to sum to 1.
fn average_importance(trees: &[RegressionTree]) -> Vec<f64> {
    let Some(first) = trees.first() else {
        return Vec::new();
    };
    let mut acc = vec![0.0; first.feature_importance().len()];
    let mut contributing = 0usize;
    for tree in trees {
        let imp = tree.feature_importance();
        if imp.iter().all(|v| *v == 0.0) {
            continue;
        }
        contributing += 1;
        for (a, v) in acc.iter_mut().zip(imp) {
            *a += v;
        }
    }
    if contributing == 0 {
        return acc;
    }
    let total: f64 = acc.iter().sum();
    acc.iter().map(|v| v / total).collect()
}
