//! Common interface over the four regressor families.
//!
//! Fitting and selection code only sees [`Regressor`]; the concrete type is
//! chosen once from a [`ModelKind`] and carried as a serializable [`Model`].

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::domain::ModelKind;
use crate::error::AppError;
use crate::models::ensemble::{GradientBoosting, RandomForest};
use crate::models::linear::{ElasticNet, RidgeRegression};

pub trait Regressor {
    fn fit(&mut self, x: &DMatrix<f64>, y: &[f64]) -> Result<(), AppError>;
    fn predict(&self, x: &DMatrix<f64>) -> Vec<f64>;
    /// One non-negative weight per input column.
    fn feature_importance(&self) -> Vec<f64>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    RandomForest(RandomForest),
    GradientBoosting(GradientBoosting),
    Ridge(RidgeRegression),
    ElasticNet(ElasticNet),
}

impl Model {
    /// Unfitted model with the default hyper-parameters for `kind`.
    pub fn new(kind: ModelKind, seed: u64) -> Self {
        match kind {
            ModelKind::RandomForest => Model::RandomForest(RandomForest::new(seed)),
            ModelKind::GradientBoosting => Model::GradientBoosting(GradientBoosting::default()),
            ModelKind::Ridge => Model::Ridge(RidgeRegression::default()),
            ModelKind::ElasticNet => Model::ElasticNet(ElasticNet::default()),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Model::RandomForest(_) => ModelKind::RandomForest,
            Model::GradientBoosting(_) => ModelKind::GradientBoosting,
            Model::Ridge(_) => ModelKind::Ridge,
            Model::ElasticNet(_) => ModelKind::ElasticNet,
        }
    }
}

impl Regressor for Model {
    fn fit(&mut self, x: &DMatrix<f64>, y: &[f64]) -> Result<(), AppError> {
        match self {
            Model::RandomForest(m) => m.fit(x, y),
            Model::GradientBoosting(m) => m.fit(x, y),
            Model::Ridge(m) => m.fit(x, y),
            Model::ElasticNet(m) => m.fit(x, y),
        }
    }

    fn predict(&self, x: &DMatrix<f64>) -> Vec<f64> {
        match self {
            Model::RandomForest(m) => m.predict(x),
            Model::GradientBoosting(m) => m.predict(x),
            Model::Ridge(m) => m.predict(x),
            Model::ElasticNet(m) => m.predict(x),
        }
    }

    fn feature_importance(&self) -> Vec<f64> {
        match self {
            Model::RandomForest(m) => m.feature_importance(),
            Model::GradientBoosting(m) => m.feature_importance(),
            Model::Ridge(m) => m.feature_importance(),
            Model::ElasticNet(m) => m.feature_importance(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_fits_and_predicts() {
        let x = DMatrix::from_fn(8, 2, |i, j| (i + j) as f64 * if j == 0 { 1.0 } else { 0.5 });
        let y: Vec<f64> = (0..8).map(|i| i as f64).collect();
        for kind in ModelKind::ALL {
            let mut model = Model::new(kind, 42);
            assert_eq!(model.kind(), kind);
            model.fit(&x, &y).unwrap();
            let pred = model.predict(&x);
            assert_eq!(pred.len(), 8);
            assert!(pred.iter().all(|p| p.is_finite()), "{kind:?}");
            assert_eq!(model.feature_importance().len(), 2);
        }
    }

    #[test]
    fn serialized_model_predicts_identically() {
        let x = DMatrix::from_fn(6, 1, |i, _| i as f64);
        let y = vec![1.0, 1.0, 1.0, 4.0, 4.0, 4.0];
        let mut model = Model::new(ModelKind::GradientBoosting, 0);
        model.fit(&x, &y).unwrap();

        let json = serde_json::to_string(&model).unwrap();
        assert!(json.contains("\"kind\":\"gradient_boosting\""));
        let back: Model = serde_json::from_str(&json).unwrap();
        for (a, b) in back.predict(&x).iter().zip(model.predict(&x)) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}
