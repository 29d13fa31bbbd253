//! Train every regressor family per target, score on held-out rows, keep the best.
//!
//! Selection rule: highest test R². Ties keep the model listed first.

use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{FitQuality, ModelKind, ScenarioPrediction, Target};
use crate::error::AppError;
use crate::features::{FeatureTable, all_scenarios};
use crate::fit::split::train_test_split;
use crate::math::stats::{mae, mse, r2};
use crate::models::{Model, Regressor};

/// Held-out score of one model family for one target.
#[derive(Debug, Clone)]
pub struct ModelScore {
    pub kind: ModelKind,
    pub quality: FitQuality,
    pub feature_importance: Vec<f64>,
}

/// Outcome of training all families for a single target.
#[derive(Debug, Clone)]
pub struct TargetFit {
    pub target: Target,
    pub scores: Vec<ModelScore>,
    pub best_kind: ModelKind,
    pub best: Model,
    pub test_states: Vec<String>,
    pub test_actual: Vec<f64>,
    pub test_predicted: Vec<f64>,
}

impl TargetFit {
    pub fn best_score(&self) -> Option<&ModelScore> {
        self.scores.iter().find(|s| s.kind == self.best_kind)
    }
}

#[derive(Debug, Clone)]
pub struct ModelSuite {
    pub seed: u64,
    pub targets: Vec<TargetFit>,
}

struct Trained {
    model: Model,
    score: ModelScore,
    predicted: Vec<f64>,
}

/// Train `kinds` on every target in `Target::ALL`.
pub fn train_suite(table: &FeatureTable, kinds: &[ModelKind], seed: u64) -> Result<ModelSuite, AppError> {
    let targets = Target::ALL
        .iter()
        .map(|&t| train_target(table, t, kinds, seed))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ModelSuite { seed, targets })
}

/// Train and score `kinds` for one target.
pub fn train_target(
    table: &FeatureTable,
    target: Target,
    kinds: &[ModelKind],
    seed: u64,
) -> Result<TargetFit, AppError> {
    if table.is_empty() {
        return Err(AppError::data("Feature table is empty; nothing to train on."));
    }
    if kinds.is_empty() {
        return Err(AppError::model("No model families selected."));
    }

    let x = table.design_matrix();
    let y = table.target(target);
    let split = train_test_split(table.len(), seed);
    if split.is_in_sample() {
        warn!(
            rows = table.len(),
            target = target.key(),
            "Too few rows for a holdout; scoring in-sample."
        );
    }

    let x_train = x.select_rows(&split.train);
    let x_test = x.select_rows(&split.test);
    let y_train = pick(&y, &split.train);
    let y_test = pick(&y, &split.test);

    // Families are independent; train them side by side.
    let outcomes: Vec<(ModelKind, Result<Trained, AppError>)> = kinds
        .par_iter()
        .map(|&kind| (kind, train_one(kind, seed, &x_train, &y_train, &x_test, &y_test)))
        .collect();

    let mut trained = Vec::with_capacity(outcomes.len());
    for (kind, outcome) in outcomes {
        match outcome {
            Ok(t) => {
                info!(
                    target = target.key(),
                    model = kind.display_name(),
                    r2 = t.score.quality.r2,
                    mse = t.score.quality.mse,
                    "Model scored"
                );
                trained.push(t);
            }
            Err(e) => warn!(target = target.key(), model = kind.display_name(), "Model failed: {e}"),
        }
    }

    let best_idx = select_best(&trained).ok_or_else(|| {
        AppError::model(format!("Every model failed for target {}.", target.key()))
    })?;

    let scores: Vec<ModelScore> = trained.iter().map(|t| t.score.clone()).collect();
    let best = trained.swap_remove(best_idx);
    debug!(target = target.key(), best = best.score.kind.display_name(), "Selected model");

    let states = table.states();
    Ok(TargetFit {
        target,
        scores,
        best_kind: best.score.kind,
        best: best.model,
        test_states: split.test.iter().map(|&i| states[i].clone()).collect(),
        test_actual: y_test,
        test_predicted: best.predicted,
    })
}

fn train_one(
    kind: ModelKind,
    seed: u64,
    x_train: &DMatrix<f64>,
    y_train: &[f64],
    x_test: &DMatrix<f64>,
    y_test: &[f64],
) -> Result<Trained, AppError> {
    let mut model = Model::new(kind, seed);
    model.fit(x_train, y_train)?;
    let predicted = model.predict(x_test);
    if predicted.iter().any(|p| !p.is_finite()) {
        return Err(AppError::model(format!("{} produced non-finite predictions.", kind.display_name())));
    }
    let quality = FitQuality {
        r2: r2(y_test, &predicted),
        mse: mse(y_test, &predicted),
        mae: mae(y_test, &predicted),
        n_test: y_test.len(),
    };
    let feature_importance = model.feature_importance();
    Ok(Trained {
        model,
        score: ModelScore {
            kind,
            quality,
            feature_importance,
        },
        predicted,
    })
}

fn select_best(trained: &[Trained]) -> Option<usize> {
    // NaN scores never win.
    let key = |t: &Trained| {
        let r2 = t.score.quality.r2;
        if r2.is_nan() { f64::NEG_INFINITY } else { r2 }
    };
    let mut best: Option<usize> = None;
    for (i, t) in trained.iter().enumerate() {
        match best {
            Some(b) if key(t) <= key(&trained[b]) => {}
            _ => best = Some(i),
        }
    }
    best
}

fn pick(values: &[f64], idx: &[usize]) -> Vec<f64> {
    idx.iter().map(|&i| values[i]).collect()
}

impl ModelSuite {
    pub fn get(&self, target: Target) -> Option<&TargetFit> {
        self.targets.iter().find(|t| t.target == target)
    }

    /// Predict every target for every state under every policy scenario.
    ///
    /// Rows come out grouped by scenario (in `PolicyScenario::ALL` order),
    /// then by state in table order.
    pub fn predict_scenarios(&self, base: &FeatureTable) -> Result<Vec<ScenarioPrediction>, AppError> {
        let fit_for = |target: Target| {
            self.get(target)
                .ok_or_else(|| AppError::model(format!("No trained model for {}.", target.key())))
        };
        let roi = fit_for(Target::Roi20yr)?;
        let hc = fit_for(Target::HumanCapital)?;
        let pov = fit_for(Target::PovertyReduction)?;

        let mut out = Vec::with_capacity(base.len() * 4);
        for (scenario, table) in all_scenarios(base) {
            let x = table.design_matrix();
            let roi_pred = roi.best.predict(&x);
            let hc_pred = hc.best.predict(&x);
            let pov_pred = pov.best.predict(&x);
            for (i, row) in table.rows.iter().enumerate() {
                out.push(ScenarioPrediction {
                    scenario,
                    state: row.state.clone(),
                    roi_20yr: roi_pred[i],
                    human_capital: hc_pred[i],
                    poverty_reduction: pov_pred[i],
                    policy_innovation_score: row.policy_innovation_score,
                });
            }
        }
        Ok(out)
    }
}
