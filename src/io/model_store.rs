//! Persist and reload the selected model per target.
//!
//! Files live at `<dir>/human_capital_<target>_model.json`. Linear models carry
//! their fitted scaler inside the same document.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{FitQuality, ModelKind, Target};
use crate::error::AppError;
use crate::features::FEATURE_NAMES;
use crate::fit::ModelSuite;
use crate::models::Model;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredModel {
    pub tool: String,
    pub target: String,
    pub kind: ModelKind,
    pub quality: FitQuality,
    pub feature_names: Vec<String>,
    pub model: Model,
}

pub fn model_path(dir: &Path, target: Target) -> PathBuf {
    dir.join(format!("human_capital_{}_model.json", target.key()))
}

/// Write the best model of every target in `suite` into `dir`.
pub fn save_models(suite: &ModelSuite, dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::io(format!("Failed to create model directory '{}': {e}", dir.display())))?;

    let mut written = Vec::with_capacity(suite.targets.len());
    for fit in &suite.targets {
        let quality = fit
            .best_score()
            .map(|s| s.quality)
            .ok_or_else(|| AppError::model(format!("Missing score for {}.", fit.target.key())))?;
        let stored = StoredModel {
            tool: "hci".to_string(),
            target: fit.target.key().to_string(),
            kind: fit.best_kind,
            quality,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            model: fit.best.clone(),
        };

        let path = model_path(dir, fit.target);
        let file = File::create(&path)
            .map_err(|e| AppError::io(format!("Failed to create model JSON '{}': {e}", path.display())))?;
        serde_json::to_writer_pretty(file, &stored)
            .map_err(|e| AppError::io(format!("Failed to write model JSON: {e}")))?;
        info!(path = %path.display(), model = fit.best_kind.display_name(), "saved model");
        written.push(path);
    }
    Ok(written)
}

/// Read a model file written by [`save_models`].
pub fn load_model(path: &Path) -> Result<StoredModel, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open model JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::io(format!("Invalid model JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::build_catalog;
    use crate::features::prepare_features;
    use crate::fit::train_suite;
    use crate::models::Regressor;
    use chrono::Local;

    #[test]
    fn saved_models_reload_and_predict() {
        let table = prepare_features(&build_catalog(Local::now())).unwrap();
        let suite = train_suite(&table, &[ModelKind::Ridge, ModelKind::GradientBoosting], 42).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let paths = save_models(&suite, dir.path()).unwrap();
        assert_eq!(paths.len(), 3);
        assert!(paths[0].ends_with("human_capital_roi_20yr_model.json"));

        let stored = load_model(&model_path(dir.path(), Target::HumanCapital)).unwrap();
        assert_eq!(stored.feature_names.len(), 21);
        let fit = suite.get(Target::HumanCapital).unwrap();
        assert_eq!(stored.kind, fit.best_kind);

        let x = table.design_matrix();
        for (a, b) in stored.model.predict(&x).iter().zip(fit.best.predict(&x)) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_model(Path::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
