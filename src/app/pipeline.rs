//! Shared pipeline steps used by every subcommand.
//!
//! collect -> dashboards -> features -> training -> scenarios -> ML dashboard -> 3D dashboard
//!
//! Each step writes its own files and returns what it produced; `app` only
//! prints.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::cli::PredictArgs;
use crate::config::Settings;
use crate::dashboards::{
    ADVANCED_3D_PAGE, EDUCATION_IMPACT_PAGE, INTERNATIONAL_PAGE, ML_ROI_PAGE, POLICY_COMPARISON_PAGE,
    education_impact_dashboard, international_comparison_dashboard, policy_comparison_dashboard,
    render_3d_dashboard, roi_prediction_dashboard,
};
use crate::data::collect_all;
use crate::domain::{DataCatalog, ScenarioPrediction};
use crate::error::AppError;
use crate::features::{FeatureTable, prepare_features};
use crate::fit::{ModelSuite, train_suite};
use crate::io::{export_figure, safe_write, sanitize_filename, save_models, write_scenarios_csv};

pub const CONFIG_FILE: &str = "config.json";

/// Everything `hci predict` produces.
#[derive(Debug, Clone)]
pub struct PredictOutput {
    pub table: FeatureTable,
    pub suite: ModelSuite,
    pub predictions: Vec<ScenarioPrediction>,
    pub dashboard: PathBuf,
    pub model_files: Vec<PathBuf>,
    pub export: Option<PathBuf>,
}

/// Everything `hci all` produces.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub catalog: DataCatalog,
    pub predict: PredictOutput,
    /// All dashboard pages in write order.
    pub pages: Vec<PathBuf>,
}

/// Build the catalog, caching datasets when enabled.
pub fn run_collect(settings: &Settings) -> Result<DataCatalog, AppError> {
    let catalog = collect_all(settings)?;
    if settings.cache_datasets {
        settings.save_config(CONFIG_FILE)?;
    }
    Ok(catalog)
}

/// Write the education, policy comparison and international dashboards.
pub fn run_dashboards(settings: &Settings, catalog: &DataCatalog) -> Result<Vec<PathBuf>, AppError> {
    let pages = [
        (EDUCATION_IMPACT_PAGE, education_impact_dashboard(catalog)?),
        (POLICY_COMPARISON_PAGE, policy_comparison_dashboard(catalog)?),
        (INTERNATIONAL_PAGE, international_comparison_dashboard(catalog)?),
    ];

    let mut written = Vec::with_capacity(pages.len());
    for (name, figure) in &pages {
        written.push(export_figure(figure, name, &settings.web_dir)?);
    }
    info!(count = written.len(), "policy dashboards written");
    Ok(written)
}

/// Train the regressors, project every scenario and write the ROI dashboard,
/// model files and the optional CSV export.
pub fn run_predict(settings: &Settings, catalog: &DataCatalog, args: &PredictArgs) -> Result<PredictOutput, AppError> {
    if args.models.is_empty() {
        return Err(AppError::io("At least one --model is required."));
    }

    let table = prepare_features(catalog)?;
    info!(states = table.len(), "prepared features");

    let suite = train_suite(&table, &args.models, settings.seed)?;
    let predictions = suite.predict_scenarios(&table)?;
    if predictions.iter().any(|p| !p.roi_20yr.is_finite()) {
        warn!("some scenario projections are not finite");
    }

    let figure = roi_prediction_dashboard(&predictions)?;
    let dashboard = export_figure(&figure, ML_ROI_PAGE, &settings.web_dir)?;
    let model_files = save_models(&suite, &settings.models_dir())?;

    let export = match &args.export {
        Some(path) => {
            write_scenarios_csv(path, &predictions)?;
            info!(path = %path.display(), rows = predictions.len(), "exported scenario predictions");
            Some(path.clone())
        }
        None => None,
    };

    Ok(PredictOutput {
        table,
        suite,
        predictions,
        dashboard,
        model_files,
        export,
    })
}

/// Write the 3D policy space page.
pub fn run_dashboard_3d(settings: &Settings, catalog: &DataCatalog) -> Result<PathBuf, AppError> {
    let html = render_3d_dashboard(catalog, settings.seed)?;
    let path = settings
        .web_dir
        .join(format!("{}.html", sanitize_filename(ADVANCED_3D_PAGE)));
    safe_write(&path, &html)?;
    info!(path = %path.display(), "exported 3D dashboard");
    Ok(path)
}

/// Run every step in order.
pub fn run_all(settings: &Settings, args: &PredictArgs) -> Result<RunOutput, AppError> {
    let catalog = run_collect(settings)?;
    let mut pages = run_dashboards(settings, &catalog)?;
    let predict = run_predict(settings, &catalog, args)?;
    pages.push(predict.dashboard.clone());
    pages.push(run_dashboard_3d(settings, &catalog)?);
    info!(pages = pages.len(), "pipeline complete");

    Ok(RunOutput {
        catalog,
        predict,
        pages,
    })
}
