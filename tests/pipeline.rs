use std::fs;
use std::path::Path;

use hci_atlas::app::pipeline::{CONFIG_FILE, run_all, run_dashboard_3d};
use hci_atlas::cli::PredictArgs;
use hci_atlas::config::Settings;
use hci_atlas::data::build_catalog;
use hci_atlas::domain::{ModelKind, Target};
use hci_atlas::io::{load_model, model_path};

fn non_empty(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

#[test]
fn full_pipeline_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::with_root(dir.path());
    let csv = dir.path().join("scenarios.csv");
    let args = PredictArgs {
        export: Some(csv.clone()),
        models: vec![ModelKind::Ridge, ModelKind::GradientBoosting],
    };

    let out = run_all(&settings, &args).unwrap();

    for page in [
        "education_impact_dashboard",
        "policy_comparison_dashboard",
        "international_comparison_dashboard",
        "ml_roi_predictions_dashboard",
        "advanced_3d_dashboard",
    ] {
        let path = dir.path().join("web").join(format!("{page}.html"));
        assert!(non_empty(&path), "{}", path.display());
        let html = fs::read_to_string(&path).unwrap();
        assert!(html.contains("cdn.plot.ly"));
        assert!(html.contains("Content-Security-Policy"));
    }
    assert_eq!(out.pages.len(), 5);

    for name in ["naep_data.csv", "mobility_data.csv", "collection_metadata.json"] {
        assert!(non_empty(&dir.path().join("data/raw").join(name)), "{name}");
    }
    assert!(non_empty(&dir.path().join(CONFIG_FILE)));

    let models_dir = settings.models_dir();
    for target in Target::ALL {
        let stored = load_model(&model_path(&models_dir, target)).unwrap();
        assert_eq!(stored.target, target.key());
        assert!(matches!(stored.kind, ModelKind::Ridge | ModelKind::GradientBoosting));
    }

    let raw = fs::read_to_string(&csv).unwrap();
    let mut lines = raw.lines();
    assert_eq!(
        lines.next(),
        Some("scenario,state,roi_20yr_predicted,human_capital_predicted,poverty_reduction_predicted,policy_innovation_score")
    );
    assert_eq!(lines.count(), 40);
}

#[test]
fn dashboard_3d_is_seeded() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let catalog = build_catalog(chrono::Local::now());

    let mut sa = Settings::with_root(a.path());
    let mut sb = Settings::with_root(b.path());
    sa.seed = 11;
    sb.seed = 11;
    let pa = run_dashboard_3d(&sa, &catalog).unwrap();
    let pb = run_dashboard_3d(&sb, &catalog).unwrap();
    assert_eq!(fs::read_to_string(pa).unwrap(), fs::read_to_string(pb).unwrap());
}
