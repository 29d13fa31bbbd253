//! Dataset collection: assemble the literal tables and cache them on disk.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use crate::config::Settings;
use crate::data::tables::{
    SOURCE_HEALTH, SOURCE_INTERNATIONAL, SOURCE_MOBILITY, SOURCE_NAEP, SOURCE_NUTRITION,
    education_records, health_records, international_records, mobility_records, nutrition_records,
};
use crate::domain::DataCatalog;
use crate::error::AppError;

/// Summary written next to the cached datasets.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionMetadata {
    pub collection_timestamp: DateTime<Local>,
    pub datasets_collected: Vec<String>,
    pub total_records: usize,
    pub data_sources: Vec<String>,
}

/// Build the catalog for a run.
///
/// When `settings.cache_datasets` is set, every dataset is written to
/// `data/raw/<name>_data.csv` together with `collection_metadata.json`.
pub fn collect_all(settings: &Settings) -> Result<DataCatalog, AppError> {
    info!("starting data collection");
    let now = Local::now();
    let catalog = build_catalog(now);

    if settings.cache_datasets {
        settings.ensure_directories()?;
        let files = write_dataset_caches(&catalog, &settings.raw_data_dir())?;
        for path in &files {
            info!(path = %path.display(), "cached dataset");
        }
        let metadata = CollectionMetadata {
            collection_timestamp: now,
            datasets_collected: catalog.dataset_names().iter().map(|s| s.to_string()).collect(),
            total_records: catalog.total_records(),
            data_sources: [SOURCE_NAEP, SOURCE_MOBILITY, SOURCE_HEALTH, SOURCE_NUTRITION, SOURCE_INTERNATIONAL]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };
        write_metadata(&settings.raw_data_dir().join("collection_metadata.json"), &metadata)?;
    }

    info!(
        datasets = catalog.dataset_names().len(),
        records = catalog.total_records(),
        "collected datasets"
    );
    Ok(catalog)
}

/// Assemble all five tables stamped with `at`.
pub fn build_catalog(at: DateTime<Local>) -> DataCatalog {
    DataCatalog {
        education: education_records(None, at),
        mobility: mobility_records(at),
        health: health_records(at),
        nutrition: nutrition_records(at),
        international: international_records(at),
    }
}

/// Write one CSV per dataset into `dir` and return the written paths.
pub fn write_dataset_caches(catalog: &DataCatalog, dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut written = Vec::with_capacity(5);

    let path = dir.join("naep_data.csv");
    let mut w = csv_writer(&path)?;
    write_row(&mut w, &[
        "state", "year", "math_8th_grade", "reading_8th_grade", "math_4th_grade",
        "reading_4th_grade", "data_source", "collection_date",
    ])?;
    for r in &catalog.education {
        write_row(&mut w, &[
            r.state.clone(),
            r.year.to_string(),
            r.math_8th_grade.to_string(),
            r.reading_8th_grade.to_string(),
            r.math_4th_grade.to_string(),
            r.reading_4th_grade.to_string(),
            r.provenance.data_source.clone(),
            r.provenance.collection_date.to_rfc3339(),
        ])?;
    }
    finish(w, &path)?;
    written.push(path);

    let path = dir.join("mobility_data.csv");
    let mut w = csv_writer(&path)?;
    write_row(&mut w, &[
        "state", "mobility_index", "income_25th_percentile", "income_75th_percentile",
        "data_source", "collection_date",
    ])?;
    for r in &catalog.mobility {
        write_row(&mut w, &[
            r.state.clone(),
            r.mobility_index.to_string(),
            r.income_25th_percentile.to_string(),
            r.income_75th_percentile.to_string(),
            r.provenance.data_source.clone(),
            r.provenance.collection_date.to_rfc3339(),
        ])?;
    }
    finish(w, &path)?;
    written.push(path);

    let path = dir.join("health_data.csv");
    let mut w = csv_writer(&path)?;
    write_row(&mut w, &[
        "state", "child_mortality_rate", "infant_mortality_rate", "uninsured_children_pct",
        "data_source", "collection_date",
    ])?;
    for r in &catalog.health {
        write_row(&mut w, &[
            r.state.clone(),
            r.child_mortality_rate.to_string(),
            r.infant_mortality_rate.to_string(),
            r.uninsured_children_pct.to_string(),
            r.provenance.data_source.clone(),
            r.provenance.collection_date.to_rfc3339(),
        ])?;
    }
    finish(w, &path)?;
    written.push(path);

    let path = dir.join("nutrition_data.csv");
    let mut w = csv_writer(&path)?;
    write_row(&mut w, &[
        "state", "free_lunch_eligible_pct", "school_breakfast_participation", "universal_meals",
        "data_source", "collection_date",
    ])?;
    for r in &catalog.nutrition {
        write_row(&mut w, &[
            r.state.clone(),
            r.free_lunch_eligible_pct.to_string(),
            r.school_breakfast_participation.to_string(),
            u8::from(r.universal_meals).to_string(),
            r.provenance.data_source.clone(),
            r.provenance.collection_date.to_rfc3339(),
        ])?;
    }
    finish(w, &path)?;
    written.push(path);

    let path = dir.join("international_data.csv");
    let mut w = csv_writer(&path)?;
    write_row(&mut w, &[
        "country", "education_spending_gdp", "child_poverty_rate", "pisa_math_score",
        "social_mobility_index", "data_source", "collection_date",
    ])?;
    for r in &catalog.international {
        write_row(&mut w, &[
            r.country.clone(),
            r.education_spending_gdp.to_string(),
            r.child_poverty_rate.to_string(),
            r.pisa_math_score.to_string(),
            r.social_mobility_index.to_string(),
            r.provenance.data_source.clone(),
            r.provenance.collection_date.to_rfc3339(),
        ])?;
    }
    finish(w, &path)?;
    written.push(path);

    Ok(written)
}

fn write_metadata(path: &Path, metadata: &CollectionMetadata) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create metadata JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, metadata)
        .map_err(|e| AppError::io(format!("Failed to write metadata JSON: {e}")))?;
    Ok(())
}

fn csv_writer(path: &Path) -> Result<csv::Writer<File>, AppError> {
    csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create cache CSV '{}': {e}", path.display())))
}

fn write_row<I, T>(w: &mut csv::Writer<File>, record: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    w.write_record(record)
        .map_err(|e| AppError::io(format!("Failed to write cache CSV row: {e}")))
}

fn finish(mut w: csv::Writer<File>, path: &Path) -> Result<(), AppError> {
    w.flush()
        .map_err(|e| AppError::io(format!("Failed to flush cache CSV '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_every_dataset() {
        let catalog = build_catalog(Local::now());
        assert_eq!(catalog.education.len(), 10);
        assert_eq!(catalog.mobility.len(), 10);
        assert_eq!(catalog.health.len(), 10);
        assert_eq!(catalog.nutrition.len(), 10);
        assert_eq!(catalog.international.len(), 6);
        assert_eq!(catalog.total_records(), 46);
        assert_eq!(catalog.mobility_for("NH").unwrap().mobility_index, 7.3);
        assert!(catalog.health_for("ZZ").is_none());
    }

    #[test]
    fn collect_all_writes_caches_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::with_root(dir.path());
        collect_all(&settings).unwrap();

        let raw = settings.raw_data_dir();
        for name in ["naep", "mobility", "health", "nutrition", "international"] {
            let path = raw.join(format!("{name}_data.csv"));
            let text = std::fs::read_to_string(&path).unwrap();
            assert!(text.lines().count() > 1, "{} should have data rows", path.display());
        }

        let naep = std::fs::read_to_string(raw.join("naep_data.csv")).unwrap();
        assert!(naep.lines().nth(1).unwrap().starts_with("MA,2023,295,279,253,235,NAEP,"));

        let meta: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(raw.join("collection_metadata.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(meta["total_records"], 46);
        assert_eq!(meta["datasets_collected"][0], "education");
    }

    #[test]
    fn collect_all_skips_disk_when_caching_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::with_root(dir.path());
        settings.cache_datasets = false;
        let catalog = collect_all(&settings).unwrap();
        assert_eq!(catalog.education.len(), 10);
        assert!(!settings.raw_data_dir().exists());
    }
}
