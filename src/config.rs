//! Run configuration: project layout, seed and visualization settings.
//!
//! Precedence (lowest to highest): built-in defaults, environment variables
//! (a `.env` file is honoured), CLI flags.

use std::collections::BTreeMap;
use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::chart::theme::PolicyTheme;
use crate::error::AppError;

pub const ENV_PROJECT_ROOT: &str = "HCI_PROJECT_ROOT";
pub const ENV_SEED: &str = "HCI_SEED";

pub const DEFAULT_SEED: u64 = 42;

/// Public endpoints the literal tables are modelled on.
///
/// Only recorded in `config.json`; nothing is fetched.
const DATA_SOURCES: [(&str, &str); 6] = [
    ("naep_api", "https://www.nationsreportcard.gov/profiles/api/"),
    ("census_api", "https://api.census.gov/data"),
    ("world_bank_api", "https://api.worldbank.org/v2"),
    ("oecd_api", "https://stats.oecd.org/SDMX-JSON"),
    ("cdc_wonder", "https://wonder.cdc.gov/wonder/help/API.html"),
    ("usda_nutrition", "https://www.fns.usda.gov/pd/child-nutrition-tables"),
];

/// Overrides collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub root: Option<PathBuf>,
    pub seed: Option<u64>,
    pub no_cache: bool,
}

/// Resolved settings for a run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub project_root: PathBuf,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub web_dir: PathBuf,
    /// Seed for every random component (splits, forests, animation noise).
    pub seed: u64,
    /// Write dataset caches and metadata under `data/raw`.
    pub cache_datasets: bool,
    pub viz: VizConfig,
}

/// Chart styling knobs persisted with the config.
#[derive(Debug, Clone, Serialize)]
pub struct VizConfig {
    pub default_theme: String,
    pub color_palette: BTreeMap<String, String>,
    pub extended_palette: Vec<String>,
    pub figure_size: (u32, u32),
    pub dpi: u32,
    pub font_family: String,
}

impl Default for VizConfig {
    fn default() -> Self {
        let color_palette = ["education", "health", "nutrition", "poverty", "success", "neutral"]
            .iter()
            .map(|name| (name.to_string(), PolicyTheme::color(name).to_string()))
            .collect();
        Self {
            default_theme: "plotly_white".to_string(),
            color_palette,
            extended_palette: PolicyTheme::EXTENDED_PALETTE.iter().map(|c| c.to_string()).collect(),
            figure_size: (12, 8),
            dpi: 300,
            font_family: PolicyTheme::FONT_FAMILY.to_string(),
        }
    }
}

impl Settings {
    /// Build settings rooted at `project_root` with all other defaults.
    pub fn with_root(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        Self {
            data_dir: project_root.join("data"),
            output_dir: project_root.join("outputs"),
            web_dir: project_root.join("web"),
            project_root,
            seed: DEFAULT_SEED,
            cache_datasets: true,
            viz: VizConfig::default(),
        }
    }

    /// Resolve settings from the environment and CLI overrides.
    pub fn resolve(overrides: &SettingsOverrides) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolution against an explicit variable lookup instead of the process
    /// environment.
    pub fn resolve_with(
        overrides: &SettingsOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let root = match &overrides.root {
            Some(root) => root.clone(),
            None => match env(ENV_PROJECT_ROOT) {
                Some(v) if !v.trim().is_empty() => PathBuf::from(v),
                _ => std::env::current_dir()
                    .map_err(|e| AppError::io(format!("Failed to resolve working directory: {e}")))?,
            },
        };

        let seed = match overrides.seed {
            Some(seed) => seed,
            None => match env(ENV_SEED) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| AppError::io(format!("Invalid {ENV_SEED} '{raw}': {e}")))?,
                None => DEFAULT_SEED,
            },
        };

        let mut settings = Self::with_root(root);
        settings.seed = seed;
        settings.cache_datasets = !overrides.no_cache;
        debug!(root = %settings.project_root.display(), seed, "resolved settings");
        Ok(settings)
    }

    pub fn raw_data_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    pub fn models_dir(&self) -> PathBuf {
        self.output_dir.join("models")
    }

    /// Every directory the pipeline may write into.
    pub fn required_directories(&self) -> Vec<PathBuf> {
        vec![
            self.data_dir.join("raw"),
            self.data_dir.join("processed"),
            self.data_dir.join("external"),
            self.output_dir.join("figures"),
            self.output_dir.join("reports"),
            self.output_dir.join("models"),
            self.web_dir.join("assets"),
        ]
    }

    /// Create the project directory layout if missing.
    pub fn ensure_directories(&self) -> Result<(), AppError> {
        for dir in self.required_directories() {
            create_dir_all(&dir)
                .map_err(|e| AppError::io(format!("Failed to create '{}': {e}", dir.display())))?;
        }
        Ok(())
    }

    /// Persist the non-sensitive part of the configuration.
    pub fn save_config(&self, filename: &str) -> Result<PathBuf, AppError> {
        let path = self.project_root.join(filename);
        write_config_json(&path, self)?;
        info!(path = %path.display(), "saved configuration");
        Ok(path)
    }
}

#[derive(Serialize)]
struct SavedConfig<'a> {
    data_sources: BTreeMap<&'static str, &'static str>,
    viz_config: &'a VizConfig,
    directories: BTreeMap<&'static str, String>,
    seed: u64,
}

fn write_config_json(path: &Path, settings: &Settings) -> Result<(), AppError> {
    let saved = SavedConfig {
        data_sources: DATA_SOURCES.iter().copied().collect(),
        viz_config: &settings.viz,
        directories: [
            ("data", settings.data_dir.display().to_string()),
            ("output", settings.output_dir.display().to_string()),
            ("web", settings.web_dir.display().to_string()),
        ]
        .into_iter()
        .collect(),
        seed: settings.seed,
    };

    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create config JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &saved)
        .map_err(|e| AppError::io(format!("Failed to write config JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_rooted_under_project() {
        let settings = Settings::with_root("/tmp/hci");
        assert_eq!(settings.web_dir, PathBuf::from("/tmp/hci/web"));
        assert_eq!(settings.models_dir(), PathBuf::from("/tmp/hci/outputs/models"));
        assert_eq!(settings.required_directories().len(), 7);
        assert_eq!(settings.seed, DEFAULT_SEED);
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: BTreeMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn cli_overrides_win() {
        let overrides = SettingsOverrides {
            root: Some(PathBuf::from("/tmp/elsewhere")),
            seed: Some(7),
            no_cache: true,
        };
        let env = env_of(&[(ENV_PROJECT_ROOT, "/tmp/from-env"), (ENV_SEED, "99")]);
        let settings = Settings::resolve_with(&overrides, env).unwrap();
        assert_eq!(settings.project_root, PathBuf::from("/tmp/elsewhere"));
        assert_eq!(settings.seed, 7);
        assert!(!settings.cache_datasets);
    }

    #[test]
    fn env_fills_missing_overrides() {
        let env = env_of(&[(ENV_PROJECT_ROOT, "/tmp/from-env"), (ENV_SEED, " 99 ")]);
        let settings = Settings::resolve_with(&SettingsOverrides::default(), env).unwrap();
        assert_eq!(settings.project_root, PathBuf::from("/tmp/from-env"));
        assert_eq!(settings.seed, 99);
        assert!(settings.cache_datasets);

        let settings = Settings::resolve_with(&SettingsOverrides::default(), env_of(&[])).unwrap();
        assert_eq!(settings.seed, DEFAULT_SEED);
    }

    #[test]
    fn invalid_env_seed_is_an_io_error() {
        let env = env_of(&[(ENV_SEED, "forty-two")]);
        let err = Settings::resolve_with(&SettingsOverrides::default(), env).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn save_config_omits_nothing_required() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::with_root(dir.path());
        let path = settings.save_config("config.json").unwrap();
        let raw = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value["data_sources"]["naep_api"].is_string());
        assert_eq!(value["viz_config"]["color_palette"]["education"], "#2E86AB");
        let extended = value["viz_config"]["extended_palette"].as_array().unwrap();
        assert_eq!(extended.len(), 15);
        assert_eq!(extended[14], "#e377c2");
        assert!(value["directories"]["web"].as_str().unwrap().ends_with("web"));
    }
}
