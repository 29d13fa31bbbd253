//! Command-line parsing for the human capital dashboards.
//!
//! Parsing stays separate from dispatch; `app` turns these into pipeline calls.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::SettingsOverrides;
use crate::domain::ModelKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hci", version, about = "Human capital investment dashboards and ROI models")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone, Default)]
pub struct GlobalArgs {
    /// Project root holding data/, outputs/ and web/ (defaults to $HCI_PROJECT_ROOT or the cwd).
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Seed for splits, forests and the trajectory animation (defaults to $HCI_SEED or 42).
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Skip writing dataset caches under data/raw.
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalArgs {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            root: self.root.clone(),
            seed: self.seed,
            no_cache: self.no_cache,
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the indicator tables and cache them under data/raw.
    Collect,
    /// Write the education, policy comparison and international dashboards.
    Dashboards,
    /// Train the regressors, project the policy scenarios and write the ROI dashboard.
    Predict(PredictArgs),
    /// Write the 3D policy space dashboard.
    #[command(name = "dashboard-3d")]
    Dashboard3d,
    /// Run every step (the default).
    All(PredictArgs),
}

/// Options for model training and scenario projection.
#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Export scenario predictions to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Model families to train (repeatable; defaults to all four).
    #[arg(long = "model", value_enum, default_values_t = ModelKind::ALL.to_vec())]
    pub models: Vec<ModelKind>,
}

impl Default for PredictArgs {
    fn default() -> Self {
        Self {
            export: None,
            models: ModelKind::ALL.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_parses_models_and_export() {
        let cli = Cli::parse_from([
            "hci", "--seed", "7", "predict", "--model", "ridge", "--model", "elastic-net", "--export", "out.csv",
        ]);
        assert_eq!(cli.global.seed, Some(7));
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.models, vec![ModelKind::Ridge, ModelKind::ElasticNet]);
        assert_eq!(args.export, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn predict_defaults_to_all_models() {
        let cli = Cli::parse_from(["hci", "predict"]);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.models, ModelKind::ALL.to_vec());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["hci", "dashboard-3d", "--no-cache", "-vv", "--root", "/tmp/x"]);
        assert!(matches!(cli.command, Command::Dashboard3d));
        assert!(cli.global.no_cache);
        assert_eq!(cli.global.verbose, 2);
        assert_eq!(cli.global.overrides().root, Some(PathBuf::from("/tmp/x")));
    }
}
