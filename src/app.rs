//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - resolves settings
//! - runs the requested pipeline steps and prints their reports

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command, PredictArgs};
use crate::config::Settings;
use crate::error::AppError;

pub mod pipeline;

const SUBCOMMANDS: [&str; 5] = ["collect", "dashboards", "predict", "dashboard-3d", "all"];

/// Options whose value is a separate argv token.
const VALUE_OPTIONS: [&str; 4] = ["--root", "--seed", "--export", "--model"];

/// Entry point for the `hci` binary.
pub fn run() -> Result<(), AppError> {
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);
    init_tracing(cli.global.verbose);

    let settings = Settings::resolve(&cli.global.overrides())?;
    info!(root = %settings.project_root.display(), seed = settings.seed, "hci starting");

    match cli.command {
        Command::Collect => {
            let catalog = pipeline::run_collect(&settings)?;
            println!("{}", crate::report::format_collection_summary(&catalog));
        }
        Command::Dashboards => {
            let catalog = pipeline::run_collect(&settings)?;
            for path in pipeline::run_dashboards(&settings, &catalog)? {
                println!("wrote {}", path.display());
            }
        }
        Command::Predict(args) => {
            let catalog = pipeline::run_collect(&settings)?;
            let out = pipeline::run_predict(&settings, &catalog, &args)?;
            print_predict(&out);
        }
        Command::Dashboard3d => {
            let catalog = pipeline::run_collect(&settings)?;
            let path = pipeline::run_dashboard_3d(&settings, &catalog)?;
            println!("wrote {}", path.display());
        }
        Command::All(args) => handle_all(&settings, &args)?,
    }
    Ok(())
}

fn handle_all(settings: &Settings, args: &PredictArgs) -> Result<(), AppError> {
    let out = pipeline::run_all(settings, args)?;
    println!("{}", crate::report::format_collection_summary(&out.catalog));
    print_predict(&out.predict);
    println!("Dashboards:");
    for path in &out.pages {
        println!("- {}", path.display());
    }
    Ok(())
}

fn print_predict(out: &pipeline::PredictOutput) {
    println!("{}", crate::report::format_training_summary(&out.suite));
    println!("{}", crate::report::format_scenario_summary(&out.predictions));
    println!("wrote {}", out.dashboard.display());
    for path in &out.model_files {
        println!("wrote {}", path.display());
    }
    if let Some(path) = &out.export {
        println!("wrote {}", path.display());
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Rewrite argv so `hci` defaults to `hci all`.
///
/// Rules:
/// - `hci`                        -> `hci all`
/// - `hci --seed 7 --model ridge` -> `hci all --seed 7 --model ridge`
/// - `hci --help/--version/-h`    -> unchanged
/// - a subcommand in the first positional slot -> unchanged
///
/// Values of `--root`, `--seed`, `--export` and `--model` never count as the
/// subcommand, so `hci --root collect` still runs `all` rooted at `collect`.
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    if !names_subcommand(argv.get(1..).unwrap_or_default()) {
        argv.insert(1, "all".to_string());
    }
    argv
}

/// True when `args` ask for help/version or start with an explicit subcommand.
fn names_subcommand(args: &[String]) -> bool {
    let mut tokens = args.iter();
    while let Some(token) = tokens.next() {
        match token.as_str() {
            "-h" | "--help" | "-V" | "--version" | "help" => return true,
            t if SUBCOMMANDS.contains(&t) => return true,
            t if VALUE_OPTIONS.contains(&t) => {
                tokens.next();
            }
            t if t.starts_with('-') => {}
            _ => return false,
        }
    }
    false
}
