//! The command line interface for genplan.
use crate::input::load_model;
use crate::log;
use crate::output::{create_output_directory, get_output_dir};
use crate::planning;
use crate::settings::Settings;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod settings;
use settings::SettingsSubcommands;

/// Plan generation capacity with linear programming.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options controlling where results are written
#[derive(Args, Default)]
pub struct RunOpts {
    /// Folder for results (default: a folder named after the model under the results root)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Replace the results folder if it already contains files
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a planning model and write the results.
    Run {
        /// Folder containing the model files.
        model_dir: PathBuf,
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Check that a model loads without solving it.
    Validate {
        /// Folder containing the model files.
        model_dir: PathBuf,
    },
    /// Manage the program settings file.
    Settings {
        /// The available subcommands for the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

/// Parse CLI arguments and start genplan
pub fn run_cli() -> Result<()> {
    match Cli::parse().command {
        Some(Commands::Run { model_dir, opts }) => handle_run_command(&model_dir, &opts, None),
        Some(Commands::Validate { model_dir }) => handle_validate_command(&model_dir, None),
        Some(Commands::Settings { subcommand }) => subcommand.execute(),
        None => {
            // No command given, so show help
            println!("{}", Cli::command().render_long_help());
            Ok(())
        }
    }
}

/// Load program settings, if not provided
fn settings_or_load(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Work out where results go: `--output-dir` if given, else a folder under the results root
fn resolve_output_dir(model_path: &Path, opts: &RunOpts, settings: &Settings) -> Result<PathBuf> {
    match &opts.output_dir {
        Some(output_dir) => Ok(output_dir.clone()),
        None => get_output_dir(model_path, &settings.results_root),
    }
}

/// Handle the `run` command.
///
/// Results and log files are written to the output folder, which is created first so that the
/// logger can write to it.
pub fn handle_run_command(
    model_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = settings_or_load(settings)?;
    let output_dir = resolve_output_dir(model_path, opts, &settings)?;
    let overwritten = create_output_directory(&output_dir, opts.overwrite || settings.overwrite)
        .with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_dir.display()
            )
        })?;

    log::init(Some(&settings.log_level), Some(&output_dir))
        .context("Failed to initialise logging.")?;
    if overwritten {
        warn!("Replaced existing results in {}", output_dir.display());
    }

    let model = load_model(model_path).context("Failed to load model.")?;
    info!(
        "Loaded model from {} (results in {})",
        model_path.display(),
        output_dir.display()
    );

    planning::run(&model, model_path, &output_dir)?;
    info!("Planning complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(model_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = settings_or_load(settings)?;

    // No log files are written when validating
    log::init(Some(&settings.log_level), None).context("Failed to initialise logging.")?;

    let model = load_model(model_path).context("Failed to validate model.")?;
    info!(
        "Model validation successful! {} generators, {} periods, {}",
        model.portfolio.num_generators(),
        model.portfolio.horizon(),
        match &model.scenarios {
            Some(scenarios) => format!("{} scenarios", scenarios.len()),
            None => "no scenarios".to_string(),
        }
    );

    Ok(())
}
