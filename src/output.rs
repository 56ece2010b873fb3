//! The module responsible for writing output data to disk.
use crate::generator::GeneratorID;
use crate::results::ExpansionResults;
use crate::scenario::ScenarioID;
use anyhow::{Context, Result, ensure};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The default root folder in which model-specific output folders will be created
pub const DEFAULT_OUTPUT_ROOT: &str = "genplan_results";

/// The output file name for capacity, investment and decommissioning
const CAPACITY_FILE_NAME: &str = "capacity.csv";

/// The output file name for generation
const GENERATION_FILE_NAME: &str = "generation.csv";

/// The output file name for the run summary
const SUMMARY_FILE_NAME: &str = "summary.toml";

/// Get the default output directory for the model at the specified path.
///
/// This is a folder named after the model, inside `results_root`.
pub fn get_output_dir(model_dir: &Path, results_root: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified "."
    let model_dir = model_dir
        .canonicalize()
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    Ok(results_root.join(model_name))
}

/// Create a new output directory.
///
/// If the directory already exists and contains files, it is only replaced when `overwrite` is
/// true.
///
/// # Returns
///
/// Whether an existing directory was overwritten.
pub fn create_output_directory(output_dir: &Path, overwrite: bool) -> Result<bool> {
    let mut overwritten = false;
    if output_dir.is_dir() {
        if output_dir.read_dir()?.next().is_none() {
            // Empty, so nothing to overwrite
            return Ok(false);
        }

        ensure!(
            overwrite,
            "Output folder already exists and is not empty. Pass --overwrite to replace it."
        );
        fs::remove_dir_all(output_dir)?;
        overwritten = true;
    }

    fs::create_dir_all(output_dir)?;

    Ok(overwritten)
}

/// Represents a row in the capacity CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct CapacityRow {
    generator_id: GeneratorID,
    period: usize,
    capacity: f64,
    investment: f64,
    decommission: f64,
}

/// Represents a row in the generation CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct GenerationRow {
    scenario_id: ScenarioID,
    generator_id: GeneratorID,
    period: usize,
    generation: f64,
}

/// Summary information about a run
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Summary {
    /// Path to the model which was run
    model_path: PathBuf,
    /// The date and time at which results were written
    datetime: String,
    /// The program version
    version: String,
    objective_value: f64,
    num_generators: usize,
    num_periods: usize,
    num_scenarios: usize,
    /// Total generation per generator, for each scenario
    scenarios: Vec<ScenarioSummary>,
}

/// Total generation of each generator in one scenario
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ScenarioSummary {
    id: ScenarioID,
    generation: Vec<GeneratorTotal>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct GeneratorTotal {
    generator_id: GeneratorID,
    total: f64,
}

fn scenario_summaries(results: &ExpansionResults) -> Vec<ScenarioSummary> {
    results
        .scenario_ids
        .iter()
        .enumerate()
        .map(|(s, id)| ScenarioSummary {
            id: id.clone(),
            generation: results
                .total_generation(s)
                .map(|(generator_id, total)| GeneratorTotal {
                    generator_id: generator_id.clone(),
                    total: total.value(),
                })
                .collect(),
        })
        .collect()
}

/// Write results to CSV files and a summary TOML file.
///
/// # Arguments
///
/// * `output_path` - Folder where files will be saved
/// * `model_path` - Path to the model which was run
/// * `results` - The results to write
pub fn write_results(
    output_path: &Path,
    model_path: &Path,
    results: &ExpansionResults,
) -> Result<()> {
    write_capacity(&output_path.join(CAPACITY_FILE_NAME), results)?;
    write_generation(&output_path.join(GENERATION_FILE_NAME), results)?;

    let summary = Summary {
        model_path: model_path.to_path_buf(),
        datetime: Local::now().to_rfc2822(),
        version: env!("CARGO_PKG_VERSION").into(),
        objective_value: results.objective_value.value(),
        num_generators: results.generators.len(),
        num_periods: results.num_periods(),
        num_scenarios: results.scenario_ids.len(),
        scenarios: scenario_summaries(results),
    };
    let summary_path = output_path.join(SUMMARY_FILE_NAME);
    fs::write(&summary_path, toml::to_string(&summary)?)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;

    Ok(())
}

fn write_capacity(file_path: &Path, results: &ExpansionResults) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)?;
    for (generator_id, gen_results) in &results.generators {
        for period in 0..gen_results.capacity.len() {
            writer.serialize(CapacityRow {
                generator_id: generator_id.clone(),
                period,
                capacity: gen_results.capacity[period].value(),
                investment: gen_results.investment[period].value(),
                decommission: gen_results.decommission[period].value(),
            })?;
        }
    }
    writer.flush()?;

    Ok(())
}

fn write_generation(file_path: &Path, results: &ExpansionResults) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)?;
    for (s, scenario_id) in results.scenario_ids.iter().enumerate() {
        for (generator_id, gen_results) in &results.generators {
            for (period, generation) in gen_results.generation[s].iter().enumerate() {
                writer.serialize(GenerationRow {
                    scenario_id: scenario_id.clone(),
                    generator_id: generator_id.clone(),
                    period,
                    generation: generation.value(),
                })?;
            }
        }
    }
    writer.flush()?;

    Ok(())
}
