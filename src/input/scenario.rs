//! Code for reading scenarios from CSV files.
use super::availability::override_periods;
use super::{input_err_msg, read_csv_optional};
use crate::id::IDCollection;
use crate::period::parse_period_str;
use crate::portfolio::GeneratorMap;
use crate::scenario::{Scenario, ScenarioID, ScenarioSet};
use crate::units::Dimensionless;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

const SCENARIOS_FILE_NAME: &str = "scenarios.csv";
const SCENARIO_AVAILABILITY_FILE_NAME: &str = "scenario_availability.csv";

fn default_load_factor() -> Dimensionless {
    Dimensionless(1.0)
}

#[derive(PartialEq, Debug, Deserialize)]
struct ScenarioRaw {
    id: String,
    weight: f64,
    #[serde(default = "default_load_factor")]
    load_factor: Dimensionless,
}

#[derive(PartialEq, Debug, Deserialize)]
struct ScenarioAvailabilityRaw {
    scenario_id: String,
    generator_id: String,
    periods: String,
    value: Dimensionless,
}

/// Read the scenario set from the model directory, if there is one.
///
/// Scenario availability overrides the maximum capacity factors of generators. Periods which are
/// not mentioned keep the values of the base portfolio.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `generators` - The base portfolio's generators
/// * `horizon` - Number of periods in the model
///
/// # Returns
///
/// `None` if there is no `scenarios.csv` file, otherwise the scenarios.
pub fn read_scenarios(
    model_dir: &Path,
    generators: &GeneratorMap,
    horizon: usize,
) -> Result<Option<ScenarioSet>> {
    let scenarios_path = model_dir.join(SCENARIOS_FILE_NAME);
    let availability_path = model_dir.join(SCENARIO_AVAILABILITY_FILE_NAME);
    if !scenarios_path.exists() {
        ensure!(
            !availability_path.exists(),
            "{SCENARIO_AVAILABILITY_FILE_NAME} was provided without {SCENARIOS_FILE_NAME}"
        );
        return Ok(None);
    }

    let scenarios_csv = read_csv_optional(&scenarios_path)?;
    let mut scenarios =
        read_scenarios_from_iter(scenarios_csv).with_context(|| input_err_msg(&scenarios_path))?;

    let availability_csv = read_csv_optional(&availability_path)?;
    apply_overrides_from_iter(availability_csv, &mut scenarios, generators, horizon)
        .with_context(|| input_err_msg(&availability_path))?;

    let scenarios = ScenarioSet::new(scenarios.into_values().collect())
        .with_context(|| input_err_msg(&scenarios_path))?;

    Ok(Some(scenarios))
}

fn read_scenarios_from_iter<I>(iter: I) -> Result<IndexMap<ScenarioID, Scenario>>
where
    I: Iterator<Item = ScenarioRaw>,
{
    let mut scenarios = IndexMap::new();
    for raw in iter {
        let scenario = Scenario {
            load_factor: raw.load_factor,
            ..Scenario::new(&raw.id, raw.weight)
        };
        ensure!(
            scenarios.insert(scenario.id.clone(), scenario).is_none(),
            "Duplicate scenario ID: {}",
            raw.id
        );
    }

    Ok(scenarios)
}

fn apply_overrides_from_iter<I>(
    iter: I,
    scenarios: &mut IndexMap<ScenarioID, Scenario>,
    generators: &GeneratorMap,
    horizon: usize,
) -> Result<()>
where
    I: Iterator<Item = ScenarioAvailabilityRaw>,
{
    for raw in iter {
        let scenario_id = scenarios.get_id(&raw.scenario_id)?;
        let generator_id = generators.get_id(&raw.generator_id)?;
        let periods = parse_period_str(&raw.periods, horizon)?;

        let scenario = &mut scenarios[&scenario_id];
        let current = scenario
            .max_cf_overrides
            .get(&generator_id)
            .unwrap_or(&generators[&generator_id].max_cf);
        let updated = override_periods(current, &periods, raw.value, horizon).with_context(|| {
            format!("Invalid availability for generator {generator_id} in scenario {scenario_id}")
        })?;
        scenario.max_cf_overrides.insert(generator_id, updated);
    }

    Ok(())
}
