//! Code for reading generators from a CSV file.
use super::{deserialise_optional_limit, input_err_msg, read_csv};
use crate::generator::{CapacityFactors, Generator};
use crate::portfolio::GeneratorMap;
use crate::units::{Capacity, EmissionsPerEnergy, MoneyPerCapacity, MoneyPerEnergy};
use anyhow::{Context, Result, bail};
use indexmap::map::Entry;
use serde::Deserialize;
use std::path::Path;

const GENERATORS_FILE_NAME: &str = "generators.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct GeneratorRaw {
    id: String,
    capex: MoneyPerCapacity,
    fixed_opex: MoneyPerCapacity,
    var_opex: MoneyPerEnergy,
    decex: MoneyPerCapacity,
    initial_capacity: Capacity,
    #[serde(deserialize_with = "deserialise_optional_limit")]
    max_capacity: f64,
    #[serde(default)]
    min_cf: Option<f64>,
    #[serde(default)]
    max_cf: Option<f64>,
    co2: EmissionsPerEnergy,
}

impl From<GeneratorRaw> for Generator {
    fn from(raw: GeneratorRaw) -> Self {
        let default = Generator::new(&raw.id);
        Generator {
            capex: raw.capex,
            fixed_opex: raw.fixed_opex,
            var_opex: raw.var_opex,
            decex: raw.decex,
            initial_capacity: raw.initial_capacity,
            max_capacity: Capacity(raw.max_capacity),
            min_cf: raw.min_cf.map_or(default.min_cf.clone(), CapacityFactors::from),
            max_cf: raw.max_cf.map_or(default.max_cf.clone(), CapacityFactors::from),
            co2: raw.co2,
            ..default
        }
    }
}

/// Read generators from the model directory.
///
/// Capacity factors given here apply to every period. Per-period values are read separately (see
/// `generator_availability.csv`). Parameters are validated when the portfolio is built.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The generators, in the order they appear in the file.
pub fn read_generators(model_dir: &Path) -> Result<GeneratorMap> {
    let file_path = model_dir.join(GENERATORS_FILE_NAME);
    let generators_csv = read_csv(&file_path)?;
    read_generators_from_iter(generators_csv).with_context(|| input_err_msg(&file_path))
}

fn read_generators_from_iter<I>(iter: I) -> Result<GeneratorMap>
where
    I: Iterator<Item = GeneratorRaw>,
{
    let mut generators = GeneratorMap::new();
    for raw in iter {
        let generator = Generator::from(raw);
        match generators.entry(generator.id.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(generator);
            }
            Entry::Occupied(entry) => bail!("Duplicate generator ID: {}", entry.key()),
        }
    }

    Ok(generators)
}
