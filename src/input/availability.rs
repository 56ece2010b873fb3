//! Code for reading per-period capacity factors for generators.
use super::{input_err_msg, read_csv_optional};
use crate::generator::CapacityFactors;
use crate::id::IDCollection;
use crate::period::parse_period_str;
use crate::portfolio::GeneratorMap;
use crate::units::Dimensionless;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::path::Path;

const GENERATOR_AVAILABILITY_FILE_NAME: &str = "generator_availability.csv";

/// Which capacity factor limit a value applies to
#[derive(PartialEq, Debug, Clone, Copy, DeserializeLabeledStringEnum)]
enum LimitType {
    #[string = "lo"]
    LowerBound,
    #[string = "up"]
    UpperBound,
}

#[derive(PartialEq, Debug, Deserialize)]
struct GeneratorAvailabilityRaw {
    generator_id: String,
    periods: String,
    limit_type: LimitType,
    value: Dimensionless,
}

/// Replace the capacity factors for the given periods, leaving other periods unchanged
pub(super) fn override_periods(
    factors: &CapacityFactors,
    periods: &[usize],
    value: Dimensionless,
    horizon: usize,
) -> Result<CapacityFactors> {
    factors.check_horizon(horizon)?;
    ensure!(
        value.is_finite() && value >= Dimensionless(0.0),
        "Capacity factors must be finite and non-negative"
    );

    let mut values = factors.to_vec(horizon);
    for &t in periods {
        values[t] = value;
    }

    Ok(CapacityFactors::PerPeriod(values))
}

/// Read per-period capacity factors and apply them to generators.
///
/// The file is optional. Periods not mentioned keep the values from `generators.csv`.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `generators` - Generators to update
/// * `horizon` - Number of periods in the model
pub fn read_generator_availability(
    model_dir: &Path,
    generators: &mut GeneratorMap,
    horizon: usize,
) -> Result<()> {
    let file_path = model_dir.join(GENERATOR_AVAILABILITY_FILE_NAME);
    let availability_csv = read_csv_optional(&file_path)?;
    apply_availability_from_iter(availability_csv, generators, horizon)
        .with_context(|| input_err_msg(&file_path))
}

fn apply_availability_from_iter<I>(
    iter: I,
    generators: &mut GeneratorMap,
    horizon: usize,
) -> Result<()>
where
    I: Iterator<Item = GeneratorAvailabilityRaw>,
{
    for raw in iter {
        let id = generators.get_id(&raw.generator_id)?;
        let periods = parse_period_str(&raw.periods, horizon)?;
        let generator = &mut generators[&id];
        let factors = match raw.limit_type {
            LimitType::LowerBound => &mut generator.min_cf,
            LimitType::UpperBound => &mut generator.max_cf,
        };
        *factors = override_periods(factors, &periods, raw.value, horizon)
            .with_context(|| format!("Invalid availability for generator {id}"))?;
    }

    Ok(())
}
