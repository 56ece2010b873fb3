//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::finance::check_discount_rate;
use crate::input::{input_err_msg, read_toml};
use crate::stochastic::ObjectiveMode;
use crate::units::{Dimensionless, MoneyPerEmissions};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

/// Represents the contents of the entire model file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModelParameters {
    /// Emissions price, applied in every period
    pub co2_price: MoneyPerEmissions,
    /// Rate at which costs in later periods are discounted
    #[serde(default)]
    pub discount_rate: Dimensionless,
    /// How scenario costs are combined in the objective
    #[serde(default)]
    pub objective_mode: ObjectiveMode,
    /// Maximum time for the solver, in seconds
    #[serde(default)]
    pub time_limit: Option<f64>,
}

/// Check that the `time_limit` parameter is valid
fn check_time_limit(value: Option<f64>) -> Result<()> {
    if let Some(value) = value {
        ensure!(
            value.is_finite() && value > 0.0,
            "time_limit must be a finite number greater than zero"
        );
    }

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        ensure!(
            self.co2_price.is_finite() && self.co2_price >= MoneyPerEmissions(0.0),
            "co2_price must be a finite number greater than or equal to zero"
        );
        check_discount_rate(self.discount_rate)?;
        check_time_limit(self.time_limit)?;

        Ok(())
    }
}
