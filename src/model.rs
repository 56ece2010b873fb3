//! The model represents the static input data provided by the user.
use crate::portfolio::Portfolio;
use crate::scenario::ScenarioSet;

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// Generators and load
    pub portfolio: Portfolio,
    /// Scenarios, if the model is stochastic
    pub scenarios: Option<ScenarioSet>,
}

impl Model {
    /// Whether the model has scenarios and should be solved as a stochastic problem
    pub fn is_stochastic(&self) -> bool {
        self.scenarios.is_some()
    }
}
