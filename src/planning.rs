//! Functionality for running a planning model end to end.
use crate::expansion::{ExpansionModel, ExpansionOptions};
use crate::model::Model;
use crate::output::write_results;
use crate::results::ExpansionResults;
use crate::solver::SolverOptions;
use crate::stochastic::{StochasticModel, StochasticOptions};
use anyhow::{Context, Result};
use log::{LevelFilter, info};
use std::path::Path;

/// Build the solver options for a model.
///
/// HiGHS only prints to the console when debug messages are being logged.
fn solver_options(model: &Model) -> SolverOptions {
    SolverOptions {
        time_limit: model.parameters.time_limit,
        log_to_console: log::max_level() >= LevelFilter::Debug,
    }
}

/// Formulate and solve the model.
///
/// The stochastic model is used if the model has scenarios, otherwise the single-scenario
/// expansion model.
pub fn solve(model: &Model) -> Result<ExpansionResults> {
    let expansion = ExpansionOptions {
        discount_rate: model.parameters.discount_rate,
        solver: solver_options(model),
    };

    let results = if let Some(scenarios) = &model.scenarios {
        info!("Solving stochastic model with {} scenarios", scenarios.len());
        let options = StochasticOptions {
            expansion,
            objective_mode: model.parameters.objective_mode,
        };
        let mut stochastic = StochasticModel::new(&model.portfolio, scenarios, &options)?;
        stochastic.optimise()?;
        stochastic.results()?
    } else {
        info!("Solving expansion model");
        let mut expansion = ExpansionModel::new(&model.portfolio, &expansion)?;
        expansion.optimise()?;
        expansion.results()?
    };
    info!("Objective value: {}", results.objective_value);

    Ok(results)
}

/// Run the model and write the results.
///
/// # Arguments:
///
/// * `model` - The model to run
/// * `model_path` - The folder the model was loaded from
/// * `output_path` - The folder to which results are written
pub fn run(model: &Model, model_path: &Path, output_path: &Path) -> Result<ExpansionResults> {
    info!(
        "Planning {} generators over {} periods",
        model.portfolio.num_generators(),
        model.portfolio.horizon()
    );

    let results = solve(model).context("Failed to solve model.")?;
    write_results(output_path, model_path, &results).context("Failed to write results.")?;

    Ok(results)
}
