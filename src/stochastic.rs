//! Stochastic expansion over several scenarios.
//!
//! All scenarios share one investment plan, so capacity, investment and decommissioning are
//! decided once. Each scenario gets its own generation variables and constraints, derived from the
//! base portfolio with the scenario's adjustments applied. The objective is the weighted sum of the
//! scenarios' costs.
use crate::expansion::{ExpansionFormulator, ExpansionOptions, Formulation};
use crate::portfolio::Portfolio;
use crate::results::ExpansionResults;
use crate::scenario::ScenarioSet;
use crate::solver::{LinearExpr, ModelError, ResultsError, SolverOptions};
use anyhow::Result;
use log::debug;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

/// How the weighted scenario costs are passed to the solver
#[derive(
    Debug, Clone, Copy, PartialEq, Default, SerializeLabeledStringEnum, DeserializeLabeledStringEnum,
)]
pub enum ObjectiveMode {
    /// Sum the weighted costs into a single objective expression
    #[default]
    #[string = "scalarised"]
    Scalarised,
    /// Give each scenario its own weighted objective term
    #[string = "weighted_terms"]
    WeightedTerms,
}

/// Options for building a stochastic model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StochasticOptions {
    /// Options shared with the single-scenario model
    pub expansion: ExpansionOptions,
    /// How the objective is built
    pub objective_mode: ObjectiveMode,
}

/// An expansion model with several scenarios sharing one investment plan
#[derive(Debug, Clone, PartialEq)]
pub struct StochasticModel {
    formulation: Formulation,
    solver_options: SolverOptions,
}

impl StochasticModel {
    /// Formulate the stochastic problem.
    ///
    /// The base portfolio is not modified. Scenarios are added in order, each seeing the base
    /// portfolio with only its own adjustments applied.
    pub fn new(
        portfolio: &Portfolio,
        scenarios: &ScenarioSet,
        options: &StochasticOptions,
    ) -> Result<Self> {
        scenarios.validate(portfolio)?;

        let formulator = ExpansionFormulator::new(options.expansion.discount_rate)?;
        let mut formulation = Formulation::new(&formulator, portfolio);
        let mut objective = LinearExpr::new();
        for (s, scenario) in scenarios.iter().enumerate() {
            let adjusted = scenario.apply(portfolio)?;
            let formulated = formulator.add_scenario(
                &mut formulation.problem,
                &formulation.plan,
                &adjusted,
                scenario.id.clone(),
            )?;

            let weight = scenario.weight.value();
            match options.objective_mode {
                ObjectiveMode::Scalarised => objective.add_scaled(&formulated.cost, weight),
                ObjectiveMode::WeightedTerms => formulation.problem.set_weighted_objective_term(
                    formulated.cost.clone(),
                    s,
                    weight,
                ),
            }
            formulation.scenarios.push(formulated);
        }
        if options.objective_mode == ObjectiveMode::Scalarised {
            formulation.problem.set_objective(objective);
        }

        debug!(
            "Formulated stochastic problem for {} generators over {} periods with {} scenarios",
            portfolio.num_generators(),
            portfolio.horizon(),
            scenarios.len()
        );

        Ok(Self {
            formulation,
            solver_options: options.expansion.solver.clone(),
        })
    }

    /// Solve the model.
    ///
    /// If any scenario is infeasible, the whole model is.
    pub fn optimise(&mut self) -> Result<(), ModelError> {
        self.formulation.solve(&self.solver_options)
    }

    /// Extract the results of an optimal solve
    pub fn results(&self) -> Result<ExpansionResults, ResultsError> {
        ExpansionResults::extract(&self.formulation)
    }

    /// The formulated problem
    pub fn formulation(&self) -> &Formulation {
        &self.formulation
    }
}
