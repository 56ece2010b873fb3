//! Single-period dispatch.
//!
//! Load in one period is met at least cost by a set of units, each with a cost per unit of energy.
//! Total dispatch must equal load exactly.
use crate::generator::GeneratorID;
use crate::solver::{
    ConstraintSense, LinearExpr, ModelError, Problem, ResultsError, SolvedProblem, SolverOptions,
    Variable, get_solution,
};
use crate::units::{
    Capacity, Dimensionless, EmissionsPerEnergy, Energy, Money, MoneyPerEmissions, MoneyPerEnergy,
};
use anyhow::{Context, Result, ensure};
use indexmap::{IndexMap, IndexSet};
use log::debug;

/// How a unit's dispatch is bounded
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchBounds {
    /// The unit's capacity is to be sized within `[min, max]`.
    ///
    /// Dispatch is `capacity_factor` multiplied by the capacity. `max` may be infinite.
    Capacity {
        /// Minimum capacity
        min: Capacity,
        /// Maximum capacity
        max: Capacity,
        /// Fraction of capacity which is dispatched
        capacity_factor: Dimensionless,
    },
    /// The unit has a fixed capacity and dispatch lies between `min_cf` and `max_cf` of it
    CapacityFactor {
        /// Installed capacity
        capacity: Capacity,
        /// Minimum fraction of capacity dispatched
        min_cf: Dimensionless,
        /// Maximum fraction of capacity dispatched
        max_cf: Dimensionless,
    },
}

impl DispatchBounds {
    /// Bounds on capacity to be sized, with dispatch equal to capacity
    pub fn capacity(min: f64, max: f64) -> Self {
        Self::Capacity {
            min: Capacity(min),
            max: Capacity(max),
            capacity_factor: Dimensionless(1.0),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Self::Capacity {
                min,
                max,
                capacity_factor,
            } => {
                ensure!(
                    min.is_finite() && *min >= Capacity(0.0),
                    "Minimum capacity must be finite and non-negative"
                );
                ensure!(min <= max, "Minimum capacity is greater than maximum");
                ensure!(
                    capacity_factor.is_finite() && *capacity_factor > Dimensionless(0.0),
                    "Capacity factor must be finite and positive"
                );
            }
            Self::CapacityFactor {
                capacity,
                min_cf,
                max_cf,
            } => {
                ensure!(
                    capacity.is_finite() && *capacity >= Capacity(0.0),
                    "Capacity must be finite and non-negative"
                );
                ensure!(
                    min_cf.is_finite() && max_cf.is_finite() && *min_cf >= Dimensionless(0.0),
                    "Capacity factors must be finite and non-negative"
                );
                ensure!(
                    min_cf <= max_cf,
                    "Minimum capacity factor is greater than maximum"
                );
            }
        }

        Ok(())
    }

    /// Bounds of the decision variable
    fn variable_bounds(&self) -> (f64, f64) {
        match self {
            Self::Capacity { min, max, .. } => (min.value(), max.value()),
            Self::CapacityFactor {
                capacity,
                min_cf,
                max_cf,
            } => (
                (*capacity * *min_cf).value(),
                (*capacity * *max_cf).value(),
            ),
        }
    }

    /// Energy dispatched per unit of the decision variable
    fn dispatch_per_unit(&self) -> f64 {
        match self {
            Self::Capacity {
                capacity_factor, ..
            } => capacity_factor.value(),
            Self::CapacityFactor { .. } => 1.0,
        }
    }
}

/// A unit which can be dispatched
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchUnit {
    /// The unit's ID
    pub id: GeneratorID,
    /// Cost of each unit of energy dispatched, excluding emissions
    pub cost_rate: MoneyPerEnergy,
    /// Emissions per unit of energy dispatched
    pub co2: EmissionsPerEnergy,
    /// Bounds on dispatch
    pub bounds: DispatchBounds,
}

/// Dispatch for a single unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitDispatch {
    /// Energy dispatched
    pub dispatch: Energy,
    /// The unit's capacity (sized by the optimisation for [`DispatchBounds::Capacity`])
    pub capacity: Capacity,
}

/// Results of a dispatch optimisation
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResults {
    /// Total cost of dispatch
    pub objective_value: Money,
    /// Dispatch for each unit, in the order given
    pub units: IndexMap<GeneratorID, UnitDispatch>,
}

/// A single-period dispatch model
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchModel {
    problem: Problem,
    units: Vec<DispatchUnit>,
    variables: Vec<Variable>,
    solver_options: SolverOptions,
    solution: Option<SolvedProblem>,
}

impl DispatchModel {
    /// Formulate the dispatch problem.
    ///
    /// # Arguments
    ///
    /// * `load` - Energy which must be dispatched
    /// * `co2_price` - Emissions price
    /// * `units` - The units available, in report order
    pub fn new(load: Energy, co2_price: MoneyPerEmissions, units: Vec<DispatchUnit>) -> Result<Self> {
        ensure!(
            load.is_finite() && load >= Energy(0.0),
            "Load must be finite and non-negative"
        );
        ensure!(
            co2_price.is_finite() && co2_price >= MoneyPerEmissions(0.0),
            "CO2 price must be finite and non-negative"
        );
        ensure!(!units.is_empty(), "At least one unit is required");

        let mut ids = IndexSet::new();
        for unit in &units {
            ensure!(ids.insert(&unit.id), "Duplicate unit ID: {}", unit.id);
            ensure!(
                unit.cost_rate.is_finite() && unit.co2.is_finite(),
                "Costs for unit {} must be finite",
                unit.id
            );
            unit.bounds
                .validate()
                .with_context(|| format!("Invalid bounds for unit {}", unit.id))?;
        }

        let mut problem = Problem::new();
        let mut objective = LinearExpr::new();
        let mut balance = LinearExpr::new();
        let variables = units
            .iter()
            .map(|unit| {
                let (lower, upper) = unit.bounds.variable_bounds();
                let var = problem.create_variable(format!("dispatch[{}]", unit.id), lower, upper);
                let per_unit = unit.bounds.dispatch_per_unit();
                let cost_rate = unit.cost_rate + unit.co2 * co2_price;
                objective.add_term(var, cost_rate.value() * per_unit);
                balance.add_term(var, per_unit);
                var
            })
            .collect();
        problem.add_linear_constraint(
            balance,
            ConstraintSense::Equal,
            load.value(),
            "balance".into(),
        );
        problem.set_objective(objective);

        debug!("Formulated dispatch problem with {} units", units.len());

        Ok(Self {
            problem,
            units,
            variables,
            solver_options: SolverOptions::default(),
            solution: None,
        })
    }

    /// Use the given options when solving
    pub fn with_solver_options(mut self, solver_options: SolverOptions) -> Self {
        self.solver_options = solver_options;
        self
    }

    /// Solve the model, keeping the outcome for [`Self::results`]
    pub fn optimise(&mut self) -> Result<(), ModelError> {
        let solved = self.problem.solve(&self.solver_options)?;
        let outcome = solved
            .ensure_optimal()
            .map_err(|_| ModelError::NonOptimal(solved.status()));
        self.solution = Some(solved);
        outcome
    }

    /// Extract the results of an optimal solve
    pub fn results(&self) -> Result<DispatchResults, ResultsError> {
        let solution = get_solution(self.solution.as_ref())?;

        let mut units = IndexMap::new();
        for (unit, var) in self.units.iter().zip(&self.variables) {
            let value = solution.variable_value(*var)?;
            let result = match &unit.bounds {
                DispatchBounds::Capacity {
                    capacity_factor, ..
                } => UnitDispatch {
                    dispatch: Energy(value * capacity_factor.value()),
                    capacity: Capacity(value),
                },
                DispatchBounds::CapacityFactor { capacity, .. } => UnitDispatch {
                    dispatch: Energy(value),
                    capacity: *capacity,
                },
            };
            units.insert(unit.id.clone(), result);
        }

        Ok(DispatchResults {
            objective_value: Money(solution.objective_value()?),
            units,
        })
    }
}
