//! Extraction of results from a solved expansion problem.
use crate::expansion::Formulation;
use crate::expansion::variables::VariableArena;
use crate::generator::GeneratorID;
use crate::scenario::ScenarioID;
use crate::solver::{ResultsError, get_solution};
use crate::units::{Capacity, Energy, Money};
use indexmap::IndexMap;

/// Results for a single generator, ordered by period
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorResults {
    /// Installed capacity
    pub capacity: Vec<Capacity>,
    /// New capacity
    pub investment: Vec<Capacity>,
    /// Decommissioned capacity
    pub decommission: Vec<Capacity>,
    /// Generation, with one sequence per scenario (in scenario order)
    pub generation: Vec<Vec<Energy>>,
}

/// The results of a solved expansion problem
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionResults {
    /// The value of the objective at the optimum
    pub objective_value: Money,
    /// The scenario IDs, in the order used for [`GeneratorResults::generation`]
    pub scenario_ids: Vec<ScenarioID>,
    /// Results for each generator, in report order
    pub generators: IndexMap<GeneratorID, GeneratorResults>,
}

impl ExpansionResults {
    /// Read the values of every variable in the formulation.
    ///
    /// Fails if the problem has not been solved or no optimal solution was found. No partial
    /// results are returned.
    pub fn extract(formulation: &Formulation) -> Result<Self, ResultsError> {
        let solution = get_solution(formulation.solution.as_ref())?;
        let values = |arena: &VariableArena, g: usize| -> Result<Vec<f64>, ResultsError> {
            arena
                .iter_generator(g)
                .map(|var| solution.variable_value(var))
                .collect()
        };

        let plan = &formulation.plan;
        let mut generators = IndexMap::new();
        for (g, id) in plan.generator_ids.iter().enumerate() {
            let generation = formulation
                .scenarios
                .iter()
                .map(|scenario| Ok(to_units(values(&scenario.generation, g)?, Energy)))
                .collect::<Result<_, ResultsError>>()?;

            let results = GeneratorResults {
                capacity: to_units(values(&plan.capacity, g)?, Capacity),
                investment: to_units(values(&plan.investment, g)?, Capacity),
                decommission: to_units(values(&plan.decommission, g)?, Capacity),
                generation,
            };
            generators.insert(id.clone(), results);
        }

        Ok(Self {
            objective_value: solution.objective_value().map(Money)?,
            scenario_ids: formulation
                .scenarios
                .iter()
                .map(|scenario| scenario.id.clone())
                .collect(),
            generators,
        })
    }

    /// The number of periods covered
    pub fn num_periods(&self) -> usize {
        self.generators
            .values()
            .next()
            .map_or(0, |results| results.capacity.len())
    }

    /// Total generation of each generator in one scenario, in report order
    pub fn total_generation(
        &self,
        scenario: usize,
    ) -> impl Iterator<Item = (&GeneratorID, Energy)> {
        self.generators
            .iter()
            .map(move |(id, results)| (id, results.generation[scenario].iter().copied().sum()))
    }
}

fn to_units<T, F: Fn(f64) -> T>(values: Vec<f64>, unit: F) -> Vec<T> {
    values.into_iter().map(unit).collect()
}
