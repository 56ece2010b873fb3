//! Multi-period capacity expansion.
//!
//! The problem is built from two groups of variables:
//!
//! 1. An investment plan, shared by every scenario: capacity, investment and decommissioning for
//!    each generator in each period, linked across periods by the capacity recurrence.
//! 2. For each scenario, generation for each generator in each period, together with the balance
//!    and dispatch limit constraints which tie generation to the shared capacity.
//!
//! A plain expansion model has a single scenario; see [`crate::stochastic`] for several.
use crate::finance::{check_discount_rate, discount_multipliers};
use crate::generator::{Generator, GeneratorID};
use crate::portfolio::Portfolio;
use crate::results::ExpansionResults;
use crate::scenario::ScenarioID;
use crate::solver::{LinearExpr, ModelError, Problem, ResultsError, SolvedProblem, SolverOptions};
use crate::units::Dimensionless;
use anyhow::{Result, ensure};
use log::debug;

pub mod constraints;
use constraints::{
    add_balance_constraints, add_capacity_recurrence_constraints, add_dispatch_limit_constraints,
};
pub mod variables;
use variables::VariableArena;

/// The scenario ID used for the single scenario of a plain expansion model
pub const BASE_SCENARIO_ID: &str = "base";

/// Options for building an expansion model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpansionOptions {
    /// Rate at which costs in later periods are discounted. Zero disables discounting.
    pub discount_rate: Dimensionless,
    /// Options passed on to the solver
    pub solver: SolverOptions,
}

/// Variables shared between all scenarios
#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentPlan {
    /// The generators covered by the plan, in arena order
    pub generator_ids: Vec<GeneratorID>,
    /// Installed capacity
    pub capacity: VariableArena,
    /// New capacity
    pub investment: VariableArena,
    /// Decommissioned capacity
    pub decommission: VariableArena,
    /// Discounted fixed, capital and decommissioning costs, summed over periods
    pub cost: LinearExpr,
}

/// Variables and costs local to one scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioFormulation {
    /// The scenario's ID
    pub id: ScenarioID,
    /// Generation for each generator and period
    pub generation: VariableArena,
    /// Discounted total cost of the scenario, including the investment plan's cost
    pub cost: LinearExpr,
}

/// Adds investment plans and scenarios to a problem
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionFormulator {
    discount_rate: Dimensionless,
}

impl ExpansionFormulator {
    /// Create a new [`ExpansionFormulator`]
    pub fn new(discount_rate: Dimensionless) -> Result<Self> {
        check_discount_rate(discount_rate)?;
        Ok(Self { discount_rate })
    }

    /// Declare the investment plan: capacity, investment and decommissioning for each generator
    /// and period, plus the capacity recurrence constraints.
    ///
    /// This should be called exactly once per problem.
    pub fn add_investment_plan(
        &self,
        problem: &mut Problem,
        portfolio: &Portfolio,
    ) -> InvestmentPlan {
        let capacity = VariableArena::declare(problem, portfolio, "capacity", |generator| {
            (0.0, generator.max_capacity.value())
        });
        let unbounded = |_: &Generator| (0.0, f64::INFINITY);
        let investment = VariableArena::declare(problem, portfolio, "investment", unbounded);
        let decommission = VariableArena::declare(problem, portfolio, "decommission", unbounded);

        add_capacity_recurrence_constraints(
            problem,
            portfolio,
            &capacity,
            &investment,
            &decommission,
        );

        let multipliers = discount_multipliers(self.discount_rate, portfolio.horizon());
        let mut cost = LinearExpr::new();
        for (g, generator) in portfolio.iter_generators().enumerate() {
            for (t, multiplier) in multipliers.iter().enumerate() {
                let multiplier = multiplier.value();
                cost.add_term(
                    capacity.get(g, t),
                    multiplier * generator.fixed_opex.value(),
                );
                cost.add_term(investment.get(g, t), multiplier * generator.capex.value());
                cost.add_term(decommission.get(g, t), multiplier * generator.decex.value());
            }
        }

        InvestmentPlan {
            generator_ids: portfolio.generators().keys().cloned().collect(),
            capacity,
            investment,
            decommission,
            cost,
        }
    }

    /// Declare the generation variables and constraints for one scenario.
    ///
    /// `portfolio` is the scenario's view of the data. It must have the same generators, in the
    /// same order, and the same horizon as the portfolio the investment plan was declared with.
    pub fn add_scenario(
        &self,
        problem: &mut Problem,
        plan: &InvestmentPlan,
        portfolio: &Portfolio,
        id: ScenarioID,
    ) -> Result<ScenarioFormulation> {
        ensure!(
            portfolio.generators().keys().eq(plan.generator_ids.iter()),
            "Scenario {id} does not have the investment plan's generators in the same order"
        );
        ensure!(
            portfolio.horizon() == plan.capacity.num_periods(),
            "Scenario {id} covers {} periods but the investment plan covers {}",
            portfolio.horizon(),
            plan.capacity.num_periods()
        );

        let generation = VariableArena::declare(
            problem,
            portfolio,
            &format!("generation[{id}]"),
            |_| (0.0, f64::INFINITY),
        );
        add_balance_constraints(problem, portfolio, &generation, &id.0);
        add_dispatch_limit_constraints(problem, portfolio, &plan.capacity, &generation, &id.0);

        let multipliers = discount_multipliers(self.discount_rate, portfolio.horizon());
        let mut cost = plan.cost.clone();
        for (g, generator) in portfolio.iter_generators().enumerate() {
            let cost_rate = generator.variable_cost(portfolio.co2_price()).value();
            for (t, multiplier) in multipliers.iter().enumerate() {
                cost.add_term(generation.get(g, t), multiplier.value() * cost_rate);
            }
        }

        Ok(ScenarioFormulation {
            id,
            generation,
            cost,
        })
    }
}

/// A formulated problem: an investment plan and one or more scenarios
#[derive(Debug, Clone, PartialEq)]
pub struct Formulation {
    pub(crate) problem: Problem,
    pub(crate) plan: InvestmentPlan,
    pub(crate) scenarios: Vec<ScenarioFormulation>,
    pub(crate) solution: Option<SolvedProblem>,
}

impl Formulation {
    /// Declare the investment plan for a portfolio, with no scenarios yet
    pub(crate) fn new(formulator: &ExpansionFormulator, portfolio: &Portfolio) -> Self {
        let mut problem = Problem::new();
        let plan = formulator.add_investment_plan(&mut problem, portfolio);

        Self {
            problem,
            plan,
            scenarios: Vec::new(),
            solution: None,
        }
    }

    /// Solve the problem, keeping the outcome for later result extraction
    pub(crate) fn solve(&mut self, options: &SolverOptions) -> Result<(), ModelError> {
        debug!(
            "Formulated problem has {} variables and {} constraints over {} scenario(s)",
            self.problem.num_variables(),
            self.problem.num_constraints(),
            self.scenarios.len()
        );

        let solved = self.problem.solve(options)?;
        let outcome = solved
            .ensure_optimal()
            .map_err(|_| ModelError::NonOptimal(solved.status()));
        self.solution = Some(solved);
        outcome
    }

    /// The underlying problem
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// The shared investment plan
    pub fn plan(&self) -> &InvestmentPlan {
        &self.plan
    }

    /// The scenarios, in order
    pub fn scenarios(&self) -> &[ScenarioFormulation] {
        &self.scenarios
    }
}

/// A multi-period expansion model with a single scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionModel {
    formulation: Formulation,
    solver_options: SolverOptions,
}

impl ExpansionModel {
    /// Formulate the expansion problem for a portfolio
    pub fn new(portfolio: &Portfolio, options: &ExpansionOptions) -> Result<Self> {
        let formulator = ExpansionFormulator::new(options.discount_rate)?;
        let mut formulation = Formulation::new(&formulator, portfolio);
        let scenario = formulator.add_scenario(
            &mut formulation.problem,
            &formulation.plan,
            portfolio,
            BASE_SCENARIO_ID.into(),
        )?;
        formulation.problem.set_objective(scenario.cost.clone());
        formulation.scenarios.push(scenario);

        debug!(
            "Formulated expansion problem for {} generators over {} periods",
            portfolio.num_generators(),
            portfolio.horizon()
        );

        Ok(Self {
            formulation,
            solver_options: options.solver.clone(),
        })
    }

    /// Solve the model.
    ///
    /// The outcome is kept even if no optimal solution is found, so that [`Self::results`] can
    /// report why.
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{conventional, solar, wind, worked_example, worked_example_with_price};
    use crate::units::{Capacity, Energy, MoneyPerCapacity, MoneyPerEmissions, MoneyPerEnergy};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    const TOLERANCE: f64 = 1e-6;

    fn solve(portfolio: &Portfolio, discount_rate: f64) -> ExpansionResults {
        let options = ExpansionOptions {
            discount_rate: Dimensionless(discount_rate),
            ..Default::default()
        };
        let mut model = ExpansionModel::new(portfolio, &options).unwrap();
        model.optimise().unwrap();
        model.results().unwrap()
    }

    /// One generator, no initial capacity, constant load of 5 over two periods
    fn single_generator() -> Portfolio {
        let generator = Generator {
            capex: MoneyPerCapacity(10.0),
            fixed_opex: MoneyPerCapacity(1.0),
            var_opex: MoneyPerEnergy(2.0),
            ..Generator::new("gen")
        };
        Portfolio::new([generator], vec![Energy(5.0); 2], MoneyPerEmissions(0.0)).unwrap()
    }

    #[rstest]
    #[case(0.0, 80.0)] // capex 50, fixed opex 2 * 5, variable opex 2 * 10
    #[case(1.0, 72.5)] // second period costs are halved
    fn single_generator_objective(#[case] discount_rate: f64, #[case] expected: f64) {
        let results = solve(&single_generator(), discount_rate);
        assert_approx_eq!(
            f64,
            results.objective_value.value(),
            expected,
            epsilon = TOLERANCE
        );

        let gen_results = &results.generators["gen"];
        for t in 0..2 {
            assert_approx_eq!(
                f64,
                gen_results.capacity[t].value(),
                5.0,
                epsilon = TOLERANCE
            );
            assert_approx_eq!(
                f64,
                gen_results.generation[0][t].value(),
                5.0,
                epsilon = TOLERANCE
            );
        }
        assert_approx_eq!(
            f64,
            gen_results.investment[0].value(),
            5.0,
            epsilon = TOLERANCE
        );
    }

    #[rstest]
    fn worked_example_recurrence(worked_example: Portfolio) {
        let results = solve(&worked_example, 0.0);

        for (id, generator) in worked_example.generators() {
            let gen_results = &results.generators[id];
            let mut previous = generator.initial_capacity;
            for t in 0..worked_example.horizon() {
                let residual = gen_results.capacity[t] - previous - gen_results.investment[t]
                    + gen_results.decommission[t];
                assert_approx_eq!(f64, residual.value(), 0.0, epsilon = TOLERANCE);
                previous = gen_results.capacity[t];
            }
        }
    }

    #[rstest]
    fn worked_example_dispatch(worked_example: Portfolio) {
        let results = solve(&worked_example, 0.0);

        for t in 0..worked_example.horizon() {
            let total: Energy = results
                .generators
                .values()
                .map(|gen_results| gen_results.generation[0][t])
                .sum();
            assert!(total.value() >= worked_example.load()[t].value() - TOLERANCE);

            for (id, generator) in worked_example.generators() {
                let gen_results = &results.generators[id];
                let capacity = gen_results.capacity[t].value();
                let generation = gen_results.generation[0][t].value();
                assert!(generation <= capacity * generator.max_cf.get(t).value() + TOLERANCE);
                assert!(generation >= capacity * generator.min_cf.get(t).value() - TOLERANCE);
                assert!(capacity <= generator.max_capacity.value() + TOLERANCE);
            }
        }

        // Conv is needed in the last period, when renewables cannot meet load
        assert!(results.generators["Conv"].capacity[3] > Capacity(0.0));
    }

    #[test]
    fn raising_co2_price_increases_cost() {
        let objectives: Vec<_> = [0.0, 20.0, 40.0]
            .into_iter()
            .map(|price| solve(&worked_example_with_price(price), 0.0).objective_value)
            .collect();

        assert!(objectives[0] <= objectives[1]);
        assert!(objectives[1] <= objectives[2]);
        assert!(objectives[0] < objectives[2]);
    }

    #[test]
    fn infeasible_capacity_limit() {
        let generator = Generator {
            max_capacity: Capacity(1.0),
            ..Generator::new("gen")
        };
        let portfolio =
            Portfolio::new([generator], vec![Energy(5.0)], MoneyPerEmissions(0.0)).unwrap();
        let mut model = ExpansionModel::new(&portfolio, &ExpansionOptions::default()).unwrap();

        assert!(matches!(model.results(), Err(ResultsError::NotSolved)));
        assert!(matches!(model.optimise(), Err(ModelError::NonOptimal(_))));
        assert!(matches!(model.results(), Err(ResultsError::NonOptimal(_))));
    }

    #[rstest]
    fn invalid_discount_rate(worked_example: Portfolio) {
        let options = ExpansionOptions {
            discount_rate: Dimensionless(-0.5),
            ..Default::default()
        };
        assert!(ExpansionModel::new(&worked_example, &options).is_err());
    }

    #[rstest]
    fn add_scenario_with_mismatched_portfolio(worked_example: Portfolio) {
        let formulator = ExpansionFormulator::new(Dimensionless(0.0)).unwrap();
        let mut problem = Problem::new();
        let plan = formulator.add_investment_plan(&mut problem, &worked_example);
        let other = single_generator();
        assert!(
            formulator
                .add_scenario(&mut problem, &plan, &other, "s".into())
                .is_err()
        );
    }

    #[rstest]
    fn add_scenario_with_reordered_generators(worked_example: Portfolio) {
        let formulator = ExpansionFormulator::new(Dimensionless(0.0)).unwrap();
        let mut problem = Problem::new();
        let plan = formulator.add_investment_plan(&mut problem, &worked_example);
        assert_eq!(
            plan.generator_ids,
            ["Wind", "Solar", "Conv"].map(GeneratorID::from)
        );

        // Same generators and horizon, but generation would be paired with the wrong capacity
        let reordered = Portfolio::new(
            [solar(), wind(), conventional()],
            worked_example.load().to_vec(),
            worked_example.co2_price(),
        )
        .unwrap();
        let error = formulator
            .add_scenario(&mut problem, &plan, &reordered, "s".into())
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Scenario s does not have the investment plan's generators in the same order"
        );

        // The original order is accepted
        assert!(
            formulator
                .add_scenario(&mut problem, &plan, &worked_example, "s".into())
                .is_ok()
        );
    }

    #[rstest]
    fn variable_counts(worked_example: Portfolio) {
        let model = ExpansionModel::new(&worked_example, &ExpansionOptions::default()).unwrap();
        // capacity, investment, decommission and generation for 3 generators and 4 periods
        assert_eq!(model.formulation().problem().num_variables(), 4 * 3 * 4);
    }
}
