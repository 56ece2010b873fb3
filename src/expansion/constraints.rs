//! Code for adding constraints to the expansion problem.
use super::variables::VariableArena;
use crate::portfolio::Portfolio;
use crate::solver::{Constraint, ConstraintSense, LinearExpr, Problem};

/// Link capacity across periods.
///
/// For the first period capacity is the initial capacity plus investment minus decommissioning;
/// for later periods it is the previous period's capacity plus investment minus decommissioning.
/// This is the only constraint coupling periods.
///
/// # Returns
///
/// The constraints, ordered by generator then period.
pub fn add_capacity_recurrence_constraints(
    problem: &mut Problem,
    portfolio: &Portfolio,
    capacity: &VariableArena,
    investment: &VariableArena,
    decommission: &VariableArena,
) -> Vec<Constraint> {
    let mut constraints = Vec::with_capacity(capacity.len());
    for (g, generator) in portfolio.iter_generators().enumerate() {
        for t in 0..portfolio.horizon() {
            let mut expr = LinearExpr::new();
            expr.add_term(capacity.get(g, t), 1.0);
            expr.add_term(investment.get(g, t), -1.0);
            expr.add_term(decommission.get(g, t), 1.0);

            let rhs = if t == 0 {
                generator.initial_capacity.value()
            } else {
                expr.add_term(capacity.get(g, t - 1), -1.0);
                0.0
            };

            let name = format!("capacity_recurrence[{},{t}]", generator.id);
            constraints.push(problem.add_linear_constraint(
                expr,
                ConstraintSense::Equal,
                rhs,
                name,
            ));
        }
    }

    constraints
}

/// Require total generation to meet load in every period.
///
/// Generation in excess of load is allowed (i.e. curtailment).
pub fn add_balance_constraints(
    problem: &mut Problem,
    portfolio: &Portfolio,
    generation: &VariableArena,
    label: &str,
) -> Vec<Constraint> {
    portfolio
        .load()
        .iter()
        .enumerate()
        .map(|(t, load)| {
            let expr = (0..portfolio.num_generators())
                .map(|g| (generation.get(g, t), 1.0))
                .collect();
            problem.add_linear_constraint(
                expr,
                ConstraintSense::GreaterEqual,
                load.value(),
                format!("balance[{label},{t}]"),
            )
        })
        .collect()
}

/// Bound each generator's output by its capacity multiplied by its capacity factors.
///
/// Generation is bounded above by `max_cf * capacity` and below by `min_cf * capacity`. Floor
/// constraints are omitted where `min_cf` is zero, as they would be implied by the variable bounds.
pub fn add_dispatch_limit_constraints(
    problem: &mut Problem,
    portfolio: &Portfolio,
    capacity: &VariableArena,
    generation: &VariableArena,
    label: &str,
) {
    for (g, generator) in portfolio.iter_generators().enumerate() {
        for t in 0..portfolio.horizon() {
            let max_cf = generator.max_cf.get(t).value();
            let ceiling = [(generation.get(g, t), 1.0), (capacity.get(g, t), -max_cf)];
            problem.add_linear_constraint(
                ceiling.into_iter().collect(),
                ConstraintSense::LessEqual,
                0.0,
                format!("dispatch_ceiling[{label},{},{t}]", generator.id),
            );

            let min_cf = generator.min_cf.get(t).value();
            if min_cf > 0.0 {
                let floor = [(generation.get(g, t), 1.0), (capacity.get(g, t), -min_cf)];
                problem.add_linear_constraint(
                    floor.into_iter().collect(),
                    ConstraintSense::GreaterEqual,
                    0.0,
                    format!("dispatch_floor[{label},{},{t}]", generator.id),
                );
            }
        }
    }
}
