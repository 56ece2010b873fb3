//! Dense storage for decision variables indexed by generator and period.
use crate::generator::Generator;
use crate::portfolio::Portfolio;
use crate::solver::{Problem, Variable};

/// Variables for every (generator, period) combination, stored contiguously.
///
/// Generators are indexed in the order of the portfolio and periods from zero.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableArena {
    num_periods: usize,
    variables: Vec<Variable>,
}

impl VariableArena {
    /// Declare one variable per (generator, period) in the problem.
    ///
    /// # Arguments
    ///
    /// * `problem` - The problem to add variables to
    /// * `portfolio` - Provides generators and the horizon
    /// * `prefix` - Used to name variables, e.g. `capacity` gives `capacity[Wind,0]`
    /// * `bounds` - Lower and upper bound for a generator's variables
    pub fn declare<F>(problem: &mut Problem, portfolio: &Portfolio, prefix: &str, bounds: F) -> Self
    where
        F: Fn(&Generator) -> (f64, f64),
    {
        let num_periods = portfolio.horizon();
        let mut variables = Vec::with_capacity(portfolio.num_generators() * num_periods);
        for generator in portfolio.iter_generators() {
            let (lower, upper) = bounds(generator);
            for t in 0..num_periods {
                let name = format!("{prefix}[{},{t}]", generator.id);
                variables.push(problem.create_variable(name, lower, upper));
            }
        }

        Self {
            num_periods,
            variables,
        }
    }

    /// Get the variable for generator `g` in period `t`
    pub fn get(&self, g: usize, t: usize) -> Variable {
        assert!(t < self.num_periods, "Period {t} out of range");
        self.variables[g * self.num_periods + t]
    }

    /// The number of generators covered
    pub fn num_generators(&self) -> usize {
        self.variables.len().checked_div(self.num_periods).unwrap_or(0)
    }

    /// The number of periods covered
    pub fn num_periods(&self) -> usize {
        self.num_periods
    }

    /// Iterate over the variables for generator `g`, in period order
    pub fn iter_generator(&self, g: usize) -> impl Iterator<Item = Variable> + '_ {
        self.variables[g * self.num_periods..(g + 1) * self.num_periods]
            .iter()
            .copied()
    }

    /// The total number of variables
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether there are no variables
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::worked_example;
    use rstest::rstest;

    #[rstest]
    fn declare_arena(worked_example: Portfolio) {
        let mut problem = Problem::new();
        let arena = VariableArena::declare(&mut problem, &worked_example, "capacity", |g| {
            (0.0, g.max_capacity.value())
        });

        assert_eq!(arena.len(), 12);
        assert_eq!(arena.num_generators(), 3);
        assert_eq!(arena.num_periods(), 4);
        assert_eq!(problem.num_variables(), 12);

        let var = arena.get(1, 2);
        assert_eq!(problem.variable_name(var), "capacity[Solar,2]");
        assert_eq!(arena.iter_generator(1).nth(2), Some(var));
    }

    #[rstest]
    #[should_panic]
    fn get_out_of_range(worked_example: Portfolio) {
        let mut problem = Problem::new();
        let arena =
            VariableArena::declare(&mut problem, &worked_example, "x", |_| (0.0, f64::INFINITY));
        arena.get(0, 4);
    }
}
