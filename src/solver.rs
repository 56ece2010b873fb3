//! A linear programming problem builder backed by the HiGHS solver.
//!
//! Variables, constraints and the objective are declared on a [`Problem`], which is handed to
//! HiGHS in one go when [`Problem::solve`] is called. Keeping our own copy of the problem lets the
//! objective be assembled from several weighted terms after the variables have been declared.
use highs::{HighsModelStatus, HighsStatus, RowProblem, Sense};
use indexmap::IndexMap;
use log::debug;
use std::error::Error;
use std::fmt;

/// A decision variable in the problem.
///
/// Note that this type does **not** include the value of the variable; it just refers to a
/// particular column of the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable(usize);

/// A constraint (row) in the problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Constraint(usize);

/// A linear expression of the form `c + a1*x1 + a2*x2 + ...`.
///
/// The same variable may appear in more than one term; coefficients are summed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(Variable, f64)>,
    constant: f64,
}

impl LinearExpr {
    /// Create an empty expression
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `coeff * var` to the expression
    pub fn add_term(&mut self, var: Variable, coeff: f64) {
        self.terms.push((var, coeff));
    }

    /// Add a constant to the expression
    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Add `scale * other` to the expression
    pub fn add_scaled(&mut self, other: &LinearExpr, scale: f64) {
        self.terms.extend(
            other
                .terms
                .iter()
                .map(|(var, coeff)| (*var, coeff * scale)),
        );
        self.constant += other.constant * scale;
    }

    /// The terms of the expression
    pub fn terms(&self) -> &[(Variable, f64)] {
        &self.terms
    }

    /// The constant part of the expression
    pub fn constant(&self) -> f64 {
        self.constant
    }
}

impl FromIterator<(Variable, f64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (Variable, f64)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
            constant: 0.0,
        }
    }
}

/// The relation between a constraint's expression and its right-hand side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    /// expression <= rhs
    LessEqual,
    /// expression == rhs
    Equal,
    /// expression >= rhs
    GreaterEqual,
}

/// The status reported by the solver after solving
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem has no feasible solution
    Infeasible,
    /// The objective is unbounded
    Unbounded,
    /// Any other outcome (e.g. time limit reached, or infeasible/unbounded undetermined)
    Other(HighsModelStatus),
}

impl From<HighsModelStatus> for SolveStatus {
    fn from(status: HighsModelStatus) -> Self {
        match status {
            HighsModelStatus::Optimal => Self::Optimal,
            HighsModelStatus::Infeasible => Self::Infeasible,
            HighsModelStatus::Unbounded => Self::Unbounded,
            status => Self::Other(status),
        }
    }
}

/// Defines the possible errors that can occur when running the solver
#[derive(Debug, Clone)]
pub enum ModelError {
    /// The model definition is incoherent.
    ///
    /// Users should not be able to trigger this error.
    Incoherent(HighsStatus),
    /// An optimal solution could not be found
    NonOptimal(SolveStatus),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Incoherent(status) => write!(f, "Incoherent model: {status:?}"),
            ModelError::NonOptimal(status) => {
                write!(f, "Could not find optimal result: {status:?}")
            }
        }
    }
}

impl Error for ModelError {}

/// Defines the errors which can occur when reading results from a model
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsError {
    /// The model has not been solved yet
    NotSolved,
    /// The model was solved, but no optimal solution was found
    NonOptimal(SolveStatus),
}

impl fmt::Display for ResultsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultsError::NotSolved => write!(f, "Results requested before the model was solved"),
            ResultsError::NonOptimal(status) => {
                write!(f, "Optimisation was not successful: {status:?}")
            }
        }
    }
}

impl Error for ResultsError {}

/// Options passed on to the solver
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverOptions {
    /// Maximum time to spend solving, in seconds
    pub time_limit: Option<f64>,
    /// Whether HiGHS should print its own progress output to the console
    pub log_to_console: bool,
}

impl SolverOptions {
    fn apply(&self, model: &mut highs::Model) {
        model.set_option("output_flag", self.log_to_console);
        model.set_option("log_to_console", self.log_to_console);
        if let Some(time_limit) = self.time_limit {
            model.set_option("time_limit", time_limit);
        }
    }
}

/// The objective of a [`Problem`]
#[derive(Debug, Clone, Default, PartialEq)]
enum Objective {
    #[default]
    Unset,
    /// A single expression to minimise
    Single(LinearExpr),
    /// Weighted expressions to minimise, keyed by term index
    Weighted(IndexMap<usize, (f64, LinearExpr)>),
}

impl Objective {
    /// Collapse the objective into one cost per column plus a constant
    fn scalarise(&self, num_cols: usize) -> (Vec<f64>, f64) {
        let mut costs = vec![0.0; num_cols];
        let mut offset = 0.0;
        let mut add = |expr: &LinearExpr, weight: f64| {
            for (var, coeff) in expr.terms() {
                costs[var.0] += weight * coeff;
            }
            offset += weight * expr.constant();
        };

        match self {
            Objective::Unset => {}
            Objective::Single(expr) => add(expr, 1.0),
            Objective::Weighted(terms) => {
                for (weight, expr) in terms.values() {
                    add(expr, *weight);
                }
            }
        }

        (costs, offset)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ColumnDefinition {
    name: String,
    lower: f64,
    upper: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct RowDefinition {
    name: String,
    lower: f64,
    upper: f64,
    terms: Vec<(Variable, f64)>,
}

/// A linear minimisation problem
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Problem {
    columns: Vec<ColumnDefinition>,
    rows: Vec<RowDefinition>,
    objective: Objective,
}

impl Problem {
    /// Create an empty problem
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new variable with the given bounds.
    ///
    /// Bounds may be infinite.
    ///
    /// # Panics
    ///
    /// Panics if either bound is NaN or `lower > upper`. Callers validate their input data before
    /// declaring variables.
    pub fn create_variable(&mut self, name: String, lower: f64, upper: f64) -> Variable {
        assert!(
            !lower.is_nan() && !upper.is_nan() && lower <= upper,
            "Bad bounds for variable {name}: [{lower}, {upper}]"
        );
        self.columns.push(ColumnDefinition { name, lower, upper });
        Variable(self.columns.len() - 1)
    }

    /// Add the constraint `expr <sense> rhs`.
    ///
    /// Any constant in `expr` is moved to the right-hand side. Terms for the same variable are
    /// summed.
    pub fn add_linear_constraint(
        &mut self,
        expr: LinearExpr,
        sense: ConstraintSense,
        rhs: f64,
        name: String,
    ) -> Constraint {
        let rhs = rhs - expr.constant;
        let (lower, upper) = match sense {
            ConstraintSense::LessEqual => (f64::NEG_INFINITY, rhs),
            ConstraintSense::Equal => (rhs, rhs),
            ConstraintSense::GreaterEqual => (rhs, f64::INFINITY),
        };
        // HiGHS rejects a row which mentions the same column twice
        let mut merged: IndexMap<Variable, f64> = IndexMap::new();
        for (var, coeff) in expr.terms {
            *merged.entry(var).or_default() += coeff;
        }
        self.rows.push(RowDefinition {
            name,
            lower,
            upper,
            terms: merged.into_iter().collect(),
        });
        Constraint(self.rows.len() - 1)
    }

    /// Set a single expression to minimise, replacing any existing objective
    pub fn set_objective(&mut self, expr: LinearExpr) {
        self.objective = Objective::Single(expr);
    }

    /// Set one term of a weighted objective, replacing any single-expression objective.
    ///
    /// The problem minimises the sum of `weight * expr` over all terms. Setting a term with an
    /// index which already exists replaces that term.
    pub fn set_weighted_objective_term(&mut self, expr: LinearExpr, index: usize, weight: f64) {
        if !matches!(self.objective, Objective::Weighted(_)) {
            self.objective = Objective::Weighted(IndexMap::new());
        }
        if let Objective::Weighted(terms) = &mut self.objective {
            terms.insert(index, (weight, expr));
        }
    }

    /// The number of variables
    pub fn num_variables(&self) -> usize {
        self.columns.len()
    }

    /// The number of constraints
    pub fn num_constraints(&self) -> usize {
        self.rows.len()
    }

    /// The name given to a variable
    pub fn variable_name(&self, var: Variable) -> &str {
        &self.columns[var.0].name
    }

    /// The name given to a constraint
    pub fn constraint_name(&self, constraint: Constraint) -> &str {
        &self.rows[constraint.0].name
    }

    /// Solve the problem, blocking until the solver returns.
    ///
    /// An error is only returned if the solver rejects the problem; otherwise check
    /// [`SolvedProblem::status`].
    pub fn solve(&self, options: &SolverOptions) -> Result<SolvedProblem, ModelError> {
        debug!(
            "Solving problem with {} variables and {} constraints",
            self.num_variables(),
            self.num_constraints()
        );

        let (costs, offset) = self.objective.scalarise(self.columns.len());
        let mut problem = RowProblem::default();
        let cols: Vec<_> = self
            .columns
            .iter()
            .zip(costs)
            .map(|(column, cost)| problem.add_column(cost, column.lower..=column.upper))
            .collect();
        for row in &self.rows {
            problem.add_row(
                row.lower..=row.upper,
                row.terms.iter().map(|(var, coeff)| (cols[var.0], *coeff)),
            );
        }

        let mut model = problem.optimise(Sense::Minimise);
        options.apply(&mut model);
        let solved = model.try_solve().map_err(ModelError::Incoherent)?;

        let status = SolveStatus::from(solved.status());
        debug!("Solver finished with status {status:?}");
        let (values, objective_value) = if status == SolveStatus::Optimal {
            (
                solved.get_solution().columns().to_vec(),
                solved.objective_value() + offset,
            )
        } else {
            (Vec::new(), f64::NAN)
        };

        Ok(SolvedProblem {
            status,
            values,
            objective_value,
        })
    }
}

/// The outcome of solving a [`Problem`]
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedProblem {
    status: SolveStatus,
    values: Vec<f64>,
    objective_value: f64,
}

impl SolvedProblem {
    /// The status reported by the solver
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Return an error unless an optimal solution was found
    pub fn ensure_optimal(&self) -> Result<(), ResultsError> {
        match self.status {
            SolveStatus::Optimal => Ok(()),
            status => Err(ResultsError::NonOptimal(status)),
        }
    }

    /// The value of a variable in the optimal solution
    pub fn variable_value(&self, var: Variable) -> Result<f64, ResultsError> {
        self.ensure_optimal()?;
        Ok(self.values[var.0])
    }

    /// The objective value of the optimal solution
    pub fn objective_value(&self) -> Result<f64, ResultsError> {
        self.ensure_optimal()?;
        Ok(self.objective_value)
    }
}

/// Get a model's solution, failing if the model has not been solved
pub fn get_solution(solution: Option<&SolvedProblem>) -> Result<&SolvedProblem, ResultsError> {
    let solution = solution.ok_or(ResultsError::NotSolved)?;
    solution.ensure_optimal()?;
    Ok(solution)
}

/// Solve a problem, returning an error if the solver rejects it or no optimal solution is found
pub fn solve_optimal(
    problem: &Problem,
    options: &SolverOptions,
) -> Result<SolvedProblem, ModelError> {
    let solved = problem.solve(options)?;
    match solved.status() {
        SolveStatus::Optimal => Ok(solved),
        status => Err(ModelError::NonOptimal(status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    /// min x + 2y, s.t. x + y >= 4, x <= 3
    fn small_problem() -> (Problem, Variable, Variable) {
        let mut problem = Problem::new();
        let x = problem.create_variable("x".into(), 0.0, 3.0);
        let y = problem.create_variable("y".into(), 0.0, f64::INFINITY);
        problem.add_linear_constraint(
            [(x, 1.0), (y, 1.0)].into_iter().collect(),
            ConstraintSense::GreaterEqual,
            4.0,
            "demand".into(),
        );

        (problem, x, y)
    }

    #[test]
    fn solve_single_objective() {
        let (mut problem, x, y) = small_problem();
        let mut objective = LinearExpr::new();
        objective.add_term(x, 1.0);
        objective.add_term(y, 2.0);
        objective.add_constant(10.0);
        problem.set_objective(objective);

        let solved = problem.solve(&SolverOptions::default()).unwrap();
        assert_eq!(solved.status(), SolveStatus::Optimal);
        assert_approx_eq!(f64, solved.variable_value(x).unwrap(), 3.0, epsilon = 1e-7);
        assert_approx_eq!(f64, solved.variable_value(y).unwrap(), 1.0, epsilon = 1e-7);
        assert_approx_eq!(f64, solved.objective_value().unwrap(), 15.0, epsilon = 1e-7);
    }

    #[test]
    fn solve_weighted_objective_matches_scalarised() {
        let (mut weighted, x, y) = small_problem();
        weighted.set_weighted_objective_term([(x, 1.0)].into_iter().collect(), 0, 0.5);
        weighted.set_weighted_objective_term([(y, 2.0)].into_iter().collect(), 1, 0.5);

        let (mut scalarised, _, _) = small_problem();
        scalarised.set_objective([(x, 0.5), (y, 1.0)].into_iter().collect());

        let options = SolverOptions::default();
        let weighted = solve_optimal(&weighted, &options).unwrap();
        let scalarised = solve_optimal(&scalarised, &options).unwrap();
        assert_approx_eq!(
            f64,
            weighted.objective_value().unwrap(),
            scalarised.objective_value().unwrap(),
            epsilon = 1e-7
        );
    }

    #[test]
    fn weighted_term_with_same_index_is_replaced() {
        let (mut problem, x, _) = small_problem();
        problem.set_weighted_objective_term([(x, 1.0)].into_iter().collect(), 0, 1.0);
        problem.set_weighted_objective_term([(x, 3.0)].into_iter().collect(), 0, 2.0);

        let (costs, offset) = problem.objective.scalarise(problem.num_variables());
        assert_eq!(costs, [6.0, 0.0]);
        assert_eq!(offset, 0.0);
    }

    #[test]
    fn constraint_constant_moves_to_rhs() {
        let (mut problem, x, _) = small_problem();
        let mut expr: LinearExpr = [(x, 1.0)].into_iter().collect();
        expr.add_constant(1.0);
        let constraint =
            problem.add_linear_constraint(expr, ConstraintSense::LessEqual, 3.0, "c".into());

        assert_eq!(problem.constraint_name(constraint), "c");
        let row = &problem.rows[1];
        assert_eq!(row.lower, f64::NEG_INFINITY);
        assert_eq!(row.upper, 2.0);
    }

    #[test]
    fn repeated_variable_in_constraint_is_summed() {
        // min y, s.t. x + x + y >= 8, x <= 3: 2x covers 6, so y = 2
        let (mut problem, x, y) = small_problem();
        let mut expr: LinearExpr = [(x, 1.0)].into_iter().collect();
        expr.add_scaled(&[(x, 1.0), (y, 1.0)].into_iter().collect(), 1.0);
        let constraint =
            problem.add_linear_constraint(expr, ConstraintSense::GreaterEqual, 8.0, "c".into());
        assert_eq!(problem.rows[constraint.0].terms, [(x, 2.0), (y, 1.0)]);

        problem.set_objective([(y, 1.0)].into_iter().collect());
        let solved = solve_optimal(&problem, &SolverOptions::default()).unwrap();
        assert_approx_eq!(f64, solved.variable_value(x).unwrap(), 3.0, epsilon = 1e-7);
        assert_approx_eq!(f64, solved.objective_value().unwrap(), 2.0, epsilon = 1e-7);
    }

    #[rstest]
    #[case(1.0, 0.0)]
    #[case(f64::NAN, 1.0)]
    #[case(0.0, f64::NAN)]
    #[should_panic(expected = "Bad bounds for variable x")]
    fn create_variable_bad_bounds(#[case] lower: f64, #[case] upper: f64) {
        Problem::new().create_variable("x".into(), lower, upper);
    }

    #[test]
    fn infeasible_problem() {
        let (mut problem, x, _) = small_problem();
        problem.add_linear_constraint(
            [(x, 1.0)].into_iter().collect(),
            ConstraintSense::GreaterEqual,
            5.0,
            "impossible".into(),
        );

        let solved = problem.solve(&SolverOptions::default()).unwrap();
        assert_ne!(solved.status(), SolveStatus::Optimal);
        assert!(matches!(
            solved.variable_value(x),
            Err(ResultsError::NonOptimal(_))
        ));
        assert!(matches!(
            solve_optimal(&problem, &SolverOptions::default()),
            Err(ModelError::NonOptimal(_))
        ));
    }

    #[test]
    fn get_solution_before_solve() {
        assert_eq!(get_solution(None).unwrap_err(), ResultsError::NotSolved);
    }
}
