//! Scenarios for stochastic planning.
//!
//! Each scenario is a possible realisation of renewable availability and load. Scenarios share a
//! single investment plan; only dispatch differs between them.
use crate::generator::{CapacityFactors, GeneratorID};
use crate::id::define_id_type;
use crate::portfolio::Portfolio;
use crate::units::Dimensionless;
use anyhow::{Context, Result, ensure};
use float_cmp::approx_eq;
use indexmap::{IndexMap, IndexSet};
use log::warn;

define_id_type! {ScenarioID}

/// A single scenario
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// A unique identifier for the scenario
    pub id: ScenarioID,
    /// The weight of this scenario's cost in the combined objective
    pub weight: Dimensionless,
    /// Maximum capacity factors which replace those of the base portfolio
    pub max_cf_overrides: IndexMap<GeneratorID, CapacityFactors>,
    /// Factor by which the base portfolio's load is scaled
    pub load_factor: Dimensionless,
}

impl Scenario {
    /// Create a scenario with the given weight, no availability overrides and unscaled load
    pub fn new(id: &str, weight: f64) -> Self {
        Self {
            id: id.into(),
            weight: Dimensionless(weight),
            max_cf_overrides: IndexMap::new(),
            load_factor: Dimensionless(1.0),
        }
    }

    /// Derive the portfolio seen in this scenario from a base portfolio.
    ///
    /// The base portfolio is not modified. The resulting load is the base portfolio's unscaled load
    /// multiplied by this scenario's load factor, whatever factors were applied before.
    pub fn apply(&self, base: &Portfolio) -> Result<Portfolio> {
        let mut portfolio = base.clone();
        portfolio
            .scale_load(self.load_factor)
            .with_context(|| format!("Invalid load factor for scenario {}", self.id))?;

        for (generator_id, max_cf) in &self.max_cf_overrides {
            portfolio
                .set_max_capacity_factors(&generator_id.0, max_cf.clone())
                .with_context(|| format!("Invalid availability override in scenario {}", self.id))?;
        }

        Ok(portfolio)
    }
}

/// An ordered collection of scenarios
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSet(Vec<Scenario>);

impl ScenarioSet {
    /// Create a new [`ScenarioSet`], checking that IDs are unique and weights are valid
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self> {
        ensure!(!scenarios.is_empty(), "At least one scenario is required");

        let mut ids = IndexSet::new();
        for scenario in &scenarios {
            ensure!(
                ids.insert(scenario.id.clone()),
                "Duplicate scenario ID: {}",
                scenario.id
            );
            ensure!(
                scenario.weight.is_finite() && scenario.weight >= Dimensionless(0.0),
                "Weight for scenario {} must be finite and non-negative",
                scenario.id
            );
        }

        let total: f64 = scenarios.iter().map(|s| s.weight.value()).sum();
        ensure!(total > 0.0, "Scenario weights cannot all be zero");
        if !approx_eq!(f64, total, 1.0, epsilon = 1e-6) {
            warn!("Scenario weights sum to {total} rather than 1. They will be used as given.");
        }

        Ok(Self(scenarios))
    }

    /// Check that every scenario can be applied to the given portfolio
    pub fn validate(&self, base: &Portfolio) -> Result<()> {
        for scenario in &self.0 {
            scenario.apply(base)?;
        }

        Ok(())
    }

    /// Iterate over the scenarios in order
    pub fn iter(&self) -> std::slice::Iter<'_, Scenario> {
        self.0.iter()
    }

    /// The number of scenarios
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no scenarios. Always false for a validated set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ScenarioSet {
    type Item = &'a Scenario;
    type IntoIter = std::slice::Iter<'a, Scenario>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
