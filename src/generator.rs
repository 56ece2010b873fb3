//! Generator technologies and their cost and availability parameters.
use crate::id::define_id_type;
use crate::units::{
    Capacity, Dimensionless, EmissionsPerEnergy, MoneyPerCapacity, MoneyPerEmissions,
    MoneyPerEnergy,
};
use anyhow::{Result, ensure};

define_id_type! {GeneratorID}

/// Capacity factors for a generator over the planning horizon.
///
/// A constant value applies to every period.
#[derive(Debug, Clone, PartialEq)]
pub enum CapacityFactors {
    /// The same capacity factor in every period
    Constant(Dimensionless),
    /// One capacity factor per period
    PerPeriod(Vec<Dimensionless>),
}

impl CapacityFactors {
    /// Create per-period capacity factors from raw values
    pub fn per_period<I: IntoIterator<Item = f64>>(values: I) -> Self {
        Self::PerPeriod(values.into_iter().map(Dimensionless).collect())
    }

    /// Get the capacity factor for the given period.
    ///
    /// The caller must have checked the horizon with [`CapacityFactors::check_horizon`].
    pub fn get(&self, period: usize) -> Dimensionless {
        match self {
            Self::Constant(value) => *value,
            Self::PerPeriod(values) => values[period],
        }
    }

    /// Expand into one value per period
    pub fn to_vec(&self, horizon: usize) -> Vec<Dimensionless> {
        (0..horizon).map(|t| self.get(t)).collect()
    }

    /// Check that there is a value for every period of the horizon
    pub fn check_horizon(&self, horizon: usize) -> Result<()> {
        if let Self::PerPeriod(values) = self {
            ensure!(
                values.len() == horizon,
                "Expected {horizon} capacity factors, but got {}",
                values.len()
            );
        }

        Ok(())
    }

    fn check_values(&self) -> Result<()> {
        let values: &[Dimensionless] = match self {
            Self::Constant(value) => std::slice::from_ref(value),
            Self::PerPeriod(values) => values,
        };
        ensure!(
            values.iter().all(|cf| cf.is_finite() && cf.0 >= 0.0),
            "Capacity factors must be finite and non-negative"
        );

        Ok(())
    }
}

impl From<f64> for CapacityFactors {
    fn from(value: f64) -> Self {
        Self::Constant(Dimensionless(value))
    }
}

/// A generator technology which can be invested in and dispatched
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    /// A unique identifier for the generator
    pub id: GeneratorID,
    /// Cost of new capacity
    pub capex: MoneyPerCapacity,
    /// Cost of keeping a unit of capacity installed for one period
    pub fixed_opex: MoneyPerCapacity,
    /// Cost of generating a unit of energy
    pub var_opex: MoneyPerEnergy,
    /// Cost of decommissioning capacity
    pub decex: MoneyPerCapacity,
    /// Capacity installed before the first period
    pub initial_capacity: Capacity,
    /// Upper bound on installed capacity. May be infinite.
    pub max_capacity: Capacity,
    /// Minimum fraction of capacity which must be dispatched
    pub min_cf: CapacityFactors,
    /// Maximum fraction of capacity which can be dispatched
    pub max_cf: CapacityFactors,
    /// Emissions per unit of energy generated
    pub co2: EmissionsPerEnergy,
}

impl Generator {
    /// Create a new generator with zero costs and capacity, no upper limit on capacity and full
    /// availability.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.into(),
            capex: MoneyPerCapacity(0.0),
            fixed_opex: MoneyPerCapacity(0.0),
            var_opex: MoneyPerEnergy(0.0),
            decex: MoneyPerCapacity(0.0),
            initial_capacity: Capacity(0.0),
            max_capacity: Capacity(f64::INFINITY),
            min_cf: 0.0.into(),
            max_cf: 1.0.into(),
            co2: EmissionsPerEnergy(0.0),
        }
    }

    /// The cost of generating a unit of energy, including the emissions cost
    pub fn variable_cost(&self, co2_price: MoneyPerEmissions) -> MoneyPerEnergy {
        self.var_opex + self.co2 * co2_price
    }

    /// Check the generator's parameters are valid for the given horizon
    pub fn validate(&self, horizon: usize) -> Result<()> {
        for (name, value) in [
            ("capex", self.capex.value()),
            ("fixed_opex", self.fixed_opex.value()),
            ("var_opex", self.var_opex.value()),
            ("decex", self.decex.value()),
            ("initial_capacity", self.initial_capacity.value()),
            ("co2", self.co2.value()),
        ] {
            ensure!(
                value.is_finite() && value >= 0.0,
                "{name} must be finite and non-negative"
            );
        }

        // NB: max_capacity is allowed to be infinite
        ensure!(
            self.max_capacity >= Capacity(0.0),
            "max_capacity must be non-negative"
        );

        self.min_cf.check_horizon(horizon)?;
        self.max_cf.check_horizon(horizon)?;
        self.min_cf.check_values()?;
        self.max_cf.check_values()?;
        for t in 0..horizon {
            ensure!(
                self.min_cf.get(t) <= self.max_cf.get(t),
                "min_cf ({}) is greater than max_cf ({}) in period {t}",
                self.min_cf.get(t).0,
                self.max_cf.get(t).0
            );
        }

        Ok(())
    }
}
