//! The portfolio dataset: generator technologies, the load series and the emissions price.
use crate::generator::{CapacityFactors, Generator, GeneratorID};
use crate::id::IDCollection;
use crate::units::{Dimensionless, Energy, MoneyPerEmissions};
use anyhow::{Context, Result, bail, ensure};
use indexmap::IndexMap;
use indexmap::map::Entry;

/// A map of generators, keyed by ID.
///
/// The order of entries is the order in which results are reported.
pub type GeneratorMap = IndexMap<GeneratorID, Generator>;

/// Generator technologies and the load they must serve over the planning horizon
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    generators: GeneratorMap,
    load: Vec<Energy>,
    co2_price: MoneyPerEmissions,
    /// The most recent factor applied with [`Portfolio::scale_load`]
    load_factor: Dimensionless,
}

impl Portfolio {
    /// Create a new [`Portfolio`].
    ///
    /// The horizon is given by the length of `load`. Every generator's capacity factors must cover
    /// the horizon.
    ///
    /// # Arguments
    ///
    /// * `generators` - Generator technologies, in report order
    /// * `load` - Load to be served in each period
    /// * `co2_price` - Emissions price, applied in every period
    pub fn new<I>(generators: I, load: Vec<Energy>, co2_price: MoneyPerEmissions) -> Result<Self>
    where
        I: IntoIterator<Item = Generator>,
    {
        ensure!(!load.is_empty(), "Load series must cover at least one period");
        ensure!(
            load.iter().all(|load| load.is_finite() && *load >= Energy(0.0)),
            "Load must be finite and non-negative"
        );
        ensure!(
            co2_price.is_finite() && co2_price >= MoneyPerEmissions(0.0),
            "CO2 price must be finite and non-negative"
        );

        let horizon = load.len();
        let mut map = GeneratorMap::new();
        for generator in generators {
            generator
                .validate(horizon)
                .with_context(|| format!("Invalid parameters for generator {}", generator.id))?;

            match map.entry(generator.id.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(generator);
                }
                Entry::Occupied(entry) => {
                    bail!("Duplicate generator ID: {}", entry.key())
                }
            }
        }
        ensure!(!map.is_empty(), "At least one generator is required");

        Ok(Self {
            generators: map,
            load,
            co2_price,
            load_factor: Dimensionless(1.0),
        })
    }

    /// The number of periods
    pub fn horizon(&self) -> usize {
        self.load.len()
    }

    /// The load for each period
    pub fn load(&self) -> &[Energy] {
        &self.load
    }

    /// The emissions price
    pub fn co2_price(&self) -> MoneyPerEmissions {
        self.co2_price
    }

    /// The generators, in report order
    pub fn generators(&self) -> &GeneratorMap {
        &self.generators
    }

    /// Iterate over the generators, in report order
    pub fn iter_generators(&self) -> impl Iterator<Item = &Generator> {
        self.generators.values()
    }

    /// The number of generators
    pub fn num_generators(&self) -> usize {
        self.generators.len()
    }

    /// Scale the load series in place.
    ///
    /// The factor is applied relative to the previously applied factor, so the result is always
    /// the original load multiplied by `factor`. Applying 0.9 and then 1.1 gives the original load
    /// scaled by 1.1.
    pub fn scale_load(&mut self, factor: Dimensionless) -> Result<()> {
        ensure!(
            factor.is_finite() && factor > Dimensionless(0.0),
            "Load factor must be finite and positive"
        );

        let relative = factor / self.load_factor;
        for load in &mut self.load {
            *load = *load * relative;
        }
        self.load_factor = factor;

        Ok(())
    }

    /// Replace the maximum capacity factors of a generator.
    ///
    /// Fails if the generator is unknown or the new values are inconsistent with the generator's
    /// other parameters, in which case the portfolio is left unchanged.
    pub fn set_max_capacity_factors(
        &mut self,
        generator_id: &str,
        max_cf: CapacityFactors,
    ) -> Result<()> {
        let id = self.generators.get_id(generator_id)?;
        let horizon = self.horizon();
        let generator = &mut self.generators[&id];

        let old = std::mem::replace(&mut generator.max_cf, max_cf);
        if let Err(err) = generator.validate(horizon) {
            generator.max_cf = old;
            return Err(err.context(format!("Invalid capacity factors for generator {id}")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, worked_example};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn portfolio_horizon(worked_example: Portfolio) {
        assert_eq!(worked_example.horizon(), 4);
        assert_eq!(worked_example.num_generators(), 3);
        assert_eq!(
            worked_example
                .generators()
                .keys()
                .map(|id| id.to_string())
                .collect::<Vec<_>>(),
            ["Wind", "Solar", "Conv"]
        );
    }

    #[test]
    fn portfolio_new_empty_load() {
        assert_error!(
            Portfolio::new([Generator::new("gen")], vec![], MoneyPerEmissions(0.0)),
            "Load series must cover at least one period"
        );
    }

    #[test]
    fn portfolio_new_no_generators() {
        assert_error!(
            Portfolio::new(Vec::new(), vec![Energy(1.0)], MoneyPerEmissions(0.0)),
            "At least one generator is required"
        );
    }

    #[test]
    fn portfolio_new_duplicate_generator() {
        assert_error!(
            Portfolio::new(
                [Generator::new("gen"), Generator::new("gen")],
                vec![Energy(1.0)],
                MoneyPerEmissions(0.0)
            ),
            "Duplicate generator ID: gen"
        );
    }

    #[test]
    fn portfolio_new_mismatched_horizon() {
        let generator = Generator {
            max_cf: CapacityFactors::per_period([0.5, 0.5, 0.5]),
            ..Generator::new("gen")
        };
        assert_error!(
            Portfolio::new([generator], vec![Energy(1.0); 2], MoneyPerEmissions(0.0)),
            "Invalid parameters for generator gen"
        );
    }

    #[rstest]
    fn scale_load_is_relative_to_previous_factor(mut worked_example: Portfolio) {
        let original = worked_example.load().to_vec();
        worked_example.scale_load(Dimensionless(0.9)).unwrap();
        worked_example.scale_load(Dimensionless(1.1)).unwrap();

        for (scaled, original) in worked_example.load().iter().zip(original) {
            assert_approx_eq!(f64, scaled.value(), original.value() * 1.1, epsilon = 1e-9);
        }
    }

    #[rstest]
    fn scale_load_invalid_factor(mut worked_example: Portfolio) {
        assert_error!(
            worked_example.scale_load(Dimensionless(0.0)),
            "Load factor must be finite and positive"
        );
    }

    #[rstest]
    fn set_max_capacity_factors(mut worked_example: Portfolio) {
        worked_example
            .set_max_capacity_factors("Solar", 0.25.into())
            .unwrap();
        assert_eq!(
            worked_example.generators()["Solar"].max_cf,
            CapacityFactors::from(0.25)
        );
    }

    #[rstest]
    fn set_max_capacity_factors_unknown_generator(mut worked_example: Portfolio) {
        assert_error!(
            worked_example.set_max_capacity_factors("Nuclear", 0.9.into()),
            "Unknown ID Nuclear found"
        );
    }

    #[rstest]
    fn set_max_capacity_factors_below_min_is_rolled_back(mut worked_example: Portfolio) {
        // Conv has a min_cf of 0.1
        assert!(
            worked_example
                .set_max_capacity_factors("Conv", 0.05.into())
                .is_err()
        );
        assert_eq!(
            worked_example.generators()["Conv"].max_cf,
            CapacityFactors::from(1.0)
        );
    }
}
