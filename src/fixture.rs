//! Fixtures for tests

use crate::generator::{CapacityFactors, Generator};
use crate::portfolio::Portfolio;
use crate::scenario::{Scenario, ScenarioSet};
use crate::units::{
    Capacity, Dimensionless, Energy, EmissionsPerEnergy, MoneyPerCapacity, MoneyPerEmissions,
    MoneyPerEnergy,
};
use indexmap::indexmap;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn wind() -> Generator {
    Generator {
        capex: MoneyPerCapacity(50.0),
        fixed_opex: MoneyPerCapacity(5.0),
        initial_capacity: Capacity(300.0),
        max_capacity: Capacity(800.0),
        max_cf: CapacityFactors::per_period([0.4, 0.5, 0.6, 0.5]),
        ..Generator::new("Wind")
    }
}

#[fixture]
pub fn solar() -> Generator {
    Generator {
        capex: MoneyPerCapacity(40.0),
        fixed_opex: MoneyPerCapacity(1.0),
        initial_capacity: Capacity(100.0),
        max_capacity: Capacity(800.0),
        max_cf: CapacityFactors::per_period([0.8, 0.5, 0.3, 0.2]),
        ..Generator::new("Solar")
    }
}

#[fixture]
pub fn conventional() -> Generator {
    Generator {
        capex: MoneyPerCapacity(20.0),
        fixed_opex: MoneyPerCapacity(5.0),
        var_opex: MoneyPerEnergy(5.0),
        decex: MoneyPerCapacity(10.0),
        initial_capacity: Capacity(500.0),
        max_capacity: Capacity(10000.0),
        min_cf: 0.1.into(),
        co2: EmissionsPerEnergy(10.0),
        ..Generator::new("Conv")
    }
}

/// Build the three-generator portfolio with the given emissions price
pub fn worked_example_with_price(co2_price: f64) -> Portfolio {
    Portfolio::new(
        [wind(), solar(), conventional()],
        [400.0, 500.0, 600.0, 700.0].into_iter().map(Energy).collect(),
        MoneyPerEmissions(co2_price),
    )
    .unwrap()
}

#[fixture]
pub fn worked_example() -> Portfolio {
    worked_example_with_price(20.0)
}

#[fixture]
pub fn two_scenarios() -> ScenarioSet {
    let low_wind = Scenario {
        max_cf_overrides: indexmap! {
            "Wind".into() => CapacityFactors::per_period([0.2, 0.3, 0.4, 0.3]),
        },
        load_factor: Dimensionless(0.9),
        ..Scenario::new("low_wind", 0.4)
    };
    let high_load = Scenario {
        load_factor: Dimensionless(1.1),
        ..Scenario::new("high_load", 0.6)
    };

    ScenarioSet::new(vec![low_wind, high_load]).unwrap()
}
