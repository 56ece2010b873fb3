//! General functions related to finance.
use crate::units::Dimensionless;
use anyhow::{Result, ensure};

/// Check that a discount rate is usable
pub fn check_discount_rate(discount_rate: Dimensionless) -> Result<()> {
    ensure!(
        discount_rate.is_finite() && discount_rate >= Dimensionless(0.0),
        "Discount rate must be finite and non-negative"
    );

    Ok(())
}

/// Calculates the multiplier applied to costs in each period.
///
/// Costs in period `t` are multiplied by `1 / (1 + discount_rate)^t`. A discount rate of zero
/// gives a multiplier of one for every period.
pub fn discount_multipliers(discount_rate: Dimensionless, horizon: usize) -> Vec<Dimensionless> {
    let step = Dimensionless(1.0) / (Dimensionless(1.0) + discount_rate);
    std::iter::successors(Some(Dimensionless(1.0)), |multiplier| Some(*multiplier * step))
        .take(horizon)
        .collect()
}
