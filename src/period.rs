//! Code for working with planning periods.
use crate::input::is_sorted_and_unique;
use anyhow::{Context, Result, ensure};
use itertools::Itertools;

/// Parse a string of periods separated by semicolons into a vector of period indices.
///
/// The string can be either "all" (case-insensitive), a single period, or a semicolon-separated
/// list of periods (e.g. "0;1;2" or "0; 1; 2"). Periods are numbered from zero.
///
/// # Arguments
///
/// - `s` - Input string to parse
/// - `horizon` - The number of periods in the model
pub fn parse_period_str(s: &str, horizon: usize) -> Result<Vec<usize>> {
    let s = s.trim();
    ensure!(!s.is_empty(), "No periods provided");

    if s.eq_ignore_ascii_case("all") {
        return Ok((0..horizon).collect());
    }

    let parse_and_validate_period = |s: &str| {
        let period = s.trim().parse::<usize>().ok()?;
        (period < horizon).then_some(period)
    };
    let periods: Vec<_> = s
        .split(';')
        .map(|p| parse_and_validate_period(p).with_context(|| format!("Invalid period: {p}")))
        .try_collect()?;

    ensure!(
        is_sorted_and_unique(&periods),
        "Periods must be in order and unique"
    );

    Ok(periods)
}
