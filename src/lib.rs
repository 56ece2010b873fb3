//! Generation capacity-expansion planning as linear programmes.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod dispatch;
pub mod expansion;
pub mod finance;
pub mod generator;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod period;
pub mod planning;
pub mod portfolio;
pub mod results;
pub mod scenario;
pub mod settings;
pub mod solver;
pub mod stochastic;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the folder where program configuration files are stored
pub fn get_genplan_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_default();
    path.push("genplan");

    path
}
