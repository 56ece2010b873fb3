//! Code for reading the load series from a CSV file.
use super::{input_err_msg, read_csv};
use crate::units::Energy;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const LOAD_FILE_NAME: &str = "load.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct LoadRaw {
    period: usize,
    load: Energy,
}

/// Read the load series from the model directory.
///
/// The length of the load series defines the number of periods in the model.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn read_load(model_dir: &Path) -> Result<Vec<Energy>> {
    let file_path = model_dir.join(LOAD_FILE_NAME);
    let load_csv = read_csv(&file_path)?;
    read_load_from_iter(load_csv).with_context(|| input_err_msg(&file_path))
}

fn read_load_from_iter<I>(iter: I) -> Result<Vec<Energy>>
where
    I: Iterator<Item = LoadRaw>,
{
    iter.enumerate()
        .map(|(expected, raw)| {
            ensure!(
                raw.period == expected,
                "Periods must be numbered consecutively from 0 (expected {expected}, found {})",
                raw.period
            );
            ensure!(
                raw.load.is_finite() && raw.load >= Energy(0.0),
                "Load for period {} must be finite and non-negative",
                raw.period
            );

            Ok(raw.load)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn load(period: usize, load: f64) -> LoadRaw {
        LoadRaw {
            period,
            load: Energy(load),
        }
    }

    #[test]
    fn test_read_load() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(LOAD_FILE_NAME)).unwrap();
            writeln!(file, "period,load\n0,400\n1,500\n2,600").unwrap();
        }

        assert_eq!(
            read_load(dir.path()).unwrap(),
            [Energy(400.0), Energy(500.0), Energy(600.0)]
        );
    }

    #[test]
    fn test_read_load_from_iter_out_of_order() {
        assert_error!(
            read_load_from_iter([load(0, 1.0), load(2, 1.0)].into_iter()),
            "Periods must be numbered consecutively from 0 (expected 1, found 2)"
        );
    }

    #[test]
    fn test_read_load_from_iter_negative() {
        assert_error!(
            read_load_from_iter([load(0, -1.0)].into_iter()),
            "Load for period 0 must be finite and non-negative"
        );
    }
}
