//! Integration tests for the `run` command.
use genplan::cli::{RunOpts, handle_run_command};
use genplan::settings::Settings;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the demo model.
fn get_model_dir() -> PathBuf {
    PathBuf::from("demos/simple")
}

/// An integration test for the `run` command.
#[test]
fn test_handle_run_command() {
    unsafe { std::env::set_var("GENPLAN_LOG_LEVEL", "off") };

    // Save results to non-existent directory to check that directory creation works
    let tempdir = tempdir().unwrap();
    let output_dir = tempdir.path().join("results");
    let opts = RunOpts {
        output_dir: Some(output_dir.clone()),
        overwrite: false,
    };
    handle_run_command(&get_model_dir(), &opts, Some(Settings::default())).unwrap();

    for file_name in [
        "capacity.csv",
        "generation.csv",
        "summary.toml",
        "genplan_info.log",
        "genplan_error.log",
    ] {
        assert!(output_dir.join(file_name).is_file(), "{file_name} missing");
    }

    // Three generators over four periods, plus a header
    let capacity = fs::read_to_string(output_dir.join("capacity.csv")).unwrap();
    assert_eq!(capacity.lines().count(), 1 + 3 * 4);
    assert!(capacity.starts_with("generator_id,period,capacity,investment,decommission"));

    let generation = fs::read_to_string(output_dir.join("generation.csv")).unwrap();
    assert!(generation.lines().skip(1).all(|line| line.starts_with("base,")));

    // Second run into the same folder fails without --overwrite
    assert_eq!(
        handle_run_command(&get_model_dir(), &opts, Some(Settings::default()))
            .unwrap_err()
            .chain()
            .next()
            .unwrap()
            .to_string(),
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    );

    // With --overwrite it gets as far as logging, which is already initialised
    let opts = RunOpts {
        overwrite: true,
        ..opts
    };
    assert_eq!(
        handle_run_command(&get_model_dir(), &opts, Some(Settings::default()))
            .unwrap_err()
            .chain()
            .next()
            .unwrap()
            .to_string(),
        "Failed to initialise logging."
    );
}
