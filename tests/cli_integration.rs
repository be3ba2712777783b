//! Integration tests for the `energy-city` binary.

mod common;

use std::process::Command;

fn energy_city() -> Command {
    Command::new(env!("CARGO_BIN_EXE_energy-city"))
}

#[test]
fn evaluates_with_default_weights() {
    let weights = common::temp_path("cli_missing_weights.json");
    let output = energy_city()
        .args(["--replications", "4", "--seed", "7", "--weights"])
        .arg(&weights)
        .output()
        .expect("energy-city process should run");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("adaptive final energy"));
    assert!(stdout.contains("adp final budget"));
}

#[test]
fn train_writes_weights_and_samples() {
    let weights = common::temp_path("cli_weights.json");
    let samples = common::temp_path("cli_samples.csv");
    let output = energy_city()
        .args(["--train", "--episodes", "5", "--replications", "3", "--parallel"])
        .arg("--weights")
        .arg(&weights)
        .arg("--samples-out")
        .arg(&samples)
        .output()
        .expect("energy-city process should run");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let saved = std::fs::read_to_string(&weights).unwrap();
    let parsed: Vec<f64> = serde_json::from_str(&saved).unwrap();
    assert_eq!(parsed.len(), 4);

    let csv = std::fs::read_to_string(&samples).unwrap();
    // header + 3 replications
    assert_eq!(csv.lines().count(), 4);

    let _ = std::fs::remove_file(&weights);
    let _ = std::fs::remove_file(&samples);
}

#[test]
fn default_training_run_saves_finite_weights() {
    let weights = common::temp_path("cli_default_train.json");
    let output = energy_city()
        .args(["--train", "--replications", "2", "--weights"])
        .arg(&weights)
        .output()
        .expect("energy-city process should run");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let saved: Vec<f64> = serde_json::from_str(&std::fs::read_to_string(&weights).unwrap()).unwrap();
    assert!(saved.iter().all(|w| w.is_finite()));
    let _ = std::fs::remove_file(&weights);
}

#[test]
fn volatility_sweep_prints_each_level() {
    let weights = common::temp_path("cli_sweep_weights.json");
    let output = energy_city()
        .args(["--replications", "3", "--sweep", "volatility", "--weights"])
        .arg(&weights)
        .output()
        .expect("energy-city process should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Welch p-value"));
    let header = stdout
        .lines()
        .position(|l| l.starts_with("volatility"))
        .unwrap();
    assert_eq!(stdout.lines().skip(header + 1).count(), 4);
}

#[test]
fn same_seed_prints_same_report() {
    let weights = common::temp_path("cli_repro_weights.json");
    let run = || {
        energy_city()
            .args(["--preset", "high_volatility", "--replications", "5", "--seed", "11"])
            .arg("--weights")
            .arg(&weights)
            .output()
            .expect("energy-city process should run")
    };
    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn unknown_preset_fails() {
    let output = energy_city()
        .args(["--preset", "megacity"])
        .output()
        .expect("energy-city process should run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown preset"));
}

#[test]
fn zero_replications_rejected() {
    let output = energy_city()
        .args(["--replications", "0"])
        .output()
        .expect("energy-city process should run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("simulation.replications"));
}

#[test]
fn scenario_and_preset_conflict() {
    let output = energy_city()
        .args(["--scenario", "x.toml", "--preset", "baseline"])
        .output()
        .expect("energy-city process should run");
    assert!(!output.status.success());
}
