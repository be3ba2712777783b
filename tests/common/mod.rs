//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use energy_city::city::{CityConfig, Measure, MeasureCatalog};
use energy_city::config::ScenarioConfig;
use energy_city::sim::types::SimConfig;

/// Default simulation configuration (10 periods, 100 per period).
pub fn default_config() -> SimConfig {
    SimConfig::default()
}

/// Reference city: 40000 apartments, 5000 houses, 300 public buildings.
pub fn default_city() -> CityConfig {
    CityConfig::default()
}

/// The five standard measures.
pub fn default_catalog() -> MeasureCatalog {
    MeasureCatalog::default()
}

/// LED retrofit as listed in the default catalog.
pub fn led() -> Measure {
    Measure::new("LED", 15.0, 0.08, 1.0)
}

/// Baseline scenario shrunk to run quickly: 8 replications, 20 episodes.
pub fn small_scenario() -> ScenarioConfig {
    let mut cfg = ScenarioConfig::baseline();
    cfg.simulation.replications = 8;
    cfg.adp.episodes = 20;
    cfg.adp.log_every = 0;
    cfg.adp.convergence_window = 5;
    cfg
}

/// Per-process scratch path that does not exist yet.
pub fn temp_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("energy_city_it_{}_{name}", std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}
