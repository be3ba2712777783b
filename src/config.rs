//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::city::CityConfig;
use crate::policy::adp::DEFAULT_ALPHA;
use crate::policy::{AdaptivePolicy, AdpPolicy, ValueWeights};
use crate::sim::training::TrainingConfig;
use crate::sim::types::SimConfig;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Horizon, budget rule, seed, and batch size.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// City sizing and price volatility.
    #[serde(default)]
    pub city: CityConfig,
    /// ROI heuristic parameters.
    #[serde(default)]
    pub adaptive: AdaptiveConfig,
    /// Value-function policy and training parameters.
    #[serde(default)]
    pub adp: AdpConfig,
}

/// Horizon, budget rule, seed, and batch size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Periods per run (must be > 0).
    pub horizon: usize,
    /// Flat budget added every period.
    pub base_budget: f64,
    /// Master random seed.
    pub seed: u64,
    /// Monte Carlo replications per policy (must be >= 1).
    pub replications: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon: 10,
            base_budget: 100.0,
            seed: 42,
            replications: 500,
        }
    }
}

/// ROI heuristic parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdaptiveConfig {
    /// Exploration probability (0.0-1.0).
    pub epsilon: f64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self { epsilon: 0.1 }
    }
}

/// Value-function policy and training parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdpConfig {
    /// TD learning rate.
    pub alpha: f64,
    /// Discount factor (0.0-1.0).
    pub gamma: f64,
    /// Exploration probability during evaluation.
    pub epsilon: f64,
    /// Exploration probability during training.
    pub train_epsilon: f64,
    /// Training episodes.
    pub episodes: usize,
    /// Progress log interval in episodes (0 disables).
    pub log_every: usize,
    /// Moving-average window of the convergence curve.
    pub convergence_window: usize,
}

impl Default for AdpConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            gamma: 0.95,
            epsilon: 0.1,
            train_epsilon: 0.2,
            episodes: 5000,
            log_every: 500,
            convergence_window: 200,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.horizon"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: the reference city at unit volatility.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the high-volatility preset: prices three times as volatile.
    pub fn high_volatility() -> Self {
        Self {
            city: CityConfig {
                volatility: 3.0,
                ..CityConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the large-city preset: roughly double the building stock.
    pub fn large_city() -> Self {
        Self {
            city: CityConfig {
                apartments: 80_000,
                houses: 10_000,
                public: 500,
                ..CityConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "high_volatility", "large_city"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "high_volatility" => Ok(Self::high_volatility()),
            "large_city" => Ok(Self::large_city()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.horizon == 0 {
            errors.push(ConfigError::new("simulation.horizon", "must be > 0"));
        }
        if s.replications == 0 {
            errors.push(ConfigError::new("simulation.replications", "must be >= 1"));
        }
        if !s.base_budget.is_finite() {
            errors.push(ConfigError::new("simulation.base_budget", "must be finite"));
        }

        let c = &self.city;
        if !c.volatility.is_finite() || c.volatility < 0.0 {
            errors.push(ConfigError::new("city.volatility", "must be finite and >= 0"));
        }
        if !c.initial_budget.is_finite() || c.initial_budget < 0.0 {
            errors.push(ConfigError::new(
                "city.initial_budget",
                "must be finite and >= 0",
            ));
        }

        check_probability(&mut errors, "adaptive.epsilon", self.adaptive.epsilon);

        let a = &self.adp;
        if !a.alpha.is_finite() || a.alpha < 0.0 {
            errors.push(ConfigError::new("adp.alpha", "must be finite and >= 0"));
        }
        check_probability(&mut errors, "adp.gamma", a.gamma);
        check_probability(&mut errors, "adp.epsilon", a.epsilon);
        check_probability(&mut errors, "adp.train_epsilon", a.train_epsilon);
        if a.episodes == 0 {
            errors.push(ConfigError::new("adp.episodes", "must be > 0"));
        }
        if a.convergence_window == 0 {
            errors.push(ConfigError::new("adp.convergence_window", "must be > 0"));
        }

        errors
    }

    pub fn sim_config(&self) -> SimConfig {
        SimConfig::new(self.simulation.horizon, self.simulation.base_budget)
    }

    pub fn adaptive_policy(&self) -> AdaptivePolicy {
        AdaptivePolicy::new(self.adaptive.epsilon)
    }

    /// ADP policy for evaluation, carrying the given frozen weights.
    pub fn adp_policy(&self, weights: ValueWeights) -> AdpPolicy {
        AdpPolicy::new(self.adp.alpha, self.adp.gamma, self.adp.epsilon).with_weights(weights)
    }

    /// Zero-weight ADP policy with the training exploration rate.
    pub fn adp_trainee(&self) -> AdpPolicy {
        AdpPolicy::new(self.adp.alpha, self.adp.gamma, self.adp.train_epsilon)
    }

    pub fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            episodes: self.adp.episodes,
            log_every: self.adp.log_every,
            seed: self.simulation.seed,
        }
    }
}

fn check_probability(errors: &mut Vec<ConfigError>, field: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ConfigError::new(field, "must be in [0.0, 1.0]"));
    }
}
