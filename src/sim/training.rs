//! Episodic TD training of the ADP policy.

use crate::city::{CityConfig, MeasureCatalog};
use crate::policy::AdpPolicy;

use super::engine::Engine;
use super::types::SimConfig;

/// Seed offset keeping training price paths apart from evaluation replications,
/// which start at the unshifted seed.
const TRAINING_SEED_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

/// Training schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub episodes: usize,
    /// Emit a progress event every this many episodes (0 disables).
    pub log_every: usize,
    pub seed: u64,
}

impl TrainingConfig {
    /// Seed of the engine used for `episode`.
    pub fn episode_seed(&self, episode: usize) -> u64 {
        self.seed
            .wrapping_add(TRAINING_SEED_OFFSET)
            .wrapping_add(episode as u64)
    }
}

/// Per-episode terminal budget, used as a proxy for policy value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub episode_budgets: Vec<f64>,
    /// Episode whose updates left a non-finite weight. Training stops there
    /// and the weights are rolled back to the end of the previous episode.
    pub diverged_at: Option<usize>,
}

impl TrainingReport {
    /// Convergence curve: moving average over `window` episodes with the
    /// first `window` smoothed points discarded.
    ///
    /// Empty when there are not enough episodes.
    pub fn convergence_curve(&self, window: usize) -> Vec<f64> {
        moving_average(&self.episode_budgets, window)
            .into_iter()
            .skip(window)
            .collect()
    }
}

/// Trailing mean over every full window of `values`.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// Trains `policy` in place, one fresh city and price path per episode.
///
/// Episodes run sequentially since each one updates the shared weights.
/// The weights left in `policy` are always finite.
pub fn train(
    policy: &mut AdpPolicy,
    sim: &SimConfig,
    catalog: &MeasureCatalog,
    city: &CityConfig,
    schedule: &TrainingConfig,
) -> TrainingReport {
    let mut report = TrainingReport {
        episode_budgets: Vec::with_capacity(schedule.episodes),
        diverged_at: None,
    };

    for episode in 0..schedule.episodes {
        let checkpoint = policy.weights;
        let mut engine =
            Engine::seeded(sim.clone(), catalog, city, schedule.episode_seed(episode));
        engine.run_training(policy);

        if policy.weights.as_slice().iter().any(|w| !w.is_finite()) {
            tracing::warn!(
                episode,
                alpha = policy.alpha,
                "TD update diverged, keeping weights from the previous episode"
            );
            policy.weights = checkpoint;
            report.diverged_at = Some(episode);
            break;
        }

        let outcome = engine.outcome();
        report.episode_budgets.push(outcome.budget);

        if schedule.log_every > 0 && episode % schedule.log_every == 0 {
            tracing::info!(
                episode,
                budget = outcome.budget,
                weights = ?policy.weights.as_slice(),
                "training progress"
            );
        }
    }

    tracing::info!(
        episodes = report.episode_budgets.len(),
        "training complete"
    );
    report
}
