//! Monte Carlo evaluation: many independent runs of a frozen policy.

use rayon::prelude::*;
use serde::Serialize;

use crate::city::{CityConfig, MeasureCatalog};
use crate::policy::{AdaptivePolicy, AdpPolicy, Policy};

use super::engine::Engine;
use super::kpi::{PolicyComparison, SampleSummary};
use super::types::{Outcome, SimConfig};

/// Terminal outcomes of a batch, index-aligned by replication.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Samples {
    pub energy: Vec<f64>,
    pub budget: Vec<f64>,
}

impl Samples {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            energy: Vec::with_capacity(n),
            budget: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, outcome: Outcome) {
        self.energy.push(outcome.total_energy);
        self.budget.push(outcome.budget);
    }

    pub fn len(&self) -> usize {
        self.energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }

    /// `(energy, budget)` pairs in replication order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.energy.iter().copied().zip(self.budget.iter().copied())
    }
}

impl FromIterator<Outcome> for Samples {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        let mut samples = Samples::default();
        for outcome in iter {
            samples.push(outcome);
        }
        samples
    }
}

/// Both policies evaluated at one volatility level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub volatility: f64,
    pub adaptive_energy: SampleSummary,
    pub adp_energy: SampleSummary,
    /// `mean(adaptive) - mean(adp)` final energy.
    pub advantage: f64,
    /// `advantage / mean(adaptive)`.
    pub relative_advantage: f64,
    /// Half-width of the paired 95% interval on `advantage`.
    pub ci95: f64,
}

/// Volatility multipliers compared by default.
pub const VOLATILITY_LEVELS: [f64; 4] = [0.5, 1.0, 2.0, 3.0];

/// Apartment counts of the default sizing grid.
pub const APARTMENT_LEVELS: [u32; 6] = [20_000, 32_000, 44_000, 56_000, 68_000, 80_000];

/// House counts of the default sizing grid.
pub const HOUSE_LEVELS: [u32; 6] = [2_000, 4_000, 6_000, 8_000, 10_000, 12_000];

/// Both policies evaluated at one city sizing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizingPoint {
    pub apartments: u32,
    pub houses: u32,
    /// `mean(adaptive) - mean(adp)` final energy.
    pub advantage: f64,
    pub welch_p: f64,
}

/// Evaluator for batches of independent replications.
///
/// Replication `i` is seeded with `seed + i`. Each replication builds its
/// own city and price process, so two policies evaluated with the same
/// evaluator face identical price paths replication by replication.
#[derive(Debug, Clone)]
pub struct MonteCarlo<'a> {
    config: SimConfig,
    catalog: &'a MeasureCatalog,
    seed: u64,
}

impl<'a> MonteCarlo<'a> {
    pub fn new(config: SimConfig, catalog: &'a MeasureCatalog, seed: u64) -> Self {
        Self {
            config,
            catalog,
            seed,
        }
    }

    pub fn replication_seed(&self, replication: usize) -> u64 {
        self.seed.wrapping_add(replication as u64)
    }

    /// Runs a single replication with a fresh city and price process.
    pub fn run_replication<P: Policy>(
        &self,
        policy: &P,
        city: &CityConfig,
        replication: usize,
    ) -> Outcome {
        let mut engine = Engine::seeded(
            self.config.clone(),
            self.catalog,
            city,
            self.replication_seed(replication),
        );
        engine.run(policy);
        engine.outcome()
    }

    /// Evaluates `policy` over `replications` runs on the current thread.
    ///
    /// The policy is only borrowed, so learned weights stay frozen.
    ///
    /// # Panics
    ///
    /// Panics if `replications` is zero.
    pub fn evaluate<P: Policy>(
        &self,
        policy: &P,
        city: &CityConfig,
        replications: usize,
    ) -> Samples {
        assert!(replications >= 1, "replications must be >= 1");
        let samples: Samples = (0..replications)
            .map(|i| self.run_replication(policy, city, i))
            .collect();
        tracing::info!(
            policy = policy.name(),
            replications,
            "evaluation batch complete"
        );
        samples
    }

    /// Same as [`MonteCarlo::evaluate`] but spreads replications over the
    /// rayon thread pool. Output is identical and in replication order.
    ///
    /// # Panics
    ///
    /// Panics if `replications` is zero.
    pub fn evaluate_parallel<P: Policy + Sync>(
        &self,
        policy: &P,
        city: &CityConfig,
        replications: usize,
    ) -> Samples {
        assert!(replications >= 1, "replications must be >= 1");
        let outcomes: Vec<Outcome> = (0..replications)
            .into_par_iter()
            .map(|i| self.run_replication(policy, city, i))
            .collect();
        tracing::info!(
            policy = policy.name(),
            replications,
            "parallel evaluation batch complete"
        );
        outcomes.into_iter().collect()
    }

    /// Evaluates both policies at every volatility level in `levels`, with
    /// the rest of the city sizing taken from `city`.
    ///
    /// # Panics
    ///
    /// Panics if `replications` is zero.
    pub fn volatility_sweep(
        &self,
        adaptive: &AdaptivePolicy,
        adp: &AdpPolicy,
        city: &CityConfig,
        levels: &[f64],
        replications: usize,
    ) -> Vec<SweepPoint> {
        levels
            .iter()
            .map(|&volatility| {
                let city = CityConfig {
                    volatility,
                    ..city.clone()
                };
                let adaptive_samples = self.evaluate_parallel(adaptive, &city, replications);
                let adp_samples = self.evaluate_parallel(adp, &city, replications);
                let cmp = PolicyComparison::from_samples(&adaptive_samples, &adp_samples);
                let relative_advantage = if cmp.energy_a.mean != 0.0 {
                    cmp.energy_mean_diff / cmp.energy_a.mean
                } else {
                    0.0
                };
                SweepPoint {
                    volatility,
                    adaptive_energy: cmp.energy_a,
                    adp_energy: cmp.energy_b,
                    advantage: cmp.energy_mean_diff,
                    relative_advantage,
                    ci95: cmp.energy_diff_ci95,
                }
            })
            .collect()
    }

    /// Evaluates both policies on every `houses` x `apartments` sizing,
    /// houses-major, with volatility and the public sector taken from `city`.
    ///
    /// # Panics
    ///
    /// Panics if `replications` is zero.
    pub fn sizing_sweep(
        &self,
        adaptive: &AdaptivePolicy,
        adp: &AdpPolicy,
        city: &CityConfig,
        apartments: &[u32],
        houses: &[u32],
        replications: usize,
    ) -> Vec<SizingPoint> {
        let mut points = Vec::with_capacity(apartments.len() * houses.len());
        for &h in houses {
            for &a in apartments {
                let city = CityConfig {
                    apartments: a,
                    houses: h,
                    ..city.clone()
                };
                let adaptive_samples = self.evaluate_parallel(adaptive, &city, replications);
                let adp_samples = self.evaluate_parallel(adp, &city, replications);
                let cmp = PolicyComparison::from_samples(&adaptive_samples, &adp_samples);
                tracing::debug!(apartments = a, houses = h, advantage = cmp.energy_mean_diff);
                points.push(SizingPoint {
                    apartments: a,
                    houses: h,
                    advantage: cmp.energy_mean_diff,
                    welch_p: cmp.welch_p,
                });
            }
        }
        points
    }
}
