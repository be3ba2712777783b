//! Mutable city aggregate: per-sector energy, adoption levels, and budget.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::measure::Measure;
use super::sector::{Sector, SectorMap};

/// Adoption increment per successful application of a measure.
pub const ADOPTION_STEP: f64 = 0.1;

/// City sizing used to construct a fresh [`City`] for every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CityConfig {
    /// Number of apartment buildings.
    pub apartments: u32,
    /// Number of houses.
    pub houses: u32,
    /// Number of public buildings.
    pub public: u32,
    /// Multiplier on every sector's base price volatility.
    pub volatility: f64,
    /// Budget available in the first period.
    pub initial_budget: f64,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            apartments: 40_000,
            houses: 5_000,
            public: 300,
            volatility: 1.0,
            initial_budget: 100.0,
        }
    }
}

impl CityConfig {
    pub fn count(&self, sector: Sector) -> u32 {
        match sector {
            Sector::Apartments => self.apartments,
            Sector::Houses => self.houses,
            Sector::Public => self.public,
        }
    }

    /// Initial consumption per sector: baseline per building times building count.
    pub fn initial_energy(&self) -> SectorMap<f64> {
        SectorMap::from_fn(|s| s.baseline_consumption() * f64::from(self.count(s)))
    }

    /// Builds a fresh city at the configured sizing with zero adoption.
    pub fn build(&self) -> City {
        City::new(self.initial_energy(), self.initial_budget)
    }
}

/// Mutable state of one simulated city.
///
/// Within a run, each sector's energy only ever decreases and each adoption
/// level only ever increases (bounded by the measure's cap).
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    energy: SectorMap<f64>,
    /// Not enforced non-negative here; see [`City::apply`].
    pub budget: f64,
    adoption: SectorMap<HashMap<String, f64>>,
}

impl City {
    pub fn new(energy: SectorMap<f64>, budget: f64) -> Self {
        Self {
            energy,
            budget,
            adoption: SectorMap::default(),
        }
    }

    pub fn energy(&self) -> &SectorMap<f64> {
        &self.energy
    }

    pub fn sector_energy(&self, sector: Sector) -> f64 {
        self.energy[sector]
    }

    /// Cumulative adoption of the named measure in `sector`, 0 when never applied.
    pub fn adoption(&self, sector: Sector, measure: &str) -> f64 {
        self.adoption[sector].get(measure).copied().unwrap_or(0.0)
    }

    /// Whether `measure` is below its adoption cap in `sector`.
    pub fn can_adopt(&self, measure: &Measure, sector: Sector) -> bool {
        self.adoption(sector, &measure.name) < measure.max_adoption
    }

    /// Applies `measure` to `sector`.
    ///
    /// Returns `false` (and changes nothing) when the measure is already at
    /// its adoption cap. The budget is NOT checked: callers must ensure
    /// `budget >= measure.cost` before calling, as both policies do.
    pub fn apply(&mut self, measure: &Measure, sector: Sector) -> bool {
        let current = self.adoption(sector, &measure.name);
        if current >= measure.max_adoption {
            return false;
        }

        let effective = measure.effective_effect(current);
        self.energy[sector] *= 1.0 - effective;
        self.budget -= measure.cost;
        self.adoption[sector].insert(
            measure.name.clone(),
            measure.max_adoption.min(current + ADOPTION_STEP),
        );
        true
    }

    /// Sum of consumption across all sectors.
    pub fn total_energy(&self) -> f64 {
        self.energy.values().sum()
    }
}
