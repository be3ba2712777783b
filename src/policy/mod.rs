//! Decision policies that pick one efficiency measure per period.
//!
//! Every policy implements [`Policy`]. Randomness is always passed in by the
//! caller so that runs are reproducible from a seed.

pub mod adaptive;
pub mod adp;
pub mod weights;

use std::fmt;

use rand::Rng;

use crate::city::{City, Measure, MeasureCatalog, Sector};
use crate::prices::Prices;

pub use adaptive::AdaptivePolicy;
pub use adp::{AdpPolicy, TdUpdate, ValueWeights};

/// Applying `measure` to `sector`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Action<'c> {
    pub sector: Sector,
    pub measure: &'c Measure,
}

impl Action<'_> {
    /// Monetary value of the energy this action would save right now,
    /// computed without touching the city.
    pub fn immediate_reward(&self, city: &City, prices: &Prices) -> f64 {
        let current = city.adoption(self.sector, &self.measure.name);
        let energy_before = city.sector_energy(self.sector);
        let energy_after = energy_before * (1.0 - self.measure.effective_effect(current));
        (energy_before - energy_after) * prices[self.sector]
    }
}

impl fmt::Display for Action<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.measure.name, self.sector)
    }
}

/// Every `(sector, measure)` pair below its adoption cap and affordable with
/// the current budget, sectors outermost, both in enumeration order.
pub fn feasible_actions<'c>(city: &City, catalog: &'c MeasureCatalog) -> Vec<Action<'c>> {
    Sector::ALL
        .into_iter()
        .flat_map(|sector| {
            catalog
                .iter()
                .filter(move |m| city.can_adopt(m, sector) && city.budget >= m.cost)
                .map(move |measure| Action { sector, measure })
        })
        .collect()
}

/// A decision rule over the city state, catalog, and current prices.
pub trait Policy {
    /// Chooses the action for this period, or `None` when nothing is feasible.
    fn choose_action<'c, R: Rng + ?Sized>(
        &self,
        city: &City,
        catalog: &'c MeasureCatalog,
        prices: &Prices,
        rng: &mut R,
    ) -> Option<Action<'c>>;

    /// Acts on `city` during training and returns the applied action.
    ///
    /// Policies that do not learn simply choose and apply.
    fn train_step<'c, R: Rng + ?Sized>(
        &mut self,
        city: &mut City,
        catalog: &'c MeasureCatalog,
        prices: &Prices,
        rng: &mut R,
    ) -> Option<Action<'c>> {
        let action = self.choose_action(city, catalog, prices, rng)?;
        city.apply(action.measure, action.sector);
        Some(action)
    }

    fn name(&self) -> &'static str;
}

/// Policy selected by configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyPolicy {
    Adaptive(AdaptivePolicy),
    Adp(AdpPolicy),
}

impl Policy for AnyPolicy {
    fn choose_action<'c, R: Rng + ?Sized>(
        &self,
        city: &City,
        catalog: &'c MeasureCatalog,
        prices: &Prices,
        rng: &mut R,
    ) -> Option<Action<'c>> {
        match self {
            AnyPolicy::Adaptive(p) => p.choose_action(city, catalog, prices, rng),
            AnyPolicy::Adp(p) => p.choose_action(city, catalog, prices, rng),
        }
    }

    fn train_step<'c, R: Rng + ?Sized>(
        &mut self,
        city: &mut City,
        catalog: &'c MeasureCatalog,
        prices: &Prices,
        rng: &mut R,
    ) -> Option<Action<'c>> {
        match self {
            AnyPolicy::Adaptive(p) => p.train_step(city, catalog, prices, rng),
            AnyPolicy::Adp(p) => p.train_step(city, catalog, prices, rng),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AnyPolicy::Adaptive(p) => p.name(),
            AnyPolicy::Adp(p) => p.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::{CityConfig, SectorMap};

    #[test]
    fn feasible_actions_enumerate_sectors_then_measures() {
        let city = CityConfig::default().build();
        let catalog = MeasureCatalog::default();
        let actions = feasible_actions(&city, &catalog);
        assert_eq!(actions.len(), 3 * catalog.len());
        assert_eq!(actions[0].sector, Sector::Apartments);
        assert_eq!(actions[0].measure.name, "LED");
        assert_eq!(actions[catalog.len()].sector, Sector::Houses);
        assert_eq!(actions.last().map(|a| a.measure.name.as_str()), Some("SmartHome"));
    }

    #[test]
    fn feasible_actions_filter_by_budget() {
        let city = City::new(SectorMap::splat(100.0), 12.0);
        let catalog = MeasureCatalog::default();
        let names: Vec<&str> = feasible_actions(&city, &catalog)
            .iter()
            .filter(|a| a.sector == Sector::Public)
            .map(|a| a.measure.name.as_str())
            .collect();
        assert_eq!(names, vec!["SmartMeter", "SmartHome"]);
    }

    #[test]
    fn feasible_actions_filter_by_cap() {
        let solar = Measure::new("Solar", 30.0, 0.2, 0.1);
        let catalog = MeasureCatalog::new(vec![solar.clone()]);
        let mut city = City::new(SectorMap::splat(100.0), 1000.0);
        assert!(city.apply(&solar, Sector::Houses));
        let sectors: Vec<Sector> = feasible_actions(&city, &catalog)
            .iter()
            .map(|a| a.sector)
            .collect();
        assert_eq!(sectors, vec![Sector::Apartments, Sector::Public]);
    }

    #[test]
    fn immediate_reward_does_not_mutate_city() {
        let city = CityConfig::default().build();
        let catalog = MeasureCatalog::default();
        let led = catalog.get("LED").map(|measure| Action {
            sector: Sector::Apartments,
            measure,
        });
        let prices = SectorMap::splat(2.0);
        let reward = led.map(|a| a.immediate_reward(&city, &prices));
        assert!(reward.is_some_and(|r| (r - 1_600_000.0).abs() < 1e-6));
        assert_eq!(city, CityConfig::default().build());
    }
}
