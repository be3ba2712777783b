//! Greedy return-on-investment heuristic with epsilon exploration.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::{Action, Policy, feasible_actions};
use crate::city::{City, MeasureCatalog};
use crate::prices::Prices;

/// Picks the feasible action with the highest immediate money saved per unit
/// of cost. Stateless: feasibility and ROI are recomputed on every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptivePolicy {
    /// Probability of picking a uniformly random feasible action instead.
    pub epsilon: f64,
}

impl Default for AdaptivePolicy {
    fn default() -> Self {
        Self { epsilon: 0.1 }
    }
}

impl AdaptivePolicy {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Money saved this period per unit of measure cost.
    pub fn roi(action: &Action<'_>, city: &City, prices: &Prices) -> f64 {
        let current = city.adoption(action.sector, &action.measure.name);
        let delta_energy =
            city.sector_energy(action.sector) * action.measure.effective_effect(current);
        let delta_money = delta_energy * prices[action.sector];
        delta_money / action.measure.cost
    }
}

impl Policy for AdaptivePolicy {
    fn choose_action<'c, R: Rng + ?Sized>(
        &self,
        city: &City,
        catalog: &'c MeasureCatalog,
        prices: &Prices,
        rng: &mut R,
    ) -> Option<Action<'c>> {
        let candidates: Vec<(f64, Action<'c>)> = feasible_actions(city, catalog)
            .into_iter()
            .map(|action| (Self::roi(&action, city, prices), action))
            .collect();

        if candidates.is_empty() {
            return None;
        }

        if rng.random::<f64>() < self.epsilon {
            return candidates.choose(rng).map(|(_, action)| *action);
        }

        // first maximal entry wins ties
        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.0 > best.0 {
                best = *candidate;
            }
        }
        Some(best.1)
    }

    fn name(&self) -> &'static str {
        "adaptive"
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::city::{CityConfig, Measure, Sector, SectorMap};

    fn greedy() -> AdaptivePolicy {
        AdaptivePolicy::new(0.0)
    }

    #[test]
    fn picks_highest_roi() {
        let city = CityConfig::default().build();
        let catalog = MeasureCatalog::default();
        let prices = SectorMap::splat(1.0);
        let mut rng = StdRng::seed_from_u64(0);

        // Apartments carry the most energy; Solar has the best effect per cost (0.20/30).
        let action = greedy().choose_action(&city, &catalog, &prices, &mut rng);
        assert_eq!(action.map(|a| a.sector), Some(Sector::Apartments));
        assert_eq!(action.map(|a| a.measure.name.as_str()), Some("Solar"));
    }

    #[test]
    fn price_shifts_choice_between_sectors() {
        let city = CityConfig::default().build();
        let catalog = MeasureCatalog::default();
        let mut prices = SectorMap::splat(1.0);
        prices[Sector::Public] = 100.0;
        let mut rng = StdRng::seed_from_u64(0);

        let action = greedy().choose_action(&city, &catalog, &prices, &mut rng);
        assert_eq!(action.map(|a| a.sector), Some(Sector::Public));
    }

    #[test]
    fn ties_resolve_to_first_in_enumeration_order() {
        let catalog = MeasureCatalog::new(vec![
            Measure::new("A", 10.0, 0.1, 1.0),
            Measure::new("B", 10.0, 0.1, 1.0),
        ]);
        let city = City::new(SectorMap::splat(500.0), 100.0);
        let prices = SectorMap::splat(1.0);
        let mut rng = StdRng::seed_from_u64(0);

        let action = greedy().choose_action(&city, &catalog, &prices, &mut rng);
        assert_eq!(action.map(|a| a.sector), Some(Sector::Apartments));
        assert_eq!(action.map(|a| a.measure.name.as_str()), Some("A"));
    }

    #[test]
    fn none_when_budget_too_small() {
        let city = City::new(SectorMap::splat(500.0), 5.0);
        let catalog = MeasureCatalog::default();
        let prices = SectorMap::splat(1.0);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(
            AdaptivePolicy::default()
                .choose_action(&city, &catalog, &prices, &mut rng)
                .is_none()
        );
    }

    #[test]
    fn full_exploration_returns_feasible_actions() {
        let city = City::new(SectorMap::splat(500.0), 12.0);
        let catalog = MeasureCatalog::default();
        let prices = SectorMap::splat(1.0);
        let mut rng = StdRng::seed_from_u64(11);
        let explorer = AdaptivePolicy::new(1.0);

        for _ in 0..50 {
            let action = explorer.choose_action(&city, &catalog, &prices, &mut rng);
            let action = action.expect("a feasible action exists");
            assert!(action.measure.cost <= city.budget);
        }
    }

    #[test]
    fn roi_matches_hand_computation() {
        let city = CityConfig::default().build();
        let led = Measure::new("LED", 15.0, 0.08, 1.0);
        let action = Action {
            sector: Sector::Apartments,
            measure: &led,
        };
        let prices = SectorMap::splat(1.5);
        let roi = AdaptivePolicy::roi(&action, &city, &prices);
        assert!((roi - 10_000_000.0 * 0.08 * 1.5 / 15.0).abs() < 1e-6);
    }
}
