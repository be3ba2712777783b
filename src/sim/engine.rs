//! Simulation engine driving one city through a fixed horizon of periods.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::city::{City, CityConfig, MeasureCatalog, Sector};
use crate::policy::Policy;
use crate::prices::{MultiSectorPriceModel, PriceProcess, Prices};

use super::types::{Outcome, PeriodResult, SimConfig};

/// Simulation engine owning the city, the price process, and the decision RNG.
///
/// Generic over the price process and RNG for static dispatch and so tests
/// can inject deterministic sources.
pub struct Engine<'a, M: PriceProcess, R: Rng> {
    config: SimConfig,
    catalog: &'a MeasureCatalog,
    city: City,
    prices: M,
    rng: R,
    period: usize,
}

impl<'a> Engine<'a, MultiSectorPriceModel<StdRng>, StdRng> {
    /// Builds an engine for a fresh city whose price and decision streams are
    /// both derived from `seed`.
    pub fn seeded(
        config: SimConfig,
        catalog: &'a MeasureCatalog,
        city: &CityConfig,
        seed: u64,
    ) -> Self {
        let mut master = StdRng::seed_from_u64(seed);
        let price_rng = StdRng::from_rng(&mut master);
        let decision_rng = StdRng::from_rng(&mut master);
        Self::new(
            config,
            catalog,
            city.build(),
            MultiSectorPriceModel::new(city.volatility, price_rng),
            decision_rng,
        )
    }
}

impl<'a, M: PriceProcess, R: Rng> Engine<'a, M, R> {
    /// Creates a new simulation engine.
    ///
    /// # Arguments
    ///
    /// * `config` - Horizon and budget rules
    /// * `catalog` - Measures available to the policy
    /// * `city` - Initial city state (consumed and mutated by the run)
    /// * `prices` - Price process advanced once per period
    /// * `rng` - Source of the policy's exploration draws
    pub fn new(
        config: SimConfig,
        catalog: &'a MeasureCatalog,
        city: City,
        prices: M,
        rng: R,
    ) -> Self {
        Self {
            config,
            catalog,
            city,
            prices,
            rng,
            period: 0,
        }
    }

    /// Executes one period with a frozen policy.
    pub fn step<P: Policy>(&mut self, policy: &P) -> PeriodResult {
        self.advance(|city, catalog, prices, rng| {
            let action = policy.choose_action(city, catalog, prices, rng)?;
            city.apply(action.measure, action.sector);
            Some((action.sector, action.measure.name.clone()))
        })
    }

    /// Executes one period, letting the policy learn from its action.
    pub fn train_step<P: Policy>(&mut self, policy: &mut P) -> PeriodResult {
        self.advance(|city, catalog, prices, rng| {
            policy
                .train_step(city, catalog, prices, rng)
                .map(|action| (action.sector, action.measure.name.clone()))
        })
    }

    /// Executes every remaining period with a frozen policy.
    pub fn run<P: Policy>(&mut self, policy: &P) -> Vec<PeriodResult> {
        let mut results = Vec::with_capacity(self.remaining());
        while self.period < self.config.horizon {
            results.push(self.step(policy));
        }
        results
    }

    /// Executes every remaining period in training mode.
    pub fn run_training<P: Policy>(&mut self, policy: &mut P) -> Vec<PeriodResult> {
        let mut results = Vec::with_capacity(self.remaining());
        while self.period < self.config.horizon {
            results.push(self.train_step(policy));
        }
        results
    }

    /// Current total energy and budget.
    pub fn outcome(&self) -> Outcome {
        Outcome {
            total_energy: self.city.total_energy(),
            budget: self.city.budget,
        }
    }

    pub fn city(&self) -> &City {
        &self.city
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    fn remaining(&self) -> usize {
        self.config.horizon.saturating_sub(self.period)
    }

    fn advance<F>(&mut self, decide: F) -> PeriodResult
    where
        F: FnOnce(&mut City, &MeasureCatalog, &Prices, &mut R) -> Option<(Sector, String)>,
    {
        // 1. Prices for this period
        let prices = self.prices.next_price();

        // 2. Snapshot energy, then act
        let energy_before = *self.city.energy();
        let action = decide(&mut self.city, self.catalog, &prices, &mut self.rng);

        // 3. Realized savings across all sectors
        let savings: f64 = energy_before
            .iter()
            .map(|(sector, before)| (before - self.city.sector_energy(sector)) * prices[sector])
            .sum();

        // 4. Replenish and carry the budget forward
        self.city.budget = self.config.base_budget + self.city.budget + savings;

        let result = PeriodResult {
            period: self.period,
            prices,
            action,
            savings,
            total_energy: self.city.total_energy(),
            budget: self.city.budget,
        };
        tracing::debug!(
            period = result.period,
            total_energy = result.total_energy,
            budget = result.budget,
            savings = result.savings,
            "period complete"
        );
        self.period += 1;
        result
    }
}

/// Runs one full horizon on a fresh city and returns the terminal outcome.
///
/// With `training` set, the policy's [`Policy::train_step`] is used so that
/// learning policies update themselves; otherwise the policy is only queried.
pub fn run_simulation<P: Policy>(
    policy: &mut P,
    config: &SimConfig,
    catalog: &MeasureCatalog,
    city: &CityConfig,
    training: bool,
    seed: u64,
) -> Outcome {
    let mut engine = Engine::seeded(config.clone(), catalog, city, seed);
    if training {
        engine.run_training(policy);
    } else {
        engine.run(policy);
    }
    engine.outcome()
}
