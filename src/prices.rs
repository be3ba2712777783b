//! Stochastic per-sector energy prices with a shared market shock.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::city::{Sector, SectorMap};

/// Price per unit of energy for every sector.
pub type Prices = SectorMap<f64>;

/// Weight of the market-wide shock in each sector's log-return.
const COMMON_SHOCK_WEIGHT: f64 = 0.7;
/// Weight of the sector-specific shock in each sector's log-return.
const LOCAL_SHOCK_WEIGHT: f64 = 0.3;

/// Source of the next period's price vector.
pub trait PriceProcess {
    /// Advances the process one period and returns a copy of the new prices.
    fn next_price(&mut self) -> Prices;
}

/// Geometric price process with cross-sector correlation.
///
/// Every period draws one common standard-normal shock `c` and one local
/// shock `e_s` per sector, then updates
///
/// ```text
/// p_s <- p_s * exp(g_s + 0.7 * v_s * c + 0.3 * v_s * e_s)
/// ```
///
/// The multiplicative form keeps prices positive for any volatility.
#[derive(Debug, Clone)]
pub struct MultiSectorPriceModel<R = StdRng> {
    prices: Prices,
    growth: SectorMap<f64>,
    volatility: SectorMap<f64>,
    rng: R,
}

impl MultiSectorPriceModel<StdRng> {
    /// Creates a model driven by a `StdRng` seeded from `seed`.
    pub fn seeded(volatility_scale: f64, seed: u64) -> Self {
        Self::new(volatility_scale, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> MultiSectorPriceModel<R> {
    /// Creates a model with all prices at 1.0, the per-sector reference drift,
    /// and base volatilities multiplied by `volatility_scale`.
    pub fn new(volatility_scale: f64, rng: R) -> Self {
        Self {
            prices: SectorMap::splat(1.0),
            growth: SectorMap::from_fn(Sector::price_growth),
            volatility: SectorMap::from_fn(|s| s.base_volatility() * volatility_scale),
            rng,
        }
    }

    /// Prices as of the last call to [`PriceProcess::next_price`].
    pub fn current(&self) -> &Prices {
        &self.prices
    }

    pub fn volatility(&self, sector: Sector) -> f64 {
        self.volatility[sector]
    }
}

impl<R: Rng> PriceProcess for MultiSectorPriceModel<R> {
    fn next_price(&mut self) -> Prices {
        let common: f64 = self.rng.sample(StandardNormal);

        for sector in Sector::ALL {
            let local: f64 = self.rng.sample(StandardNormal);
            let vol = self.volatility[sector];
            let log_return = self.growth[sector]
                + COMMON_SHOCK_WEIGHT * vol * common
                + LOCAL_SHOCK_WEIGHT * vol * local;
            self.prices[sector] *= log_return.exp();
        }

        self.prices
    }
}
