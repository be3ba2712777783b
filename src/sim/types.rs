//! Core simulation types: run configuration, per-period records, and outcomes.

use std::fmt;

use serde::Serialize;

use crate::city::Sector;
use crate::prices::Prices;

/// Horizon and budget rules shared by every run.
///
/// # Examples
///
/// ```
/// use energy_city::sim::types::SimConfig;
///
/// let cfg = SimConfig::default();
/// assert_eq!(cfg.horizon, 10);
/// assert_eq!(cfg.base_budget, 100.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimConfig {
    /// Number of periods per run.
    pub horizon: usize,
    /// Flat budget replenishment added every period.
    pub base_budget: f64,
}

impl SimConfig {
    /// Creates a new simulation configuration.
    ///
    /// # Panics
    ///
    /// Panics if `horizon` is zero.
    pub fn new(horizon: usize, base_budget: f64) -> Self {
        assert!(horizon > 0, "horizon must be > 0");
        Self {
            horizon,
            base_budget,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new(10, 100.0)
    }
}

/// Complete record of one simulated period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodResult {
    /// Zero-based period index.
    pub period: usize,
    /// Prices drawn for this period.
    pub prices: Prices,
    /// Sector and measure name of the applied action, if any.
    pub action: Option<(Sector, String)>,
    /// Monetary value of the energy saved this period.
    pub savings: f64,
    /// Total consumption after this period's action.
    pub total_energy: f64,
    /// Budget after replenishment.
    pub budget: f64,
}

impl fmt::Display for PeriodResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match &self.action {
            Some((sector, measure)) => format!("{measure} -> {sector}"),
            None => "none".to_string(),
        };
        write!(
            f,
            "period={:>2} | energy={:>14.1}  budget={:>12.2}  savings={:>12.2} | action={}",
            self.period, self.total_energy, self.budget, self.savings, action,
        )
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Outcome {
    pub total_energy: f64,
    pub budget: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::SectorMap;

    #[test]
    fn default_is_ten_periods() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.horizon, 10);
        assert_eq!(cfg.base_budget, 100.0);
    }

    #[test]
    #[should_panic]
    fn zero_horizon_panics() {
        SimConfig::new(0, 100.0);
    }

    #[test]
    fn period_result_display_does_not_panic() {
        let r = PeriodResult {
            period: 3,
            prices: SectorMap::splat(1.1),
            action: Some((Sector::Houses, "Solar".to_string())),
            savings: 12.5,
            total_energy: 1_000.0,
            budget: 230.0,
        };
        let s = format!("{r}");
        assert!(s.contains("Solar -> houses"));
    }
}
