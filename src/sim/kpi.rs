//! Post-hoc statistics over Monte Carlo outcome samples.

use std::fmt;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use super::monte_carlo::Samples;

/// z-score of a two-sided 95% normal interval.
const Z_95: f64 = 1.96;

/// Location and spread of one sample sequence.
///
/// `std` is the population standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl SampleSummary {
    /// Summarizes `values`; an empty slice yields all zeros.
    pub fn from_samples(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                count: 0,
                mean: 0.0,
                std: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            count: values.len(),
            mean,
            std: var.sqrt(),
            min,
            max,
        }
    }
}

impl fmt::Display for SampleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean={:.3}  std={:.3}  min={:.3}  max={:.3}  (n={})",
            self.mean, self.std, self.min, self.max, self.count
        )
    }
}

/// Two-policy comparison over index-aligned samples.
///
/// Differences are taken as `a - b`; for energy a positive difference means
/// policy `b` ends with lower consumption.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyComparison {
    pub energy_a: SampleSummary,
    pub energy_b: SampleSummary,
    pub budget_a: SampleSummary,
    pub budget_b: SampleSummary,
    /// `mean(energy_a) - mean(energy_b)`.
    pub energy_mean_diff: f64,
    /// Half-width of the 95% normal interval on the paired energy difference.
    pub energy_diff_ci95: f64,
    /// Mean difference over the root-mean-square of the two population stds.
    pub cohens_d: f64,
    /// Welch's unequal-variance t statistic on final energy.
    pub welch_t: f64,
    /// Two-sided p-value of `welch_t` under the Welch-Satterthwaite degrees
    /// of freedom; 1.0 when either sample has no spread.
    pub welch_p: f64,
    /// Share of `a` outcomes weakly dominated by some `b` outcome.
    pub pareto_b_over_a: f64,
    /// Budget mean over budget std for each policy.
    pub budget_sharpe_a: f64,
    pub budget_sharpe_b: f64,
}

impl PolicyComparison {
    /// Compares two sample sets replication by replication.
    ///
    /// # Panics
    ///
    /// Panics if the two sets have different lengths, since paired
    /// statistics require index alignment.
    pub fn from_samples(a: &Samples, b: &Samples) -> Self {
        assert_eq!(a.len(), b.len(), "paired samples must be index-aligned");

        let energy_a = SampleSummary::from_samples(&a.energy);
        let energy_b = SampleSummary::from_samples(&b.energy);
        let budget_a = SampleSummary::from_samples(&a.budget);
        let budget_b = SampleSummary::from_samples(&b.budget);

        let energy_mean_diff = energy_a.mean - energy_b.mean;

        let diffs: Vec<f64> = a.energy.iter().zip(&b.energy).map(|(x, y)| x - y).collect();
        let diff_summary = SampleSummary::from_samples(&diffs);
        let energy_diff_ci95 = if diffs.is_empty() {
            0.0
        } else {
            Z_95 * diff_summary.std / (diffs.len() as f64).sqrt()
        };

        let pooled_std = ((energy_a.std.powi(2) + energy_b.std.powi(2)) / 2.0).sqrt();
        let cohens_d = ratio_or_zero(energy_mean_diff, pooled_std);

        let welch_t = welch_t(&a.energy, &b.energy);
        let welch_p = welch_p(&a.energy, &b.energy);

        Self {
            energy_a,
            energy_b,
            budget_a,
            budget_b,
            energy_mean_diff,
            energy_diff_ci95,
            cohens_d,
            welch_t,
            welch_p,
            pareto_b_over_a: pareto_dominance(a, b),
            budget_sharpe_a: ratio_or_zero(budget_a.mean, budget_a.std),
            budget_sharpe_b: ratio_or_zero(budget_b.mean, budget_b.std),
        }
    }

    /// Lower and upper bound of the 95% interval on the energy difference.
    pub fn energy_diff_interval(&self) -> (f64, f64) {
        (
            self.energy_mean_diff - self.energy_diff_ci95,
            self.energy_mean_diff + self.energy_diff_ci95,
        )
    }
}

impl fmt::Display for PolicyComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lo, hi) = self.energy_diff_interval();
        writeln!(f, "Energy mean difference:  {:.3}", self.energy_mean_diff)?;
        writeln!(f, "95% CI (paired):         [{lo:.3}, {hi:.3}]")?;
        writeln!(f, "Cohen's d:               {:.4}", self.cohens_d)?;
        writeln!(f, "Welch t-statistic:       {:.4}", self.welch_t)?;
        writeln!(f, "Welch p-value:           {:.4}", self.welch_p)?;
        writeln!(f, "Pareto dominance (b/a):  {:.3}", self.pareto_b_over_a)?;
        write!(
            f,
            "Budget Sharpe-like:      {:.3} vs {:.3}",
            self.budget_sharpe_a, self.budget_sharpe_b
        )
    }
}

/// Fraction of outcomes in `a` for which some outcome in `b` uses no more
/// energy and ends with at least as much budget.
///
/// Zero when `a` is empty.
pub fn pareto_dominance(a: &Samples, b: &Samples) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let dominated = a
        .iter()
        .filter(|&(ea, ba)| b.iter().any(|(eb, bb)| eb <= ea && bb >= ba))
        .count();
    dominated as f64 / a.len() as f64
}

fn ratio_or_zero(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

/// Sample (n - 1) variance; zero for fewer than two values.
fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
}

fn welch_t(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let mean_a = a.iter().sum::<f64>() / a.len() as f64;
    let mean_b = b.iter().sum::<f64>() / b.len() as f64;
    let se = (sample_variance(a) / a.len() as f64 + sample_variance(b) / b.len() as f64).sqrt();
    ratio_or_zero(mean_a - mean_b, se)
}

fn welch_p(a: &[f64], b: &[f64]) -> f64 {
    if a.len() < 2 || b.len() < 2 {
        return 1.0;
    }
    let va = sample_variance(a) / a.len() as f64;
    let vb = sample_variance(b) / b.len() as f64;
    if va + vb <= 0.0 {
        return 1.0;
    }
    let df = (va + vb).powi(2)
        / (va.powi(2) / (a.len() - 1) as f64 + vb.powi(2) / (b.len() - 1) as f64);
    let t = welch_t(a, b);
    StudentsT::new(0.0, 1.0, df).map_or(1.0, |dist| 2.0 * dist.sf(t.abs()))
}
