//! Simulation engine, Monte Carlo evaluation, training, and outcome statistics.

pub mod engine;
pub mod kpi;
/// Batches of independent replications.
pub mod monte_carlo;
/// ADP training episodes.
pub mod training;
pub mod types;
