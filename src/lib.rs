//! City energy-efficiency investment simulator.
//!
//! A city of three building sectors faces correlated stochastic energy
//! prices and a per-period budget. Policies pick one efficiency measure per
//! period; Monte Carlo evaluation compares a greedy ROI heuristic with a
//! linear value-function (ADP) policy trained by TD(0).

/// REST API over a finished evaluation (requires the `api` feature).
#[cfg(feature = "api")]
pub mod api;
/// Sectors, measures, and the mutable city state.
pub mod city;
pub mod config;
pub mod io;
/// Investment policies and learned weight persistence.
pub mod policy;
pub mod prices;
/// Simulation engine, Monte Carlo evaluation, training, and statistics.
pub mod sim;
