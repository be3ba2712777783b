//! REST API over a finished policy evaluation.
//!
//! Provides two GET endpoints:
//! - `/summary`: scenario, learned weights, and the policy comparison
//! - `/samples`: per-replication outcomes of one policy with optional range filtering

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::config::ScenarioConfig;
use crate::policy::ValueWeights;
use crate::sim::kpi::PolicyComparison;
use crate::sim::monte_carlo::Samples;

pub use types::PolicyName;

/// Immutable application state shared across all request handlers.
///
/// Built once after evaluation completes and wrapped in `Arc`; every field
/// is read-only so handlers take no locks.
pub struct AppState {
    /// Scenario the evaluation ran under.
    pub scenario: ScenarioConfig,
    /// ADP weights used during evaluation.
    pub weights: ValueWeights,
    /// Outcomes of the ROI heuristic, by replication.
    pub adaptive: Samples,
    /// Outcomes of the ADP policy, by replication.
    pub adp: Samples,
    /// Adaptive-vs-ADP comparison statistics.
    pub comparison: PolicyComparison,
}

impl AppState {
    pub fn samples(&self, policy: PolicyName) -> &Samples {
        match policy {
            PolicyName::Adaptive => &self.adaptive,
            PolicyName::Adp => &self.adp,
        }
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        .route("/samples", get(handlers::get_samples))
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
