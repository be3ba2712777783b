//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ErrorResponse, SampleRecord, SamplesQuery, SummaryResponse};

/// Returns the scenario, weights, and comparison statistics.
///
/// `GET /summary` → 200 + `SummaryResponse` JSON
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<SummaryResponse> {
    Json(SummaryResponse {
        scenario: state.scenario.clone(),
        weights: state.weights,
        replications: state.adaptive.len(),
        comparison: state.comparison.clone(),
    })
}

/// Returns one policy's outcomes, optionally filtered by replication range.
///
/// `GET /samples?policy=adp` → 200 + `Vec<SampleRecord>` JSON
/// `GET /samples?policy=adp&from=N&to=M` → filtered range (inclusive)
/// `GET /samples?policy=adp&from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_samples(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SamplesQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }

    let records: Vec<SampleRecord> = state
        .samples(query.policy)
        .iter()
        .enumerate()
        .filter(|(i, _)| *i >= from && *i <= to)
        .map(|(replication, (total_energy, budget))| SampleRecord {
            replication,
            total_energy,
            budget,
        })
        .collect();

    Ok(Json(records))
}
