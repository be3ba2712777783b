//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::config::ScenarioConfig;
use crate::policy::ValueWeights;
use crate::sim::kpi::PolicyComparison;

/// Scenario, learned weights, and comparison statistics.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub scenario: ScenarioConfig,
    pub weights: ValueWeights,
    /// Replications per policy.
    pub replications: usize,
    pub comparison: PolicyComparison,
}

/// One replication's terminal outcome.
#[derive(Debug, Serialize, PartialEq)]
pub struct SampleRecord {
    pub replication: usize,
    pub total_energy: f64,
    pub budget: f64,
}

/// Policy selector accepted in query strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyName {
    Adaptive,
    Adp,
}

/// Query parameters for the samples endpoint.
#[derive(Debug, Deserialize)]
pub struct SamplesQuery {
    /// Policy whose samples to return.
    pub policy: PolicyName,
    /// First replication (inclusive).
    pub from: Option<usize>,
    /// Last replication (inclusive).
    pub to: Option<usize>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_name_parses_snake_case() {
        let name: PolicyName = serde_json::from_str("\"adp\"").unwrap();
        assert_eq!(name, PolicyName::Adp);
        let bad: Result<PolicyName, _> = serde_json::from_str("\"greedy\"");
        assert!(bad.is_err());
    }
}
