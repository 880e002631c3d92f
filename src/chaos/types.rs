//! Litmus resource definitions and run records

use chrono::{DateTime, Utc};
use kube::discovery::ApiResource;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Engine status reported once an experiment has finished
pub const EXECUTION_SUCCESSFUL: &str = "Execution Successful";

/// Status reported when a ChaosResult carries no verdict
pub const UNKNOWN_VERDICT: &str = "Unknown";

/// `litmuschaos.io/v1alpha1` ChaosEngine
pub fn chaos_engine_resource() -> ApiResource {
    ApiResource {
        group: "litmuschaos.io".to_string(),
        version: "v1alpha1".to_string(),
        api_version: "litmuschaos.io/v1alpha1".to_string(),
        kind: "ChaosEngine".to_string(),
        plural: "chaosengines".to_string(),
    }
}

/// `litmuschaos.io/v1alpha1` ChaosResult
pub fn chaos_result_resource() -> ApiResource {
    ApiResource {
        group: "litmuschaos.io".to_string(),
        version: "v1alpha1".to_string(),
        api_version: "litmuschaos.io/v1alpha1".to_string(),
        kind: "ChaosResult".to_string(),
        plural: "chaosresults".to_string(),
    }
}

/// Litmus names a ChaosResult `<engine>-<experiment>`
pub fn chaos_result_name(engine_name: &str, experiment_id: &str) -> String {
    format!("{}-{}", engine_name, experiment_id)
}

/// Label selector for the pods an experiment spawns
pub fn experiment_pod_selector(experiment_id: &str) -> String {
    format!("name={}", experiment_id)
}

/// `status.experiments[0].status` of a ChaosEngine object
pub fn engine_status(engine: &Value) -> Option<&str> {
    engine
        .get("status")
        .and_then(|s| s.get("experiments"))
        .and_then(|e| e.get(0))
        .and_then(|e| e.get("status"))
        .and_then(|s| s.as_str())
}

/// `status.experimentstatus.verdict` of a ChaosResult object
pub fn result_verdict(result: &Value) -> Option<&str> {
    result
        .get("status")
        .and_then(|s| s.get("experimentstatus"))
        .and_then(|e| e.get("verdict"))
        .and_then(|v| v.as_str())
}

/// Where the runner is in an experiment's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Done,
}

impl PollState {
    pub fn from_status(status: Option<&str>) -> Self {
        match status {
            Some(s) if s == EXECUTION_SUCCESSFUL => PollState::Done,
            _ => PollState::Polling,
        }
    }
}

/// Outcome of one completed experiment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub experiment_name: String,
    /// Verdict as reported by Litmus, e.g. "Pass" or "Fail"
    pub status: String,
    pub start_time: DateTime<Utc>,
}

/// Which experiments a `test` invocation runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    All,
    One(String),
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        match s.trim() {
            "*" => Selector::All,
            id => Selector::One(id.to_string()),
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::All => write!(f, "*"),
            Selector::One(id) => write!(f, "{}", id),
        }
    }
}
