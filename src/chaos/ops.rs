//! Cluster operations needed to drive one Litmus experiment

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::DemoResult;

/// What the experiment runner needs from the cluster.
///
/// Implemented over kubectl ([`super::KubectlChaosOps`]) and over the API
/// server ([`super::KubeChaosClient`]); tests supply their own.
#[async_trait]
pub trait ChaosOps: Send + Sync {
    /// Remove a ChaosEngine; a missing engine is not an error
    async fn delete_engine(&self, name: &str, namespace: &str) -> DemoResult<()>;

    /// Create or update the resources described by the manifest file
    async fn apply_manifest(&self, path: &Path, namespace: &str) -> DemoResult<()>;

    /// `status.experiments[0].status` of the engine, `None` while unset
    async fn engine_status(&self, name: &str, namespace: &str) -> DemoResult<Option<String>>;

    /// Logs from pods matching `selector` written within the last `since`
    async fn recent_logs(&self, selector: &str, namespace: &str, since: Duration)
        -> DemoResult<String>;

    /// Human-readable dump of a ChaosResult
    async fn describe_result(&self, name: &str, namespace: &str) -> DemoResult<String>;

    /// Verdict of a ChaosResult, `None` while unset
    async fn result_verdict(&self, name: &str, namespace: &str) -> DemoResult<Option<String>>;
}
