//! [`ChaosOps`] over the kubectl CLI

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::ops::ChaosOps;
use crate::error::DemoResult;
use crate::shell::{CommandLine, CommandRunner};

/// Drives Litmus resources with the same kubectl commands an operator would type
#[derive(Clone)]
pub struct KubectlChaosOps {
    runner: Arc<dyn CommandRunner>,
}

impl KubectlChaosOps {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn kubectl() -> CommandLine {
        CommandLine::new("kubectl")
    }

    /// Empty output means the field is not set yet
    fn non_empty(output: String) -> Option<String> {
        let trimmed = output.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[async_trait]
impl ChaosOps for KubectlChaosOps {
    async fn delete_engine(&self, name: &str, namespace: &str) -> DemoResult<()> {
        let cmd = Self::kubectl().args([
            "delete",
            "chaosengine",
            name,
            "-n",
            namespace,
            "--ignore-not-found",
        ]);
        if let Some(code) = self.runner.run(&cmd).await?.filter(|c| *c != 0) {
            warn!(engine = name, code, "kubectl delete chaosengine failed");
        }
        Ok(())
    }

    async fn apply_manifest(&self, path: &Path, namespace: &str) -> DemoResult<()> {
        let cmd = Self::kubectl()
            .args(["apply", "-f"])
            .arg(path.display().to_string())
            .args(["-n", namespace]);
        if let Some(code) = self.runner.run(&cmd).await?.filter(|c| *c != 0) {
            warn!(path = %path.display(), code, "kubectl apply failed");
        }
        Ok(())
    }

    async fn engine_status(&self, name: &str, namespace: &str) -> DemoResult<Option<String>> {
        let cmd = Self::kubectl().args([
            "get",
            "chaosengine",
            name,
            "-n",
            namespace,
            "-o",
            "jsonpath={.status.experiments[0].status}",
        ]);
        self.runner.capture(&cmd).await.map(Self::non_empty)
    }

    async fn recent_logs(
        &self,
        selector: &str,
        namespace: &str,
        since: Duration,
    ) -> DemoResult<String> {
        let cmd = Self::kubectl()
            .args(["logs", "-l", selector, "-n", namespace])
            .arg(format!("--since={}s", since.as_secs()));
        self.runner.capture(&cmd).await
    }

    async fn describe_result(&self, name: &str, namespace: &str) -> DemoResult<String> {
        let cmd = Self::kubectl().args(["describe", "chaosresult", name, "-n", namespace]);
        self.runner.capture(&cmd).await
    }

    async fn result_verdict(&self, name: &str, namespace: &str) -> DemoResult<Option<String>> {
        let cmd = Self::kubectl().args([
            "get",
            "chaosresult",
            name,
            "-n",
            namespace,
            "-o",
            "jsonpath={.status.experimentstatus.verdict}",
        ]);
        self.runner.capture(&cmd).await.map(Self::non_empty)
    }
}
