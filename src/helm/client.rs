use std::sync::Arc;

use tracing::info;

use super::types::ChartRelease;
use crate::shell::{run_unchecked, CommandLine, CommandRunner};

/// Thin wrapper over the Helm CLI
#[derive(Clone)]
pub struct HelmClient {
    runner: Arc<dyn CommandRunner>,
}

impl HelmClient {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Build the `helm upgrade --install` command for a release
    pub fn install_command(release: &ChartRelease) -> CommandLine {
        let mut cmd = CommandLine::new("helm")
            .args(["upgrade", "--install"])
            .arg(&release.release_name)
            .arg(&release.chart);

        if let Some(repo) = &release.repo {
            cmd = cmd.arg("--repo").arg(repo);
        }

        cmd = cmd
            .arg("--namespace")
            .arg(&release.namespace)
            .arg("--create-namespace");

        for (key, value) in &release.values {
            cmd = cmd.arg("--set").arg(format!("{}={}", key, value));
        }

        cmd
    }

    /// Install or upgrade a chart; failures are logged, not returned
    pub async fn install_chart(&self, release: &ChartRelease) {
        info!(
            release = %release.release_name,
            chart = %release.chart,
            namespace = %release.namespace,
            "Installing Helm chart"
        );
        run_unchecked(self.runner.as_ref(), &Self::install_command(release)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_command() {
        let release = ChartRelease::new("zlog-collector", "zlog-collector", "zebrium")
            .with_repo("https://charts.example.com")
            .with_value("zebrium.authToken", "secret");

        assert_eq!(
            HelmClient::install_command(&release).to_string(),
            "helm upgrade --install zlog-collector zlog-collector --repo https://charts.example.com \
             --namespace zebrium --create-namespace --set zebrium.authToken=secret"
        );
    }

    #[test]
    fn test_install_command_without_repo() {
        let release = ChartRelease::new("r", "repo/chart", "ns");
        let cmd = HelmClient::install_command(&release);
        assert!(!cmd.get_args().iter().any(|a| a == "--repo"));
        assert_eq!(
            cmd.to_string(),
            "helm upgrade --install r repo/chart --namespace ns --create-namespace"
        );
    }
}
