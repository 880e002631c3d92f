use std::sync::Arc;

use tracing::{info, warn};

use super::ingress::parse_ingress_ip;
use crate::config::Config;
use crate::helm::{ChartRelease, HelmClient};
use crate::output;
use crate::shell::{run_unchecked, CommandLine, CommandRunner};

/// Which GKE cluster to act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSpec {
    pub project: Option<String>,
    pub zone: String,
    pub name: String,
}

/// Creates and tears down the demo environment.
///
/// Every step is an external command; a failing step is reported and the
/// sequence carries on.
pub struct ClusterLifecycle {
    runner: Arc<dyn CommandRunner>,
    helm: HelmClient,
    config: Config,
}

impl ClusterLifecycle {
    pub fn new(runner: Arc<dyn CommandRunner>, config: Config) -> Self {
        let helm = HelmClient::new(runner.clone());
        Self {
            runner,
            helm,
            config,
        }
    }

    async fn step(&self, cmd: CommandLine) {
        run_unchecked(self.runner.as_ref(), &cmd).await;
    }

    async fn set_project(&self, spec: &ClusterSpec) {
        match &spec.project {
            Some(project) => {
                self.step(CommandLine::new("gcloud").args(["config", "set", "project", project.as_str()]))
                    .await
            }
            None => warn!("No project given, using the active gcloud project"),
        }
    }

    /// Bring up the cluster and deploy the collector, sock-shop and Litmus.
    ///
    /// Returns the ingress IP when it is already assigned.
    pub async fn start(&self, spec: &ClusterSpec, collector_key: Option<&str>) -> Option<String> {
        output::banner(format!(
            "Starting GKE cluster {} in project {} (zone {})",
            spec.name,
            spec.project.as_deref().unwrap_or("<active>"),
            spec.zone
        ));

        self.step(CommandLine::new("gcloud").args(["components", "update", "--quiet"]))
            .await;
        self.set_project(spec).await;

        self.step(CommandLine::new("gcloud").args([
            "container",
            "clusters",
            "create",
            spec.name.as_str(),
            "--zone",
            spec.zone.as_str(),
        ]))
        .await;
        self.step(CommandLine::new("gcloud").args([
            "container",
            "clusters",
            "get-credentials",
            spec.name.as_str(),
            "--zone",
            spec.zone.as_str(),
        ]))
        .await;

        output::step("GKE cluster running with the following nodes:");
        self.step(CommandLine::new("kubectl").args(["get", "nodes"]))
            .await;

        match collector_key {
            Some(key) => {
                output::step("Deploying Zebrium log collector");
                let release = ChartRelease::new(
                    "zlog-collector",
                    "zlog-collector",
                    &self.config.collector_namespace,
                )
                .with_repo(&self.config.collector_chart_repo)
                .with_value("zebrium.collectorUrl", &self.config.collector_url)
                .with_value("zebrium.authToken", key);
                self.helm.install_chart(&release).await;
            }
            None => output::warning("No collector key given, skipping the Zebrium log collector"),
        }

        output::step("Deploying sock-shop");
        let sock_shop = self.config.deploy_dir.join("sock-shop.yaml");
        self.step(
            CommandLine::new("kubectl")
                .args(["create", "-f"])
                .arg(sock_shop.display().to_string()),
        )
        .await;

        output::step("Deploying Litmus chaos operator and experiments");
        self.step(
            CommandLine::new("kubectl")
                .args(["apply", "-f"])
                .arg(&self.config.litmus_operator_url),
        )
        .await;
        self.step(
            CommandLine::new("kubectl")
                .args(["apply", "-f"])
                .arg(&self.config.litmus_experiments_url)
                .args(["-n", self.config.app_namespace.as_str()]),
        )
        .await;
        let rbac = self.config.litmus_dir.join("rbac.yaml");
        self.step(
            CommandLine::new("kubectl")
                .args(["apply", "-f"])
                .arg(rbac.display().to_string()),
        )
        .await;

        output::step("Ingress details:");
        self.step(self.ingress_command()).await;

        let ip = self.ingress_ip().await;
        match &ip {
            Some(ip) => output::success(format!(
                "You can access the web application in a few minutes at: http://{}",
                ip
            )),
            None => {
                output::warning("Ingress still being set up. Use the following command to get the IP later:");
                println!("\t{}", self.ingress_command());
            }
        }

        output::success(
            "Finished creating cluster. Please wait a few minutes for the environment to fully initialise.",
        );
        println!("The ingress to access the web application can take at least 5 minutes to create.");

        ip
    }

    /// Delete the cluster
    pub async fn stop(&self, spec: &ClusterSpec) {
        output::banner(format!(
            "Stopping GKE cluster {} in project {} (zone {})",
            spec.name,
            spec.project.as_deref().unwrap_or("<active>"),
            spec.zone
        ));

        self.set_project(spec).await;
        self.step(CommandLine::new("gcloud").args([
            "container",
            "clusters",
            "delete",
            spec.name.as_str(),
            "--zone",
            spec.zone.as_str(),
            "--quiet",
        ]))
        .await;
    }

    fn ingress_command(&self) -> CommandLine {
        CommandLine::new("kubectl")
            .args(["get", "ingress", self.config.ingress_name.as_str()])
            .arg(format!("--namespace={}", self.config.app_namespace))
    }

    /// Best effort: any failure just means "not yet"
    async fn ingress_ip(&self) -> Option<String> {
        let cmd = self.ingress_command().args(["-o", "json"]);
        match self.runner.capture(&cmd).await {
            Ok(json) => {
                let ip = parse_ingress_ip(&json);
                info!(ip = ?ip, "Ingress lookup finished");
                ip
            }
            Err(e) => {
                info!(error = %e, "Ingress not readable yet");
                None
            }
        }
    }
}
