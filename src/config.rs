use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;
use strum::{Display, EnumString};

/// Which implementation drives the Litmus resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Backend {
    /// Shell out to kubectl
    Kubectl,
    /// Talk to the API server with kube
    Api,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_experiments_dir")]
    pub experiments_dir: PathBuf,

    #[serde(default = "default_litmus_dir")]
    pub litmus_dir: PathBuf,

    #[serde(default = "default_deploy_dir")]
    pub deploy_dir: PathBuf,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_log_lookback_secs")]
    pub log_lookback_secs: u64,

    #[serde(default = "default_backend")]
    pub backend: Backend,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    #[serde(default = "default_collector_url")]
    pub collector_url: String,

    #[serde(default = "default_collector_chart_repo")]
    pub collector_chart_repo: String,

    #[serde(default = "default_collector_namespace")]
    pub collector_namespace: String,

    #[serde(default = "default_app_namespace")]
    pub app_namespace: String,

    #[serde(default = "default_ingress_name")]
    pub ingress_name: String,

    #[serde(default = "default_litmus_operator_url")]
    pub litmus_operator_url: String,

    #[serde(default = "default_litmus_experiments_url")]
    pub litmus_experiments_url: String,

    /// Print the summary of finished experiments when the suite is interrupted
    #[serde(default)]
    pub partial_summary_on_cancel: bool,
}

fn default_experiments_dir() -> PathBuf {
    PathBuf::from("litmus/experiments")
}

fn default_litmus_dir() -> PathBuf {
    PathBuf::from("litmus")
}

fn default_deploy_dir() -> PathBuf {
    PathBuf::from("deploy")
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_log_lookback_secs() -> u64 {
    10
}

fn default_backend() -> Backend {
    Backend::Kubectl
}

fn default_log_format() -> LogFormat {
    LogFormat::Text
}

fn default_collector_url() -> String {
    "https://zapi03.zebrium.com".to_string()
}

fn default_collector_chart_repo() -> String {
    "https://raw.githubusercontent.com/zebrium/ze-kubernetes-collector/master/charts".to_string()
}

fn default_collector_namespace() -> String {
    "zebrium".to_string()
}

fn default_app_namespace() -> String {
    "sock-shop".to_string()
}

fn default_ingress_name() -> String {
    "basic-ingress".to_string()
}

fn default_litmus_operator_url() -> String {
    "https://litmuschaos.github.io/pages/litmus-operator-v1.0.0.yaml".to_string()
}

fn default_litmus_experiments_url() -> String {
    "https://hub.litmuschaos.io/api/chaos?file=charts/generic/experiments.yaml".to_string()
}

impl Config {
    /// Load settings from `LITMUS_DEMO_*` environment variables, after an optional `.env`
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("LITMUS_DEMO"))
            .build()?;

        let settings: Config = config.try_deserialize()?;

        Ok(settings)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            experiments_dir: default_experiments_dir(),
            litmus_dir: default_litmus_dir(),
            deploy_dir: default_deploy_dir(),
            poll_interval_secs: default_poll_interval_secs(),
            log_lookback_secs: default_log_lookback_secs(),
            backend: default_backend(),
            log_format: default_log_format(),
            collector_url: default_collector_url(),
            collector_chart_repo: default_collector_chart_repo(),
            collector_namespace: default_collector_namespace(),
            app_namespace: default_app_namespace(),
            ingress_name: default_ingress_name(),
            litmus_operator_url: default_litmus_operator_url(),
            litmus_experiments_url: default_litmus_experiments_url(),
            partial_summary_on_cancel: false,
        }
    }
}
