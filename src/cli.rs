use clap::{Args, Parser, Subcommand};

use crate::chaos::Selector;
use crate::cluster::ClusterSpec;

pub const DEFAULT_ZONE: &str = "us-central1-a";
pub const DEFAULT_CLUSTER_NAME: &str = "zebrium-k8s-demo";

#[derive(Debug, Parser)]
#[command(name = "litmus-demo")]
#[command(about = "Spin up the Zebrium demo environment on Kubernetes and run Litmus chaos experiments")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the GKE cluster and deploy the demo environment
    Start(StartArgs),
    /// Run Litmus chaos experiments against the cluster
    Test(TestArgs),
    /// Delete the GKE cluster
    Stop(ClusterArgs),
    /// List the available chaos experiments
    List,
}

#[derive(Debug, Clone, Args)]
pub struct ClusterArgs {
    /// GCloud project to spin the GKE cluster up in
    #[arg(short, long)]
    pub project: Option<String>,

    /// GCloud zone to spin the GKE cluster up in
    #[arg(short, long, default_value = DEFAULT_ZONE)]
    pub zone: String,

    /// GKE cluster name
    #[arg(short, long, default_value = DEFAULT_CLUSTER_NAME)]
    pub name: String,
}

impl ClusterArgs {
    pub fn spec(&self) -> ClusterSpec {
        ClusterSpec {
            project: self.project.clone(),
            zone: self.zone.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct StartArgs {
    #[command(flatten)]
    pub cluster: ClusterArgs,

    /// Zebrium collector key for the demo account
    #[arg(short, long)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct TestArgs {
    /// Experiment to run, or '*' for all of them
    #[arg(short = 't', long = "test", default_value = "*")]
    pub test: String,

    /// Minutes to wait between experiments
    #[arg(short, long, default_value_t = 11)]
    pub wait: u64,

    /// Seconds of ramp time before each experiment injects chaos
    #[arg(short, long, default_value_t = 660)]
    pub delay: u64,
}

impl TestArgs {
    pub fn selector(&self) -> Selector {
        Selector::from(self.test.as_str())
    }
}
