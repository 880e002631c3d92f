//! Zebrium Kubernetes demo driver
//!
//! Provisions a GKE cluster with sock-shop, the Zebrium log collector and the
//! Litmus operator, then runs Litmus chaos experiments against it one at a
//! time and summarises their verdicts.

pub mod chaos;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod helm;
pub mod output;
pub mod shell;
pub mod shutdown;

use std::sync::Arc;

use crate::chaos::{ChaosOps, KubeChaosClient, KubectlChaosOps};
use crate::config::Backend;
use crate::error::DemoResult;
use crate::shell::CommandRunner;

/// Build the [`ChaosOps`] implementation selected by `backend`
pub async fn chaos_ops(
    backend: Backend,
    runner: Arc<dyn CommandRunner>,
) -> DemoResult<Arc<dyn ChaosOps>> {
    let ops: Arc<dyn ChaosOps> = match backend {
        Backend::Kubectl => Arc::new(KubectlChaosOps::new(runner)),
        Backend::Api => Arc::new(KubeChaosClient::new().await?),
    };
    Ok(ops)
}
