//! GKE demo environment lifecycle
//!
//! - Creating and deleting the cluster with gcloud
//! - Deploying the Zebrium collector with Helm
//! - Deploying sock-shop and the Litmus operator with kubectl

mod ingress;
mod lifecycle;

pub use ingress::parse_ingress_ip;
pub use lifecycle::{ClusterLifecycle, ClusterSpec};
