//! Litmus chaos experiment driver
//!
//! Runs ChaosEngine manifests from a directory against the demo cluster:
//! - patches each manifest with a ramp time
//! - waits for Litmus to finish the experiment
//! - collects the ChaosResult verdicts into a summary

pub mod catalog;
pub mod clock;
mod client;
mod kubectl;
pub mod manifest;
mod ops;
pub mod runner;
pub mod suite;
pub mod types;

pub use catalog::{list_experiments, render_listing, ExperimentEntry};
pub use client::KubeChaosClient;
pub use kubectl::KubectlChaosOps;
pub use ops::ChaosOps;
pub use runner::{ExperimentRunner, RunnerSettings};
pub use suite::{abort_summary, render_summary, ExperimentSuite, SuiteAborted};
pub use types::*;
