//! Helm CLI integration

mod client;
mod types;

pub use client::HelmClient;
pub use types::ChartRelease;
