//! Single experiment execution
//!
//! A run deletes any previous ChaosEngine of the same name, applies the patched
//! manifest and then polls the engine until Litmus reports
//! [`EXECUTION_SUCCESSFUL`]. There is no timeout: experiments can take as long
//! as they take, and the operator interrupts with Ctrl+C.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::catalog::ExperimentEntry;
use super::clock::{Clock, SystemClock};
use super::manifest;
use super::ops::ChaosOps;
use super::types::{
    chaos_result_name, experiment_pod_selector, ExperimentResult, PollState,
    EXECUTION_SUCCESSFUL, UNKNOWN_VERDICT,
};
use crate::config::Config;
use crate::error::{DemoError, DemoResult};
use crate::output;
use crate::shutdown::ShutdownSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerSettings {
    pub poll_interval: Duration,
    /// How far back each poll's log dump reaches
    pub log_lookback: Duration,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            log_lookback: Duration::from_secs(10),
        }
    }
}

impl From<&Config> for RunnerSettings {
    fn from(config: &Config) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            log_lookback: Duration::from_secs(config.log_lookback_secs),
        }
    }
}

pub struct ExperimentRunner {
    ops: Arc<dyn ChaosOps>,
    clock: Arc<dyn Clock>,
    settings: RunnerSettings,
    shutdown: ShutdownSignal,
}

impl ExperimentRunner {
    pub fn new(ops: Arc<dyn ChaosOps>, shutdown: ShutdownSignal, settings: RunnerSettings) -> Self {
        Self {
            ops,
            clock: Arc::new(SystemClock),
            settings,
            shutdown,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Run one experiment to completion.
    ///
    /// Returns [`DemoError::Cancelled`] if shutdown is requested while
    /// waiting. The patched manifest is deleted on every path out.
    pub async fn run(
        &self,
        experiment: &ExperimentEntry,
        delay_seconds: u64,
    ) -> DemoResult<ExperimentResult> {
        let id = experiment.id.as_str();
        let patched = manifest::prepare(&experiment.path, delay_seconds)?;
        let engine = patched.name.as_str();
        let namespace = patched.namespace.as_str();

        output::step(format!(
            "Running experiment {} (engine {} in namespace {})",
            id, engine, namespace
        ));

        if let Err(e) = self.ops.delete_engine(engine, namespace).await {
            warn!(experiment = id, error = %e, "Failed to delete previous ChaosEngine");
        }
        if let Err(e) = self.ops.apply_manifest(patched.path(), namespace).await {
            warn!(experiment = id, error = %e, "Failed to apply ChaosEngine");
        }

        let start_time = self.clock.now();
        let polls = self.wait_for_completion(id, engine, namespace).await?;
        info!(experiment = id, polls, "Experiment execution finished");

        let result_name = chaos_result_name(engine, id);
        match self.ops.describe_result(&result_name, namespace).await {
            Ok(text) => println!("{}", text),
            Err(e) => warn!(result = %result_name, error = %e, "Failed to describe ChaosResult"),
        }

        let status = match self.ops.result_verdict(&result_name, namespace).await {
            Ok(Some(verdict)) => verdict,
            Ok(None) => UNKNOWN_VERDICT.to_string(),
            Err(e) => {
                warn!(result = %result_name, error = %e, "Failed to read verdict");
                UNKNOWN_VERDICT.to_string()
            }
        };

        drop(patched);

        output::success(format!("Experiment {} finished: {}", id, output::verdict(&status)));

        Ok(ExperimentResult {
            experiment_name: id.to_string(),
            status,
            start_time,
        })
    }

    /// Poll until the engine reports completion; returns the number of polls
    async fn wait_for_completion(
        &self,
        experiment_id: &str,
        engine: &str,
        namespace: &str,
    ) -> DemoResult<u32> {
        let mut shutdown = self.shutdown.clone();
        let selector = experiment_pod_selector(experiment_id);
        let mut state = PollState::Polling;
        let mut polls = 0;

        while state == PollState::Polling {
            polls += 1;
            let status = match self.ops.engine_status(engine, namespace).await {
                Ok(status) => status,
                Err(e) => {
                    warn!(engine, error = %e, "Failed to read ChaosEngine status");
                    None
                }
            };
            state = PollState::from_status(status.as_deref());
            if state == PollState::Done {
                break;
            }

            debug!(
                engine,
                status = status.as_deref().unwrap_or(""),
                expected = EXECUTION_SUCCESSFUL,
                "Experiment still running"
            );

            match self
                .ops
                .recent_logs(&selector, namespace, self.settings.log_lookback)
                .await
            {
                Ok(logs) if !logs.trim().is_empty() => print!("{}", logs),
                Ok(_) => {}
                Err(e) => debug!(error = %e, "No experiment logs yet"),
            }

            tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    output::warning(format!("Experiment {} cancelled", experiment_id));
                    return Err(DemoError::Cancelled {
                        experiment: experiment_id.to_string(),
                    });
                }
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
            }
        }

        Ok(polls)
    }
}
