//! Sequencing of experiment runs
//!
//! Experiments run one at a time in id order. Between two runs of a full suite
//! the driver waits out a cooldown so incidents raised downstream can be
//! attributed to a single experiment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::catalog::{self, ExperimentEntry};
use super::runner::ExperimentRunner;
use super::types::{ExperimentResult, Selector};
use crate::error::{DemoError, DemoResult};
use crate::output;

/// A suite that stopped early, with whatever finished before it stopped
#[derive(Debug, Error)]
#[error("{cause}")]
pub struct SuiteAborted {
    pub completed: Vec<ExperimentResult>,
    #[source]
    pub cause: DemoError,
}

impl SuiteAborted {
    fn new(completed: Vec<ExperimentResult>, cause: DemoError) -> Self {
        Self { completed, cause }
    }

    pub fn exit_code(&self) -> i32 {
        self.cause.exit_code()
    }
}

pub struct ExperimentSuite {
    runner: ExperimentRunner,
    experiments_dir: PathBuf,
}

impl ExperimentSuite {
    pub fn new(runner: ExperimentRunner, experiments_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            experiments_dir: experiments_dir.into(),
        }
    }

    pub fn experiments(&self) -> DemoResult<Vec<ExperimentEntry>> {
        catalog::list_experiments(&self.experiments_dir)
    }

    /// Run the selected experiments, collecting results in execution order
    pub async fn run(
        &self,
        selector: &Selector,
        wait_minutes: u64,
        delay_seconds: u64,
    ) -> Result<Vec<ExperimentResult>, SuiteAborted> {
        let available = self
            .experiments()
            .map_err(|e| SuiteAborted::new(Vec::new(), e))?;

        let planned: Vec<&ExperimentEntry> = match selector {
            Selector::All => available.iter().collect(),
            Selector::One(id) => match catalog::find(&available, id) {
                Some(entry) => vec![entry],
                None => {
                    let cause = DemoError::ExperimentNotFound {
                        id: id.clone(),
                        expected_path: catalog::expected_path(&self.experiments_dir, id),
                    };
                    return Err(SuiteAborted::new(Vec::new(), cause));
                }
            },
        };

        info!(
            selector = %selector,
            experiments = planned.len(),
            wait_minutes,
            delay_seconds,
            "Starting experiment suite"
        );

        let cooldown = Duration::from_secs(wait_minutes.saturating_mul(60));
        let mut results = Vec::with_capacity(planned.len());

        for (i, entry) in planned.iter().enumerate() {
            if self.runner.shutdown_signal().is_shutdown() {
                let cause = DemoError::Cancelled {
                    experiment: entry.id.clone(),
                };
                return Err(SuiteAborted::new(results, cause));
            }

            match self.runner.run(entry, delay_seconds).await {
                Ok(result) => {
                    record(&result);
                    results.push(result);
                }
                Err(e) => return Err(SuiteAborted::new(results, e)),
            }

            if i + 1 < planned.len() {
                if let Err(e) = self.cool_down(cooldown, &planned[i + 1].id).await {
                    return Err(SuiteAborted::new(results, e));
                }
            }
        }

        Ok(results)
    }

    async fn cool_down(&self, cooldown: Duration, next: &str) -> DemoResult<()> {
        output::step(format!(
            "Waiting {} minutes before running {}",
            cooldown.as_secs() / 60,
            next
        ));

        let mut shutdown = self.runner.shutdown_signal();
        tokio::select! {
            biased;
            _ = shutdown.wait() => {
                output::warning(format!("Cancelled before {}", next));
                Err(DemoError::Cancelled { experiment: next.to_string() })
            }
            _ = tokio::time::sleep(cooldown) => Ok(()),
        }
    }
}

fn record(result: &ExperimentResult) {
    match serde_json::to_string(result) {
        Ok(json) => debug!(result = %json, "Experiment result recorded"),
        Err(e) => warn!(error = %e, "Failed to serialize experiment result"),
    }
}

/// Summary of the experiments that finished before an operator cancellation.
///
/// `None` unless `partial_on_cancel` is set, the suite was cancelled and at
/// least one experiment completed.
pub fn abort_summary(aborted: &SuiteAborted, partial_on_cancel: bool) -> Option<String> {
    if partial_on_cancel && aborted.cause.is_cancelled() && !aborted.completed.is_empty() {
        Some(render_summary(&aborted.completed))
    } else {
        None
    }
}

const SUMMARY_HEADERS: [&str; 4] = ["#", "Start Time (UTC)", "Experiment", "Status"];

/// Fixed-width results table, one row per result in the order given
pub fn render_summary(results: &[ExperimentResult]) -> String {
    let rows: Vec<[String; 4]> = results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            [
                (i + 1).to_string(),
                r.start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
                r.experiment_name.clone(),
                r.status.clone(),
            ]
        })
        .collect();

    let mut widths = SUMMARY_HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let format_line = |cells: [&str; 4]| -> String {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ");
        format!("{}\n", line.trim_end())
    };

    let mut out = format_line(SUMMARY_HEADERS);
    let rules = widths.map(|w| "-".repeat(w));
    out.push_str(&format_line([
        rules[0].as_str(),
        rules[1].as_str(),
        rules[2].as_str(),
        rules[3].as_str(),
    ]));
    for row in &rows {
        out.push_str(&format_line([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
        ]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_render_summary_layout() {
        let results = vec![
            ExperimentResult {
                experiment_name: "container-kill".to_string(),
                status: "Pass".to_string(),
                start_time: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            },
            ExperimentResult {
                experiment_name: "pod-delete".to_string(),
                status: "Fail".to_string(),
                start_time: Utc.with_ymd_and_hms(2024, 3, 1, 10, 20, 5).unwrap(),
            },
        ];

        let expected = "\
#  Start Time (UTC)     Experiment      Status
-  -------------------  --------------  ------
1  2024-03-01 10:00:00  container-kill  Pass
2  2024-03-01 10:20:05  pod-delete      Fail
";
        assert_eq!(render_summary(&results), expected);
    }

    #[test]
    fn test_render_summary_empty() {
        let table = render_summary(&[]);
        assert_eq!(table.lines().count(), 2);
        assert!(table.starts_with("#  Start Time (UTC)"));
    }
}
