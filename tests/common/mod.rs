//! Fakes shared by the integration tests
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use litmus_demo::chaos::{ChaosOps, ExperimentEntry, EXECUTION_SUCCESSFUL};
use litmus_demo::error::{DemoError, DemoResult};
use litmus_demo::shell::{CommandLine, CommandRunner};
use litmus_demo::shutdown::ShutdownController;

/// Write a ChaosEngine manifest for `id` into `dir`
pub fn write_engine(dir: &Path, id: &str, engine: &str) -> ExperimentEntry {
    let path = dir.join(format!("{}.yaml", id));
    let text = format!(
        r#"apiVersion: litmuschaos.io/v1alpha1
kind: ChaosEngine
metadata:
  name: {engine}
  namespace: sock-shop
spec:
  appinfo:
    appns: sock-shop
    applabel: name=carts
    appkind: deployment
  chaosServiceAccount: sock-shop-chaos-engine
  experiments:
    - name: {id}
      spec:
        components:
          env:
            - name: TOTAL_CHAOS_DURATION
              value: '30'
"#,
        engine = engine,
        id = id
    );
    std::fs::write(&path, text).unwrap();
    ExperimentEntry {
        id: id.to_string(),
        path,
    }
}

/// Scripted cluster: engines report queued statuses, then the sentinel
#[derive(Default)]
pub struct FakeChaosOps {
    statuses: Mutex<HashMap<String, VecDeque<Option<String>>>>,
    verdicts: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
    applied: Mutex<Vec<(PathBuf, String)>>,
    cancel_on: Mutex<Option<String>>,
    controller: Mutex<Option<ShutdownController>>,
}

impl FakeChaosOps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(self, engine: &str, statuses: &[Option<&str>]) -> Self {
        self.statuses.lock().unwrap().insert(
            engine.to_string(),
            statuses.iter().map(|s| s.map(str::to_string)).collect(),
        );
        self
    }

    pub fn with_verdict(self, result: &str, verdict: &str) -> Self {
        self.verdicts
            .lock()
            .unwrap()
            .insert(result.to_string(), verdict.to_string());
        self
    }

    /// Request shutdown the first time `engine`'s status is read
    pub fn cancel_on(self, engine: &str, controller: ShutdownController) -> Self {
        *self.cancel_on.lock().unwrap() = Some(engine.to_string());
        *self.controller.lock().unwrap() = Some(controller);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn touched(&self, name: &str) -> bool {
        self.calls().iter().any(|c| c.contains(name))
    }

    /// Manifests seen by `apply_manifest`, with their contents at apply time
    pub fn applied(&self) -> Vec<(PathBuf, String)> {
        self.applied.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChaosOps for FakeChaosOps {
    async fn delete_engine(&self, name: &str, namespace: &str) -> DemoResult<()> {
        self.record(format!("delete {}/{}", namespace, name));
        Ok(())
    }

    async fn apply_manifest(&self, path: &Path, namespace: &str) -> DemoResult<()> {
        let text = std::fs::read_to_string(path).map_err(|source| DemoError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.applied
            .lock()
            .unwrap()
            .push((path.to_path_buf(), text));
        self.record(format!("apply {}", namespace));
        Ok(())
    }

    async fn engine_status(&self, name: &str, namespace: &str) -> DemoResult<Option<String>> {
        self.record(format!("status {}/{}", namespace, name));

        let cancel = self.cancel_on.lock().unwrap().as_deref() == Some(name);
        if cancel {
            if let Some(controller) = self.controller.lock().unwrap().as_ref() {
                controller.shutdown();
            }
            return Ok(Some("Running".to_string()));
        }

        let next = self
            .statuses
            .lock()
            .unwrap()
            .get_mut(name)
            .and_then(VecDeque::pop_front);
        Ok(next.unwrap_or_else(|| Some(EXECUTION_SUCCESSFUL.to_string())))
    }

    async fn recent_logs(
        &self,
        selector: &str,
        namespace: &str,
        since: Duration,
    ) -> DemoResult<String> {
        self.record(format!("logs {}/{} {}s", namespace, selector, since.as_secs()));
        Ok(String::new())
    }

    async fn describe_result(&self, name: &str, namespace: &str) -> DemoResult<String> {
        self.record(format!("describe {}/{}", namespace, name));
        Ok(format!("Name: {}\n", name))
    }

    async fn result_verdict(&self, name: &str, namespace: &str) -> DemoResult<Option<String>> {
        self.record(format!("verdict {}/{}", namespace, name));
        Ok(self.verdicts.lock().unwrap().get(name).cloned())
    }
}

/// Records every command line; `capture` answers from a canned table
#[derive(Default)]
pub struct RecordingRunner {
    commands: Mutex<Vec<String>>,
    captures: Mutex<HashMap<String, String>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capture(self, command: &str, stdout: &str) -> Self {
        self.captures
            .lock()
            .unwrap()
            .insert(command.to_string(), stdout.to_string());
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &CommandLine) -> DemoResult<Option<i32>> {
        self.commands.lock().unwrap().push(command.to_string());
        Ok(Some(0))
    }

    async fn capture(&self, command: &CommandLine) -> DemoResult<String> {
        let line = command.to_string();
        self.commands.lock().unwrap().push(line.clone());
        self.captures
            .lock()
            .unwrap()
            .get(&line)
            .cloned()
            .ok_or_else(|| DemoError::command(line, "no canned output"))
    }
}
