//! ChaosEngine manifest loading and patching

use std::io::Write;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{DemoError, DemoResult};

/// Env var Litmus reads as the pre-chaos delay, in seconds
pub const RAMP_TIME_ENV: &str = "RAMP_TIME";

/// A parsed ChaosEngine document
#[derive(Debug, Clone)]
pub struct ExperimentManifest {
    pub name: String,
    pub namespace: String,
    document: Value,
    source: PathBuf,
}

impl ExperimentManifest {
    pub fn load(path: &Path) -> DemoResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DemoError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    pub fn parse(text: &str, source: &Path) -> DemoResult<Self> {
        let document: Value =
            serde_yaml::from_str(text).map_err(|e| DemoError::ManifestParse {
                path: source.to_path_buf(),
                source: e,
            })?;

        let name = metadata_field(&document, "name").ok_or_else(|| DemoError::ManifestField {
            path: source.to_path_buf(),
            field: "metadata.name",
        })?;
        let namespace =
            metadata_field(&document, "namespace").ok_or_else(|| DemoError::ManifestField {
                path: source.to_path_buf(),
                field: "metadata.namespace",
            })?;

        Ok(Self {
            name,
            namespace,
            document,
            source: source.to_path_buf(),
        })
    }

    /// Append `RAMP_TIME=<delay>` to the first experiment's env. Zero leaves the document untouched.
    pub fn with_ramp_time(mut self, delay_seconds: u64) -> DemoResult<Self> {
        if delay_seconds == 0 {
            return Ok(self);
        }

        let missing = || DemoError::ManifestField {
            path: self.source.clone(),
            field: "spec.experiments[0].spec",
        };

        let experiment_spec = self
            .document
            .get_mut("spec")
            .and_then(|s| s.get_mut("experiments"))
            .and_then(|e| e.get_mut(0))
            .and_then(|e| e.get_mut("spec"))
            .and_then(Value::as_mapping_mut)
            .ok_or_else(missing)?;

        let components = experiment_spec
            .entry(Value::from("components"))
            .or_insert(Value::Mapping(Mapping::new()));
        if !components.is_mapping() {
            *components = Value::Mapping(Mapping::new());
        }

        let env = components
            .as_mapping_mut()
            .ok_or_else(missing)?
            .entry(Value::from("env"))
            .or_insert(Value::Sequence(Vec::new()));
        if !env.is_sequence() {
            *env = Value::Sequence(Vec::new());
        }

        let mut entry = Mapping::new();
        entry.insert(Value::from("name"), Value::from(RAMP_TIME_ENV));
        entry.insert(Value::from("value"), Value::from(delay_seconds.to_string()));
        if let Some(list) = env.as_sequence_mut() {
            list.push(Value::Mapping(entry));
        }

        Ok(self)
    }

    /// Env entries of the first experiment, empty when none are declared
    pub fn experiment_env(&self) -> Vec<(String, String)> {
        self.document
            .get("spec")
            .and_then(|s| s.get("experiments"))
            .and_then(|e| e.get(0))
            .and_then(|e| e.get("spec"))
            .and_then(|s| s.get("components"))
            .and_then(|c| c.get("env"))
            .and_then(Value::as_sequence)
            .map(|list| {
                list.iter()
                    .filter_map(|item| {
                        let name = item.get("name")?.as_str()?;
                        let value = match item.get("value")? {
                            Value::String(s) => s.clone(),
                            other => serde_yaml::to_string(other).ok()?.trim().to_string(),
                        };
                        Some((name.to_string(), value))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Serialize to a fresh temporary file owned by the returned handle
    pub fn write_temp(&self) -> DemoResult<PatchedManifest> {
        let yaml = serde_yaml::to_string(&self.document)?;

        let mut file = tempfile::Builder::new()
            .prefix(&format!("{}-", self.name))
            .suffix(".yaml")
            .tempfile()
            .map_err(DemoError::ManifestWrite)?;
        file.write_all(yaml.as_bytes())
            .map_err(DemoError::ManifestWrite)?;
        file.flush().map_err(DemoError::ManifestWrite)?;

        debug!(path = %file.path().display(), "Wrote patched manifest");

        Ok(PatchedManifest {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            file,
        })
    }
}

fn metadata_field(document: &Value, field: &str) -> Option<String> {
    document
        .get("metadata")
        .and_then(|m| m.get(field))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A patched manifest on disk; the file is removed when this is dropped
#[derive(Debug)]
pub struct PatchedManifest {
    pub name: String,
    pub namespace: String,
    file: NamedTempFile,
}

impl PatchedManifest {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Read, patch and write out the manifest at `path`
pub fn prepare(path: &Path, delay_seconds: u64) -> DemoResult<PatchedManifest> {
    ExperimentManifest::load(path)?
        .with_ramp_time(delay_seconds)?
        .write_temp()
}
