//! Experiment manifests available on disk
//!
//! One ChaosEngine manifest per `.yaml`/`.yml` file; the file stem is the
//! experiment id.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{DemoError, DemoResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentEntry {
    pub id: String,
    pub path: PathBuf,
}

/// List the manifests in `dir`, sorted by id
pub fn list_experiments(dir: &Path) -> DemoResult<Vec<ExperimentEntry>> {
    let read_err = |source| DemoError::ExperimentsDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for item in std::fs::read_dir(dir).map_err(read_err)? {
        let item = item.map_err(read_err)?;
        let path = item.path();
        if !path.is_file() || !is_manifest(&path) {
            continue;
        }
        let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if id.is_empty() || id.starts_with('.') {
            continue;
        }
        entries.push(ExperimentEntry {
            id: id.to_string(),
            path: path.clone(),
        });
    }

    // `.yaml` sorts before `.yml`, so it wins a duplicate id
    entries.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.path.cmp(&b.path)));
    entries.dedup_by(|dup, kept| {
        let same = dup.id == kept.id;
        if same {
            warn!(id = %dup.id, ignored = %dup.path.display(), "Duplicate experiment manifest");
        }
        same
    });
    Ok(entries)
}

fn is_manifest(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

pub fn find<'a>(entries: &'a [ExperimentEntry], id: &str) -> Option<&'a ExperimentEntry> {
    entries.iter().find(|e| e.id == id)
}

/// Where the manifest for `id` is expected to live
pub fn expected_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{}.yaml", id))
}

/// One `"<n>. <id>"` line per experiment, numbered from 1
pub fn render_listing(entries: &[ExperimentEntry]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| format!("{}. {}\n", i + 1, e.id))
        .collect()
}
