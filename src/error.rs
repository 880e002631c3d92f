//! Error types shared by the chaos driver and the cluster lifecycle commands

use std::path::PathBuf;

use thiserror::Error;

/// Exit code used for lookup failures and operator cancellation
pub const EXIT_ABORTED: i32 = 2;

/// Exit code used for configuration failures
pub const EXIT_CONFIG: i32 = 1;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("Failed to read manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Manifest {path} is missing required field `{field}`")]
    ManifestField { path: PathBuf, field: &'static str },

    #[error("Failed to write patched manifest: {0}")]
    ManifestWrite(#[source] std::io::Error),

    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("Failed to read experiments directory {path}: {source}")]
    ExperimentsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Experiment '{id}' not found, expected manifest at {}", expected_path.display())]
    ExperimentNotFound { id: String, expected_path: PathBuf },

    #[error("Experiment '{experiment}' cancelled")]
    Cancelled { experiment: String },

    #[error("Command `{command}` failed: {message}")]
    Command { command: String, message: String },

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
}

impl DemoError {
    pub fn command(command: impl ToString, message: impl ToString) -> Self {
        DemoError::Command {
            command: command.to_string(),
            message: message.to_string(),
        }
    }

    /// True when the operator interrupted the run
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DemoError::Cancelled { .. })
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            DemoError::ExperimentNotFound { .. } | DemoError::Cancelled { .. } => EXIT_ABORTED,
            _ => EXIT_CONFIG,
        }
    }
}

pub type DemoResult<T> = Result<T, DemoError>;
