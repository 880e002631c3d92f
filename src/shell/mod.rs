//! External command invocation
//!
//! Every gcloud, kubectl and helm call goes through a [`CommandRunner`]. The
//! command line is echoed to the console before it runs, and its exit status
//! is reported back without being escalated.

use std::fmt;
use std::process::Stdio;

use async_trait::async_trait;
use colored::Colorize;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{DemoError, DemoResult};

/// A program plus its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Runs command lines against the host
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run with inherited stdio and return the exit code, if the process produced one
    async fn run(&self, command: &CommandLine) -> DemoResult<Option<i32>>;

    /// Run with piped stdout and return it; a non-zero exit is an error
    async fn capture(&self, command: &CommandLine) -> DemoResult<String>;
}

/// Runs commands on the local machine with tokio's process support
#[derive(Debug, Clone, Default)]
pub struct Shell;

impl Shell {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for Shell {
    async fn run(&self, command: &CommandLine) -> DemoResult<Option<i32>> {
        println!("{}", format!("$ {}", command).cyan());

        let status = command
            .to_command()
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| DemoError::command(command, e))?;

        if !status.success() {
            debug!(command = %command, code = ?status.code(), "Command exited unsuccessfully");
        }

        Ok(status.code())
    }

    async fn capture(&self, command: &CommandLine) -> DemoResult<String> {
        println!("{}", format!("$ {}", command).cyan());

        let output = command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DemoError::command(command, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if output.status.success() {
            Ok(stdout.into_owned())
        } else {
            Err(DemoError::command(command, stderr.trim()))
        }
    }
}

/// Run a command whose outcome does not change what happens next
pub async fn run_unchecked(runner: &dyn CommandRunner, command: &CommandLine) {
    match runner.run(command).await {
        Ok(Some(0)) => {}
        Ok(code) => warn!(command = %command, code = ?code, "Command did not succeed, continuing"),
        Err(e) => warn!(error = %e, "Could not run command, continuing"),
    }
}
