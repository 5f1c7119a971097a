//! Execution of `p4` commands

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use pum_core::{PumError, PumResult};

/// A single `p4` command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct P4Invocation {
    /// Server address passed with `-p`.
    pub port: String,
    /// User passed with `-u`.
    pub user: String,
    /// Request tagged output with `-ztag`.
    pub tagged: bool,
    pub args: Vec<String>,
    /// Text written to the command's standard input.
    pub stdin: Option<String>,
}

impl P4Invocation {
    pub fn new(port: impl Into<String>, user: impl Into<String>, args: &[&str]) -> Self {
        Self {
            port: port.into(),
            user: user.into(),
            tagged: false,
            args: args.iter().map(|a| a.to_string()).collect(),
            stdin: None,
        }
    }

    #[must_use]
    pub fn tagged(mut self) -> Self {
        self.tagged = true;
        self
    }

    pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Full argument list, global options first.
    pub fn command_line(&self) -> Vec<String> {
        let mut line = vec![
            "-p".to_string(),
            self.port.clone(),
            "-u".to_string(),
            self.user.clone(),
        ];
        if self.tagged {
            line.push("-ztag".to_string());
        }
        line.extend(self.args.iter().cloned());
        line
    }

    /// The subcommand name, for logs and error messages.
    pub fn subcommand(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or("")
    }
}

/// Captured result of a `p4` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct P4Output {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl P4Output {
    /// Convert a failed command into an error, keeping successful output.
    pub fn into_result(self, invocation: &P4Invocation) -> PumResult<P4Output> {
        if self.success {
            Ok(self)
        } else {
            Err(PumError::resource(format!(
                "p4 {} on {} failed: {}",
                invocation.subcommand(),
                invocation.port,
                self.stderr.trim()
            )))
        }
    }
}

/// Runs `p4` commands. Swapped out in tests.
#[async_trait]
pub trait P4Runner: Send + Sync {
    async fn run(&self, invocation: &P4Invocation) -> PumResult<P4Output>;
}

/// Runs the real `p4` executable as a child process.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    p4_bin: String,
}

impl ProcessRunner {
    pub fn new(p4_bin: impl Into<String>) -> Self {
        Self {
            p4_bin: p4_bin.into(),
        }
    }
}

#[async_trait]
impl P4Runner for ProcessRunner {
    async fn run(&self, invocation: &P4Invocation) -> PumResult<P4Output> {
        debug!(
            port = %invocation.port,
            command = %invocation.subcommand(),
            "Running p4"
        );

        let mut child = Command::new(&self.p4_bin)
            .args(invocation.command_line())
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                PumError::resource_with_source(format!("failed to start {}", self.p4_bin), e)
            })?;

        if let (Some(input), Some(mut stdin)) = (&invocation.stdin, child.stdin.take()) {
            stdin.write_all(input.as_bytes()).await.map_err(|e| {
                PumError::resource_with_source("failed to write to p4 stdin", e)
            })?;
            stdin
                .write_all(b"\n")
                .await
                .map_err(|e| PumError::resource_with_source("failed to write to p4 stdin", e))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| PumError::resource_with_source("failed to wait for p4", e))?;

        Ok(P4Output {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
