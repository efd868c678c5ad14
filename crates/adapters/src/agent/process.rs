// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real agent launcher: a child process with piped stdio.

use super::{AgentPipes, LaunchError, Launcher};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Spawns the configured agent command under `bash -c`.
pub struct ProcessLauncher {
    command: String,
    child: Option<Child>,
}

impl ProcessLauncher {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into(), child: None }
    }
}

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn start(&mut self) -> Result<AgentPipes, LaunchError> {
        self.destroy().await;

        let mut child = Command::new("bash")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| LaunchError::SpawnFailed(e.to_string()))?;

        let stdin = child.stdin.take().ok_or(LaunchError::MissingPipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(LaunchError::MissingPipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(LaunchError::MissingPipe("stderr"))?;

        tracing::info!(command = %self.command, pid = child.id(), "agent started");
        self.child = Some(child);

        Ok(AgentPipes {
            stdin: Box::new(stdin),
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
        })
    }

    async fn destroy(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                tracing::debug!(error = %e, "agent kill failed (already gone?)");
            }
        }
    }
}
