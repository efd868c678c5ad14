// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent process management.
//!
//! The remote counterpart is a child process speaking the framed RPC
//! protocol on stdin/stdout and JSON-encoded log lines on stderr. The
//! [`Launcher`] trait hides how it comes to life so the RPC actor can be
//! exercised against an in-memory fake.

mod process;

pub use process::ProcessLauncher;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeAgent, FakeLauncher};

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

/// Errors from launching the agent
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("agent stdio unavailable: {0}")]
    MissingPipe(&'static str),
}

/// The three byte streams of a live agent.
pub struct AgentPipes {
    pub stdin: Box<dyn AsyncWrite + Send + Unpin>,
    pub stdout: Box<dyn AsyncRead + Send + Unpin>,
    pub stderr: Box<dyn AsyncRead + Send + Unpin>,
}

/// Starts and destroys the agent process.
///
/// `start` may be called again after `destroy`; each successful call
/// yields a fresh set of pipes belonging to a fresh agent incarnation.
#[async_trait]
pub trait Launcher: Send + 'static {
    async fn start(&mut self) -> Result<AgentPipes, LaunchError>;

    /// Best-effort teardown; never fails.
    async fn destroy(&mut self);
}
