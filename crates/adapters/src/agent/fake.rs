// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fake agent for testing.
//!
//! `FakeLauncher` hands the RPC actor duplex pipes wired to an in-process
//! task that models an agent: it applies every RPC to a [`Vfs`] and acks
//! remote messages in order. The paired [`FakeAgent`] handle injects
//! failures (refused starts, severed pipes, withheld acks) and inspects
//! what the agent observed.

use super::{AgentPipes, LaunchError, Launcher};
use crate::hasher::block_digest;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tether_core::{Signature, Vfs, BLOCK_SIZE};
use tether_wire::{read_rpc, write_response, Response, Rpc};
use tokio::io::{AsyncWriteExt, DuplexStream};
use tokio::sync::oneshot;

const PIPE_BUF: usize = 1024 * 1024;

#[derive(Default)]
struct FakeState {
    fs: Vfs<Signature>,
    received: Vec<Rpc>,
    starts: u32,
    fail_starts: u32,
    hold_acks: bool,
    shutdown: Option<oneshot::Sender<()>>,
}

/// Launcher half, owned by the RPC actor.
pub struct FakeLauncher {
    state: Arc<Mutex<FakeState>>,
}

/// Control half, kept by the test.
#[derive(Clone)]
pub struct FakeAgent {
    state: Arc<Mutex<FakeState>>,
}

impl FakeLauncher {
    pub fn new() -> (FakeLauncher, FakeAgent) {
        let state = Arc::new(Mutex::new(FakeState::default()));
        (FakeLauncher { state: Arc::clone(&state) }, FakeAgent { state })
    }
}

impl FakeAgent {
    /// Snapshot of the agent-side filesystem model.
    pub fn fs(&self) -> Vfs<Signature> {
        self.state.lock().fs.clone()
    }

    /// Every RPC the agent has received, across all incarnations.
    pub fn received(&self) -> Vec<Rpc> {
        self.state.lock().received.clone()
    }

    /// Number of `start` calls that produced a live agent or failed.
    pub fn starts(&self) -> u32 {
        self.state.lock().starts
    }

    /// Make the next `n` starts fail.
    pub fn fail_next_starts(&self, n: u32) {
        self.state.lock().fail_starts = n;
    }

    /// Withhold acks (RPCs are still applied and recorded).
    pub fn hold_acks(&self, hold: bool) {
        self.state.lock().hold_acks = hold;
    }

    /// Kill the live agent: both pipe directions die immediately.
    pub fn sever(&self) {
        if let Some(tx) = self.state.lock().shutdown.take() {
            let _ = tx.send(());
        }
    }

    /// Pre-populate the agent-side tree (for remote-scan bootstraps).
    pub fn seed(&self, path: &Path, sig: Signature) {
        self.state.lock().fs.update(path, Some(sig));
    }
}

#[async_trait]
impl Launcher for FakeLauncher {
    async fn start(&mut self) -> Result<AgentPipes, LaunchError> {
        let (far, shutdown_rx, pipes) = {
            let mut state = self.state.lock();
            state.starts += 1;
            if state.fail_starts > 0 {
                state.fail_starts -= 1;
                return Err(LaunchError::SpawnFailed("injected launch failure".into()));
            }
            let (stdin_near, stdin_far) = tokio::io::duplex(PIPE_BUF);
            let (stdout_near, stdout_far) = tokio::io::duplex(PIPE_BUF);
            let (stderr_near, stderr_far) = tokio::io::duplex(PIPE_BUF);
            let (shutdown_tx, shutdown_rx) = oneshot::channel();
            // Dropping the previous sender ends any prior incarnation.
            state.shutdown = Some(shutdown_tx);
            let pipes = AgentPipes {
                stdin: Box::new(stdin_near),
                stdout: Box::new(stdout_near),
                stderr: Box::new(stderr_near),
            };
            ((stdin_far, stdout_far, stderr_far), shutdown_rx, pipes)
        };
        let (stdin, stdout, stderr) = far;
        tokio::spawn(run_agent(Arc::clone(&self.state), stdin, stdout, stderr, shutdown_rx));
        Ok(pipes)
    }

    async fn destroy(&mut self) {
        if let Some(tx) = self.state.lock().shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn run_agent(
    state: Arc<Mutex<FakeState>>,
    mut stdin: DuplexStream,
    mut stdout: DuplexStream,
    mut stderr: DuplexStream,
    mut shutdown: oneshot::Receiver<()>,
) {
    // One stderr line on boot, in the agent's quoted-string convention.
    let greeting = match serde_json::to_string("fake agent ready") {
        Ok(s) => s,
        Err(_) => return,
    };
    if stderr.write_all(format!("{greeting}\n").as_bytes()).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            rpc = read_rpc(&mut stdin) => {
                let rpc = match rpc {
                    Ok(rpc) => rpc,
                    Err(_) => break,
                };
                for resp in apply(&state, rpc) {
                    if write_response(&mut stdout, &resp).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

/// Apply one RPC to the in-memory tree and produce the responses.
fn apply(state: &Arc<Mutex<FakeState>>, rpc: Rpc) -> Vec<Response> {
    let mut state = state.lock();
    state.received.push(rpc.clone());
    let mut responses = Vec::new();

    match rpc {
        Rpc::FullScan { paths } => {
            for base in &paths {
                let entries: Vec<_> = state
                    .fs
                    .iter()
                    .filter_map(|(p, sig)| {
                        p.strip_prefix(base).ok().map(|sub| (sub.to_path_buf(), sig.clone()))
                    })
                    .collect();
                for (sub, sig) in entries {
                    responses.push(Response::Scanned { base: base.clone(), sub, sig });
                }
            }
        }
        Rpc::MkDir { path, perm } => state.fs.update(&path, Some(Signature::Dir { perm })),
        Rpc::RmDir { path } | Rpc::Delete { path } => state.fs.update(&path, None),
        Rpc::SetSymlink { path, target } => {
            state.fs.update(&path, Some(Signature::Symlink { target }))
        }
        Rpc::SetPerm { path, perm } => {
            let updated = match state.fs.get(&path) {
                Some(Signature::Dir { .. }) => Some(Signature::Dir { perm }),
                Some(Signature::File { size, blocks, .. }) => {
                    Some(Signature::File { perm, size: *size, blocks: blocks.clone() })
                }
                _ => None,
            };
            if let Some(sig) = updated {
                state.fs.update(&path, Some(sig));
            }
        }
        Rpc::PrepareFile { path, perm, blocks } => {
            let (size, mut kept) = match state.fs.get(&path) {
                Some(Signature::File { size, blocks, .. }) => (*size, blocks.clone()),
                _ => (0, Vec::new()),
            };
            kept.truncate(blocks as usize);
            let size = size.min(blocks * BLOCK_SIZE);
            state.fs.update(&path, Some(Signature::File { perm, size, blocks: kept }));
        }
        Rpc::WriteChunk { dest, sub, offset, data } => {
            let path = dest.join(sub);
            let (perm, size, mut blocks) = match state.fs.get(&path) {
                Some(Signature::File { perm, size, blocks }) => (*perm, *size, blocks.clone()),
                _ => (0o644, 0, Vec::new()),
            };
            let index = (offset / BLOCK_SIZE) as usize;
            if blocks.len() <= index {
                blocks.resize(index + 1, [0u8; 16]);
            }
            blocks[index] = block_digest(&data);
            let size = size.max(offset + data.len() as u64);
            state.fs.update(&path, Some(Signature::File { perm, size, blocks }));
        }
        Rpc::Complete => {}
    }

    if !state.hold_acks {
        responses.push(Response::Ack);
    }
    responses
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
