// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The always-resuming RPC session.
//!
//! Owns the agent process and the replay buffer: every remote message
//! lives in the buffer from just before its write until the matching ack,
//! and the whole buffer is re-sent in order after a reconnect. Transport
//! failures back off exponentially (1, 2, 4, 8, 16 s); after five
//! consecutive failures the session gives up until the user forces a
//! restart.
//!
//! Each successful start spawns one stderr logger and one stdout demux
//! task, tagged with the session generation so messages from a dead
//! incarnation are inert.

use super::actor::{Actor, Addr, Scheduler};
use super::status::StatusMsg;
use super::sync::SyncMsg;
use super::transfer::Transfer;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::time::Duration;
use tether_adapters::{read_block, Launcher, NotifyAdapter};
use tether_core::BLOCK_SIZE;
use tether_wire::{read_response, write_rpc, ProtocolError, Response, Rpc};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};

const MAX_RETRIES: u32 = 5;

const GIVEN_UP_TOOLTIP: &str = "Sync agent unreachable — click to try again";

#[derive(Debug)]
pub enum LinkMsg {
    /// Work from the sync engine.
    Send(Transfer),
    /// A framed response read by the stdout demux.
    Receive { generation: u64, response: Response },
    /// The stdout demux hit an error or EOF.
    ReadFailed { generation: u64 },
    /// A scheduled reconnection attempt; valid only while `attempt`
    /// matches the current retry count.
    AttemptReconnect { attempt: u32 },
    /// User-initiated restart from any non-closed state.
    ForceRestart,
    /// Terminal teardown.
    Close,
}

enum LinkState {
    /// Agent alive, writer healthy.
    Active { buffer: VecDeque<Transfer> },
    /// Backoff pending; remote messages accumulate in the buffer.
    RestartSleeping { buffer: VecDeque<Transfer>, retries: u32 },
    /// Five consecutive failures; only ForceRestart leaves this state.
    GivenUp { buffer: VecDeque<Transfer> },
    /// Terminal.
    Closed,
}

pub struct AgentLink<L: Launcher, N: NotifyAdapter> {
    launcher: L,
    notifier: N,
    sync: Addr<SyncMsg>,
    status: Addr<StatusMsg>,
    self_addr: Addr<LinkMsg>,
    sched: Scheduler,
    /// Bumped on every (re)start; reader messages carry the generation
    /// they were spawned under.
    generation: u64,
    /// Suppresses the synthesized reconnection barrier on the very first
    /// connect, where there is nothing to flush.
    ever_connected: bool,
    stdin: Option<Box<dyn AsyncWrite + Send + Unpin>>,
    state: LinkState,
}

impl<L: Launcher, N: NotifyAdapter> AgentLink<L, N> {
    pub fn new(
        launcher: L,
        notifier: N,
        sync: Addr<SyncMsg>,
        status: Addr<StatusMsg>,
        self_addr: Addr<LinkMsg>,
        sched: Scheduler,
    ) -> Self {
        Self {
            launcher,
            notifier,
            sync,
            status,
            self_addr,
            sched,
            generation: 0,
            ever_connected: false,
            stdin: None,
            state: LinkState::RestartSleeping { buffer: VecDeque::new(), retries: 0 },
        }
    }

    async fn on_send(&mut self, transfer: Transfer) {
        if matches!(self.state, LinkState::Closed) {
            return;
        }
        if !transfer.is_remote() {
            self.on_local(transfer);
            return;
        }
        match &mut self.state {
            LinkState::Active { .. } => match resolve(&transfer) {
                Ok(Some(rpc)) => {
                    // Buffered before the write: the buffer holds the
                    // message from just-before-write until its ack.
                    if let LinkState::Active { buffer } = &mut self.state {
                        buffer.push_back(transfer);
                    }
                    if let Err(e) = write(&mut self.stdin, &rpc).await {
                        tracing::warn!(error = %e, "agent write failed");
                        self.restart(0).await;
                    }
                }
                // The file vanished between stat and read; the next event
                // cycle observes the deletion authoritatively.
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(error = %e, op = transfer.name(), "chunk read failed, dropping");
                }
            },
            LinkState::RestartSleeping { buffer, .. } => buffer.push_back(transfer),
            LinkState::GivenUp { buffer } => {
                buffer.push_back(transfer);
                self.status.send(StatusMsg::Greyed(GIVEN_UP_TOOLTIP.to_string()));
            }
            LinkState::Closed => {}
        }
    }

    fn on_local(&mut self, transfer: Transfer) {
        match transfer {
            Transfer::StartFile { path } => {
                tracing::debug!(path = %path.display(), "file transfer starting");
            }
            Transfer::FileTotal { files, bytes, example } => {
                tracing::debug!(files, bytes, example = %example.display(), "transfer progress");
                self.status.send(StatusMsg::FilesAndBytes { files, bytes });
            }
            _ => {}
        }
    }

    fn on_receive(&mut self, response: Response) {
        let LinkState::Active { buffer } = &mut self.state else { return };
        match response {
            Response::Ack => match buffer.pop_front() {
                Some(Transfer::Complete) if buffer.is_empty() => {
                    tracing::info!("sync batch applied");
                    self.status.send(StatusMsg::Done);
                }
                Some(Transfer::RemoteScan { .. }) => {
                    self.sync.send(SyncMsg::RemoteScanComplete);
                }
                Some(acked) => {
                    tracing::debug!(op = acked.name(), remaining = buffer.len(), "acked");
                }
                None => tracing::warn!("ack with empty buffer"),
            },
            Response::Scanned { base, sub, sig } => {
                self.sync.send(SyncMsg::RemoteScanned { base, sub, sig });
            }
            other => self.sync.send(SyncMsg::AgentResponse(other)),
        }
    }

    async fn on_read_failed(&mut self) {
        if matches!(self.state, LinkState::Active { .. }) {
            tracing::warn!("agent read failed");
            self.restart(0).await;
        }
        // In any other state a concurrent write failure got here first;
        // this message is a no-op.
    }

    async fn on_reconnect(&mut self, attempt: u32) {
        let LinkState::RestartSleeping { retries, .. } = &self.state else { return };
        let retries = *retries;
        if attempt != retries {
            // Superseded by a ForceRestart.
            return;
        }

        let pipes = match self.launcher.start().await {
            Ok(pipes) => pipes,
            Err(e) => {
                tracing::warn!(error = %e, "agent launch failed");
                self.restart(retries).await;
                return;
            }
        };

        self.generation += 1;
        self.stdin = Some(pipes.stdin);
        spawn_readers(self.generation, pipes.stdout, pipes.stderr, self.self_addr.clone());

        let mut buffer = self.take_buffer();
        if buffer.is_empty() && self.ever_connected {
            // Reconnection barrier: its ack tells the status surface the
            // session is whole again.
            buffer.push_back(Transfer::Complete);
        }
        self.ever_connected = true;

        let mut write_failed = false;
        let mut i = 0;
        while i < buffer.len() {
            match resolve(&buffer[i]) {
                Ok(Some(rpc)) => {
                    if let Err(e) = write(&mut self.stdin, &rpc).await {
                        tracing::warn!(error = %e, "write failed during replay");
                        write_failed = true;
                        break;
                    }
                    i += 1;
                }
                Ok(None) => {
                    // Vanished underneath the buffer; nothing to replay.
                    buffer.remove(i);
                }
                Err(e) => {
                    tracing::error!(error = %e, "chunk unreadable during replay, dropping");
                    buffer.remove(i);
                }
            }
        }

        if write_failed {
            self.state = LinkState::Active { buffer };
            self.restart(retries).await;
        } else {
            tracing::info!(replayed = buffer.len(), "agent connected");
            if !buffer.is_empty() {
                self.status.send(StatusMsg::Syncing);
            }
            self.state = LinkState::Active { buffer };
        }
    }

    /// Best-effort teardown, then either schedule the next attempt with
    /// exponential backoff or give up.
    async fn restart(&mut self, retry_count: u32) {
        self.launcher.destroy().await;
        self.stdin = None;
        self.generation += 1;
        let buffer = self.take_buffer();

        if retry_count < MAX_RETRIES {
            let delay = Duration::from_secs(1 << retry_count);
            let retries = retry_count + 1;
            tracing::info!(attempt = retries, delay_s = delay.as_secs(), "reconnect scheduled");
            self.status.send(StatusMsg::Error(format!(
                "Sync interrupted — reconnecting in {}s",
                delay.as_secs()
            )));
            self.sched.send_after(
                &self.self_addr,
                LinkMsg::AttemptReconnect { attempt: retries },
                delay,
            );
            self.state = LinkState::RestartSleeping { buffer, retries };
        } else {
            tracing::error!(attempts = MAX_RETRIES, "giving up on the agent");
            self.status.send(StatusMsg::Greyed(GIVEN_UP_TOOLTIP.to_string()));
            if let Err(e) = self.notifier.notify("tether", GIVEN_UP_TOOLTIP).await {
                tracing::warn!(error = %e, "given-up notification failed");
            }
            self.state = LinkState::GivenUp { buffer };
        }
    }

    fn take_buffer(&mut self) -> VecDeque<Transfer> {
        match std::mem::replace(&mut self.state, LinkState::Closed) {
            LinkState::Active { buffer }
            | LinkState::RestartSleeping { buffer, .. }
            | LinkState::GivenUp { buffer } => buffer,
            LinkState::Closed => VecDeque::new(),
        }
    }
}

#[async_trait]
impl<L: Launcher, N: NotifyAdapter> Actor for AgentLink<L, N> {
    type Msg = LinkMsg;

    async fn handle(&mut self, msg: LinkMsg) {
        match msg {
            LinkMsg::Send(transfer) => self.on_send(transfer).await,
            LinkMsg::Receive { generation, response } => {
                if generation == self.generation {
                    self.on_receive(response);
                }
            }
            LinkMsg::ReadFailed { generation } => {
                if generation == self.generation {
                    self.on_read_failed().await;
                }
            }
            LinkMsg::AttemptReconnect { attempt } => self.on_reconnect(attempt).await,
            LinkMsg::ForceRestart => {
                if !matches!(self.state, LinkState::Closed) {
                    tracing::info!("user-initiated agent restart");
                    self.restart(0).await;
                }
            }
            LinkMsg::Close => {
                self.launcher.destroy().await;
                self.stdin = None;
                self.generation += 1;
                self.state = LinkState::Closed;
            }
        }
    }
}

/// Turn a buffered remote message into the concrete RPC to write.
///
/// Chunk messages re-read the file now; `Ok(None)` means it vanished and
/// the message should be dropped silently.
fn resolve(transfer: &Transfer) -> io::Result<Option<Rpc>> {
    match transfer {
        Transfer::Complete => Ok(Some(Rpc::Complete)),
        Transfer::RemoteScan { paths } => Ok(Some(Rpc::FullScan { paths: paths.clone() })),
        Transfer::Rpc(rpc) => Ok(Some(rpc.clone())),
        Transfer::SendChunk { local_src, remote_dest, sub, index, .. } => {
            match read_block(&local_src.join(sub), *index) {
                Ok(data) => Ok(Some(Rpc::WriteChunk {
                    dest: remote_dest.clone(),
                    sub: sub.clone(),
                    offset: index * BLOCK_SIZE,
                    data,
                })),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e),
            }
        }
        Transfer::StartFile { .. } | Transfer::FileTotal { .. } => Ok(None),
    }
}

async fn write(
    stdin: &mut Option<Box<dyn AsyncWrite + Send + Unpin>>,
    rpc: &Rpc,
) -> Result<(), ProtocolError> {
    match stdin.as_mut() {
        Some(writer) => write_rpc(writer, rpc).await,
        None => Err(ProtocolError::Io(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "agent stdin closed",
        ))),
    }
}

fn spawn_readers(
    generation: u64,
    stdout: Box<dyn AsyncRead + Send + Unpin>,
    stderr: Box<dyn AsyncRead + Send + Unpin>,
    addr: Addr<LinkMsg>,
) {
    tokio::spawn(stdout_demux(generation, stdout, addr));
    tokio::spawn(stderr_logger(stderr));
}

/// Read framed responses until the pipe dies, then report once and exit.
async fn stdout_demux(
    generation: u64,
    mut stdout: Box<dyn AsyncRead + Send + Unpin>,
    addr: Addr<LinkMsg>,
) {
    loop {
        match read_response(&mut stdout).await {
            Ok(response) => addr.send(LinkMsg::Receive { generation, response }),
            Err(e) => {
                tracing::debug!(error = %e, "agent stdout closed");
                addr.send(LinkMsg::ReadFailed { generation });
                return;
            }
        }
    }
}

/// The agent emits one JSON-encoded string per stderr line; log the inner
/// text. A malformed line stops this logger for the session without
/// touching the RPC stream.
async fn stderr_logger(stderr: Box<dyn AsyncRead + Send + Unpin>) {
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match serde_json::from_str::<String>(&line) {
                Ok(text) => tracing::info!(target: "agent", "{}", text),
                Err(_) => {
                    tracing::warn!(target: "agent", raw = %line, "malformed stderr line");
                    return;
                }
            },
            Ok(None) | Err(_) => return,
        }
    }
}

#[cfg(test)]
#[path = "agent_rpc_tests.rs"]
mod tests;
