// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unit of work flowing from the sync engine to the RPC session.

use std::path::PathBuf;
use tether_wire::Rpc;

/// One message from the sync engine to the agent link.
///
/// Remote messages are appended to the replay buffer and written to the
/// agent; the rest are local-only diagnostics and progress metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum Transfer {
    /// Barrier: when acked, everything sent before it has been applied.
    Complete,

    /// Ask the agent to enumerate these remote roots.
    RemoteScan { paths: Vec<PathBuf> },

    /// A single metadata or small operation, ready to send as-is.
    Rpc(Rpc),

    /// Diagnostic marker: a file's chunk stream is beginning.
    StartFile { path: PathBuf },

    /// Block `index` of `local_src/sub`, destined for `remote_dest/sub`.
    /// Resolved to a concrete `WriteChunk` at send time by re-reading the
    /// file, so replay after a reconnect picks up current bytes.
    SendChunk {
        local_src: PathBuf,
        remote_dest: PathBuf,
        sub: PathBuf,
        index: u64,
        count: u64,
    },

    /// Progress metadata for the status surface.
    FileTotal { files: u64, bytes: u64, example: PathBuf },
}

impl Transfer {
    /// Whether this message must survive in the replay buffer until acked.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Transfer::Complete
                | Transfer::RemoteScan { .. }
                | Transfer::Rpc(_)
                | Transfer::SendChunk { .. }
        )
    }

    /// Short name for log spans.
    pub fn name(&self) -> &'static str {
        match self {
            Transfer::Complete => "complete",
            Transfer::RemoteScan { .. } => "remote_scan",
            Transfer::Rpc(rpc) => rpc.name(),
            Transfer::StartFile { .. } => "start_file",
            Transfer::SendChunk { .. } => "send_chunk",
            Transfer::FileTotal { .. } => "file_total",
        }
    }
}
