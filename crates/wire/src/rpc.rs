// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request vocabulary: operations the daemon sends to the agent.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One operation applied to the agent's filesystem.
///
/// The agent is idempotent: mkdir-if-absent, delete-if-present, chunk
/// writes at explicit offsets. Replaying a prefix of the stream after a
/// reconnect is therefore safe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Rpc {
    /// Enumerate the given remote roots; the agent streams one
    /// [`Response::Scanned`](crate::Response::Scanned) per node, then acks.
    #[serde(rename = "rpc:full-scan")]
    FullScan { paths: Vec<PathBuf> },

    #[serde(rename = "rpc:mkdir")]
    MkDir { path: PathBuf, perm: u32 },

    #[serde(rename = "rpc:rmdir")]
    RmDir { path: PathBuf },

    #[serde(rename = "rpc:delete")]
    Delete { path: PathBuf },

    #[serde(rename = "rpc:set-symlink")]
    SetSymlink { path: PathBuf, target: String },

    #[serde(rename = "rpc:set-perm")]
    SetPerm { path: PathBuf, perm: u32 },

    /// Announce an incoming chunk stream for `path` with `blocks` chunks;
    /// the agent truncates or creates the file and sets permissions.
    #[serde(rename = "rpc:prepare-file")]
    PrepareFile { path: PathBuf, perm: u32, blocks: u64 },

    /// Write `data` at `offset` into `dest/sub`.
    #[serde(rename = "rpc:write-chunk")]
    WriteChunk { dest: PathBuf, sub: PathBuf, offset: u64, data: Vec<u8> },

    /// Barrier: everything before this has been applied when it is acked.
    #[serde(rename = "rpc:complete")]
    Complete,
}

impl Rpc {
    /// Operation name for log spans.
    pub fn name(&self) -> &'static str {
        match self {
            Rpc::FullScan { .. } => "full_scan",
            Rpc::MkDir { .. } => "mkdir",
            Rpc::RmDir { .. } => "rmdir",
            Rpc::Delete { .. } => "delete",
            Rpc::SetSymlink { .. } => "set_symlink",
            Rpc::SetPerm { .. } => "set_perm",
            Rpc::PrepareFile { .. } => "prepare_file",
            Rpc::WriteChunk { .. } => "write_chunk",
            Rpc::Complete => "complete",
        }
    }
}
