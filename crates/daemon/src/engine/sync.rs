// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The diff engine.
//!
//! Owns the remote mirror (`Vfs<Signature>` per mapping entry) and turns
//! path-change batches into the minimal ordered RPC stream that brings the
//! agent's tree into agreement with the local one. The mirror is updated
//! predictively at emit time; the replay buffer in the agent link, not a
//! mirror rollback, covers the send/ack gap.

use super::actor::{Actor, Addr, Scheduler};
use super::agent_rpc::LinkMsg;
use super::status::StatusMsg;
use super::transfer::Transfer;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tether_adapters::signature_of;
use tether_core::{Mapping, Signature, Vfs};
use tether_wire::{Response, Rpc};

/// Delay before a failed path set is retried, so a persistently unreadable
/// path cannot spin the scheduler hot.
const RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub enum SyncMsg {
    /// One surviving entry of the initial local walk.
    LocalScanned { root: PathBuf, sub: PathBuf, sig: Signature },
    /// The local walk finished (all roots).
    LocalScanComplete,
    /// One node of the agent's remote enumeration.
    RemoteScanned { base: PathBuf, sub: PathBuf, sig: Signature },
    /// The agent acked its scan: the remote enumeration is complete.
    RemoteScanComplete,
    /// A debounced, filtered batch: local root → changed sub-paths.
    Events(IndexMap<PathBuf, BTreeSet<PathBuf>>),
    /// Any other agent response, forwarded as-is.
    AgentResponse(Response),
}

enum SyncState {
    /// Bootstrap: accumulating the local walk and the agent's reported
    /// tree in parallel. Events arriving now are deferred into `pending`.
    RemoteScanning {
        /// Local root → sub-paths seen locally or remotely (remote bases
        /// are translated to local roots as they arrive).
        pending: IndexMap<PathBuf, BTreeSet<PathBuf>>,
        vfs: Vec<Vfs<Signature>>,
        scans_complete: u8,
    },
    /// Steady state: every Events batch is diffed immediately.
    Waiting { vfs: Vec<Vfs<Signature>> },
}

pub struct Syncer {
    mapping: Mapping,
    link: Addr<LinkMsg>,
    status: Addr<StatusMsg>,
    self_addr: Addr<SyncMsg>,
    sched: Scheduler,
    state: SyncState,
}

impl Syncer {
    pub fn new(
        mapping: Mapping,
        link: Addr<LinkMsg>,
        status: Addr<StatusMsg>,
        self_addr: Addr<SyncMsg>,
        sched: Scheduler,
    ) -> Self {
        let pending =
            mapping.entries().iter().map(|e| (e.local.clone(), BTreeSet::new())).collect();
        let vfs = mapping.entries().iter().map(|_| Vfs::new()).collect();
        Self {
            mapping,
            link,
            status,
            self_addr,
            sched,
            state: SyncState::RemoteScanning { pending, vfs, scans_complete: 0 },
        }
    }

    fn entry_index_by_remote(&self, base: &Path) -> Option<usize> {
        self.mapping.entries().iter().position(|e| e.remote == base)
    }

    fn scan_progress(&mut self) {
        let SyncState::RemoteScanning { pending, vfs, scans_complete } = &mut self.state else {
            return;
        };
        *scans_complete += 1;
        if *scans_complete < 2 {
            return;
        }
        // Any path present locally or remotely gets diffed.
        let paths = std::mem::take(pending);
        let mut vfs = std::mem::take(vfs);
        let total: usize = paths.values().map(|s| s.len()).sum();
        tracing::info!(paths = total, "both scans complete, reconciling");
        self.execute_sync(paths, &mut vfs);
        self.state = SyncState::Waiting { vfs };
    }

    /// Diff every changed path against the mirror and stream the fix-ups.
    ///
    /// Two passes per mapping entry: creations and modifications sorted by
    /// path depth ascending (parents before children), then deletions
    /// sorted descending (children before parents). Each emit updates the
    /// mirror with the intended post-state.
    fn execute_sync(
        &mut self,
        paths: IndexMap<PathBuf, BTreeSet<PathBuf>>,
        vfs: &mut [Vfs<Signature>],
    ) {
        let mut synced = false;
        let mut failures: IndexMap<PathBuf, BTreeSet<PathBuf>> = IndexMap::new();

        for (idx, entry) in self.mapping.entries().iter().enumerate() {
            let Some(subs) = paths.get(&entry.local) else { continue };

            let mut upserts: Vec<(PathBuf, Vec<Transfer>, Signature)> = Vec::new();
            let mut deletions: Vec<(PathBuf, Transfer)> = Vec::new();

            for sub in subs {
                let local_path = entry.local.join(sub);
                let sig_local = match signature_of(&local_path) {
                    Ok(sig) => sig,
                    Err(e) => {
                        tracing::error!(
                            path = %local_path.display(),
                            error = %e,
                            "cannot read local node, will retry"
                        );
                        failures.entry(entry.local.clone()).or_default().insert(sub.clone());
                        continue;
                    }
                };
                let sig_remote = vfs[idx].get(sub).cloned();
                if sig_local == sig_remote {
                    continue;
                }
                let remote_path = entry.remote.join(sub);
                match sig_local {
                    None => {
                        let op = match sig_remote {
                            Some(Signature::Dir { .. }) => Rpc::RmDir { path: remote_path },
                            Some(_) => Rpc::Delete { path: remote_path },
                            // Equal-None was skipped above.
                            None => continue,
                        };
                        deletions.push((sub.clone(), Transfer::Rpc(op)));
                    }
                    Some(local) => {
                        let ops = upsert_ops(entry.local.clone(), entry.remote.clone(), sub, remote_path, &local, sig_remote.as_ref());
                        if !ops.is_empty() {
                            upserts.push((sub.clone(), ops, local));
                        }
                    }
                }
            }

            if upserts.is_empty() && deletions.is_empty() {
                continue;
            }
            if !synced {
                self.status.send(StatusMsg::Syncing);
                synced = true;
            }

            upserts.sort_by(|a, b| depth_key(&a.0).cmp(&depth_key(&b.0)));
            for (sub, ops, post) in upserts {
                for op in ops {
                    self.link.send(LinkMsg::Send(op));
                }
                if post.is_dir() {
                    vfs[idx].update(&sub, Some(post));
                } else {
                    // Replacing a directory subtree with a leaf prunes its
                    // children from the mirror too.
                    vfs[idx].update(&sub, None);
                    vfs[idx].update(&sub, Some(post));
                }
            }

            deletions.sort_by(|a, b| depth_key(&b.0).cmp(&depth_key(&a.0)));
            for (sub, op) in deletions {
                self.link.send(LinkMsg::Send(op));
                vfs[idx].update(&sub, None);
            }
        }

        if synced {
            self.link.send(LinkMsg::Send(Transfer::Complete));
        }
        if !failures.is_empty() {
            self.sched.send_after(&self.self_addr, SyncMsg::Events(failures), RETRY_DELAY);
        }
    }
}

fn depth_key(path: &Path) -> (usize, &Path) {
    (path.components().count(), path)
}

/// Operations that turn `remote` into `local` at one path, plus their
/// predictive post-state (always the local signature).
fn upsert_ops(
    local_root: PathBuf,
    remote_root: PathBuf,
    sub: &Path,
    remote_path: PathBuf,
    local: &Signature,
    remote: Option<&Signature>,
) -> Vec<Transfer> {
    let mut ops = Vec::new();
    match local {
        Signature::Dir { perm } => match remote {
            None => ops.push(Transfer::Rpc(Rpc::MkDir { path: remote_path, perm: *perm })),
            Some(Signature::Dir { perm: have }) => {
                if have != perm {
                    ops.push(Transfer::Rpc(Rpc::SetPerm { path: remote_path, perm: *perm }));
                }
            }
            Some(_) => {
                ops.push(Transfer::Rpc(Rpc::Delete { path: remote_path.clone() }));
                ops.push(Transfer::Rpc(Rpc::MkDir { path: remote_path, perm: *perm }));
            }
        },
        Signature::Symlink { target } => {
            match remote {
                Some(Signature::Dir { .. }) => {
                    ops.push(Transfer::Rpc(Rpc::RmDir { path: remote_path.clone() }));
                }
                Some(Signature::File { .. }) => {
                    ops.push(Transfer::Rpc(Rpc::Delete { path: remote_path.clone() }));
                }
                _ => {}
            }
            ops.push(Transfer::Rpc(Rpc::SetSymlink {
                path: remote_path,
                target: target.clone(),
            }));
        }
        Signature::File { perm, size, blocks } => {
            let have_file = match remote {
                Some(Signature::Dir { .. }) => {
                    ops.push(Transfer::Rpc(Rpc::RmDir { path: remote_path.clone() }));
                    None
                }
                Some(Signature::Symlink { .. }) => {
                    ops.push(Transfer::Rpc(Rpc::Delete { path: remote_path.clone() }));
                    None
                }
                Some(Signature::File { perm: have_perm, size: have_size, blocks: have_blocks }) => {
                    Some((have_perm, have_size, have_blocks))
                }
                None => None,
            };

            let content_matches = have_file
                .map(|(_, have_size, have_blocks)| have_size == size && have_blocks == blocks)
                .unwrap_or(false);
            if content_matches {
                // Equality was ruled out, so only the perm differs.
                ops.push(Transfer::Rpc(Rpc::SetPerm { path: remote_path, perm: *perm }));
            } else {
                ops.push(Transfer::FileTotal {
                    files: 1,
                    bytes: *size,
                    example: sub.to_path_buf(),
                });
                ops.push(Transfer::StartFile { path: remote_path.clone() });
                ops.push(Transfer::Rpc(Rpc::PrepareFile {
                    path: remote_path,
                    perm: *perm,
                    blocks: blocks.len() as u64,
                }));
                let have_blocks = have_file.map(|(_, _, b)| b.as_slice()).unwrap_or(&[]);
                for (index, digest) in blocks.iter().enumerate() {
                    // Absent blocks mismatch by definition.
                    if have_blocks.get(index) != Some(digest) {
                        ops.push(Transfer::SendChunk {
                            local_src: local_root.clone(),
                            remote_dest: remote_root.clone(),
                            sub: sub.to_path_buf(),
                            index: index as u64,
                            count: blocks.len() as u64,
                        });
                    }
                }
            }
        }
    }
    ops
}

#[async_trait]
impl Actor for Syncer {
    type Msg = SyncMsg;

    async fn handle(&mut self, msg: SyncMsg) {
        match msg {
            SyncMsg::LocalScanned { root, sub, sig } => {
                if let SyncState::RemoteScanning { pending, .. } = &mut self.state {
                    tracing::debug!(root = %root.display(), sub = %sub.display(), kind = sig.kind(), "scanned");
                    pending.entry(root).or_default().insert(sub);
                }
            }
            SyncMsg::LocalScanComplete => self.scan_progress(),
            SyncMsg::RemoteScanned { base, sub, sig } => {
                if let Some(idx) = self.entry_index_by_remote(&base) {
                    let local_root = self.mapping.entries()[idx].local.clone();
                    if let SyncState::RemoteScanning { pending, vfs, .. } = &mut self.state {
                        vfs[idx].update(&sub, Some(sig));
                        pending.entry(local_root).or_default().insert(sub);
                    }
                } else {
                    tracing::warn!(base = %base.display(), "scan result for unknown remote root");
                }
            }
            SyncMsg::RemoteScanComplete => {
                if matches!(self.state, SyncState::RemoteScanning { .. }) {
                    self.scan_progress();
                }
            }
            SyncMsg::Events(paths) => match &mut self.state {
                SyncState::RemoteScanning { pending, .. } => {
                    // Deferred but preserved; diffed once both scans land.
                    for (root, subs) in paths {
                        pending.entry(root).or_default().extend(subs);
                    }
                }
                SyncState::Waiting { vfs } => {
                    let mut vfs = std::mem::take(vfs);
                    self.execute_sync(paths, &mut vfs);
                    self.state = SyncState::Waiting { vfs };
                }
            },
            SyncMsg::AgentResponse(resp) => {
                tracing::warn!(?resp, "unhandled agent response");
            }
        }
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
