// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Burst coalescing for raw filesystem events.
//!
//! Editors and VCS operations produce thousands of notifications per save;
//! this actor forwards one batch per quiescent gap. Timers are never
//! cancelled: each reschedule carries the accumulated set size as a token,
//! and a stale timer whose token no longer matches is simply ignored.

use super::actor::{Actor, Addr, Scheduler};
use super::skip::FilterMsg;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

/// Git writes this constantly while the user works; a burst made entirely
/// of it is noise and must not wake the pipeline.
const VCS_LOCKFILE: &str = "index.lock";

#[derive(Debug)]
pub enum DebounceMsg {
    /// Raw changed paths from the filesystem watcher.
    Paths(Vec<PathBuf>),
    /// A scheduled flush; valid only while `token` matches the
    /// accumulated set size.
    Trigger { token: usize },
}

enum DebounceState {
    Idle,
    Debouncing { accum: BTreeSet<PathBuf> },
}

pub struct Debouncer {
    window: Duration,
    downstream: Addr<FilterMsg>,
    self_addr: Addr<DebounceMsg>,
    sched: Scheduler,
    state: DebounceState,
}

impl Debouncer {
    pub fn new(
        window: Duration,
        downstream: Addr<FilterMsg>,
        self_addr: Addr<DebounceMsg>,
        sched: Scheduler,
    ) -> Self {
        Self { window, downstream, self_addr, sched, state: DebounceState::Idle }
    }

    fn schedule_trigger(&self, token: usize) {
        self.sched.send_after(&self.self_addr, DebounceMsg::Trigger { token }, self.window);
    }
}

#[async_trait]
impl Actor for Debouncer {
    type Msg = DebounceMsg;

    async fn handle(&mut self, msg: DebounceMsg) {
        match msg {
            DebounceMsg::Paths(paths) => match &mut self.state {
                DebounceState::Idle => {
                    let only_lockfiles = paths
                        .iter()
                        .all(|p| p.file_name().is_some_and(|n| n == VCS_LOCKFILE));
                    if only_lockfiles {
                        return;
                    }
                    let accum: BTreeSet<PathBuf> = paths.into_iter().collect();
                    self.schedule_trigger(accum.len());
                    self.state = DebounceState::Debouncing { accum };
                }
                DebounceState::Debouncing { accum } => {
                    accum.extend(paths);
                    let token = accum.len();
                    self.schedule_trigger(token);
                }
            },
            DebounceMsg::Trigger { token } => {
                if let DebounceState::Debouncing { accum } = &mut self.state {
                    if token != accum.len() {
                        // Superseded by a newer paths-event; its own timer
                        // is still pending.
                        return;
                    }
                    let paths = std::mem::take(accum);
                    tracing::debug!(count = paths.len(), "debounce window closed");
                    self.downstream.send(FilterMsg::Paths(paths));
                    self.state = DebounceState::Idle;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;
