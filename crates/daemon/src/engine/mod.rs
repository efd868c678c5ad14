// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine assembly.
//!
//! Mailboxes are created before any actor exists, so the mutually
//! referencing sync engine and RPC session are wired through plain
//! addresses with no back-references. Once everything is spawned, the
//! bootstrap kicks off both scans in parallel.

pub mod actor;
pub mod agent_rpc;
pub mod debounce;
pub mod skip;
pub mod status;
pub mod sync;
pub mod transfer;

use self::actor::Scheduler;
use self::agent_rpc::{AgentLink, LinkMsg};
use self::debounce::{DebounceMsg, Debouncer};
use self::skip::{FilterMsg, IgnoreFilter};
use self::status::{StatusMsg, StatusSink, StatusView};
use self::sync::Syncer;
use self::transfer::Transfer;
use std::path::PathBuf;
use std::time::Duration;
use tether_adapters::{Launcher, NotifyAdapter, Skipper};
use tether_core::{Clock, Mapping};

#[cfg(any(test, feature = "test-support"))]
pub use self::status::RecordingSink;

/// Everything the engine needs to know about what to replicate.
pub struct EngineOpts {
    pub mapping: Mapping,
    /// One compiled skipper per mapping entry, in mapping order.
    pub skippers: Vec<Skipper>,
    pub debounce_window: Duration,
}

/// Handle to a running engine.
#[derive(Clone)]
pub struct Engine {
    debounce: actor::Addr<DebounceMsg>,
    link: actor::Addr<LinkMsg>,
    sched: Scheduler,
}

impl Engine {
    /// Feed a batch of raw changed paths (from the filesystem watcher).
    pub fn paths(&self, paths: Vec<PathBuf>) {
        self.debounce.send(DebounceMsg::Paths(paths));
    }

    /// User-initiated restart; the only way out of the given-up state.
    pub fn force_restart(&self) {
        self.link.send(LinkMsg::ForceRestart);
    }

    /// Tear down the agent and stop accepting work.
    pub fn close(&self) {
        self.link.send(LinkMsg::Close);
    }

    /// Wait until every in-flight message has been handled.
    pub async fn quiesce(&self) {
        self.sched.quiesce().await;
    }
}

/// Spawn the five actors and start the initial bidirectional scan.
pub fn start<L, N, C, S>(opts: EngineOpts, launcher: L, notifier: N, clock: C, sink: S) -> Engine
where
    L: Launcher,
    N: NotifyAdapter,
    C: Clock,
    S: StatusSink,
{
    let sched = Scheduler::new();
    let (status_addr, status_rx) = sched.mailbox::<StatusMsg>();
    let (link_addr, link_rx) = sched.mailbox::<LinkMsg>();
    let (sync_addr, sync_rx) = sched.mailbox();
    let (filter_addr, filter_rx) = sched.mailbox::<FilterMsg>();
    let (debounce_addr, debounce_rx) = sched.mailbox::<DebounceMsg>();

    sched.spawn(StatusView::new(clock, sink, status_addr.clone(), sched.clone()), status_rx);
    sched.spawn(
        AgentLink::new(
            launcher,
            notifier,
            sync_addr.clone(),
            status_addr.clone(),
            link_addr.clone(),
            sched.clone(),
        ),
        link_rx,
    );
    sched.spawn(
        Syncer::new(
            opts.mapping.clone(),
            link_addr.clone(),
            status_addr.clone(),
            sync_addr.clone(),
            sched.clone(),
        ),
        sync_rx,
    );
    sched.spawn(IgnoreFilter::new(opts.mapping.clone(), opts.skippers, sync_addr), filter_rx);
    sched.spawn(
        Debouncer::new(
            opts.debounce_window,
            filter_addr.clone(),
            debounce_addr.clone(),
            sched.clone(),
        ),
        debounce_rx,
    );

    // Bootstrap: connect, then run the local walk and the remote
    // enumeration in parallel. Per-actor FIFO guarantees the connect
    // attempt is handled before the scan request needs the pipe.
    link_addr.send(LinkMsg::AttemptReconnect { attempt: 0 });
    let remote_roots: Vec<PathBuf> =
        opts.mapping.entries().iter().map(|e| e.remote.clone()).collect();
    link_addr.send(LinkMsg::Send(Transfer::RemoteScan { paths: remote_roots }));
    filter_addr.send(FilterMsg::Scan);

    Engine { debounce: debounce_addr, link: link_addr, sched }
}
