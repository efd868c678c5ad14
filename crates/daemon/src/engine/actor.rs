// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal actor runtime.
//!
//! Each actor owns its state and drains one mailbox strictly sequentially;
//! handlers run to completion with no suspension points shared between
//! actors. The scheduler keeps two atomic counters (messages scheduled /
//! messages completed) so tests can await quiescence instead of sleeping.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// A message handler with exclusive state.
#[async_trait]
pub trait Actor: Send + 'static {
    type Msg: Send + 'static;

    async fn handle(&mut self, msg: Self::Msg);
}

#[derive(Default)]
struct Counters {
    scheduled: AtomicU64,
    completed: AtomicU64,
}

/// Spawns actors and tracks in-flight messages.
#[derive(Clone, Default)]
pub struct Scheduler {
    counters: Arc<Counters>,
}

/// Sending half of an actor's mailbox.
pub struct Addr<M> {
    tx: mpsc::UnboundedSender<M>,
    counters: Arc<Counters>,
}

impl<M> Clone for Addr<M> {
    fn clone(&self) -> Self {
        Addr { tx: self.tx.clone(), counters: Arc::clone(&self.counters) }
    }
}

impl<M: Send + 'static> Addr<M> {
    /// Fire-and-forget enqueue. Never blocks the sender.
    pub fn send(&self, msg: M) {
        self.counters.scheduled.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(msg).is_err() {
            // Receiver is gone; balance the counter so quiesce still settles.
            self.counters.completed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Receiving half, handed to `spawn` (or drained directly in tests).
pub struct Mailbox<M> {
    rx: mpsc::UnboundedReceiver<M>,
    counters: Arc<Counters>,
}

impl<M> Mailbox<M> {
    pub async fn recv(&mut self) -> Option<M> {
        let msg = self.rx.recv().await;
        if msg.is_some() {
            self.counters.completed.fetch_add(1, Ordering::SeqCst);
        }
        msg
    }

    pub fn try_recv(&mut self) -> Option<M> {
        let msg = self.rx.try_recv().ok();
        if msg.is_some() {
            self.counters.completed.fetch_add(1, Ordering::SeqCst);
        }
        msg
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mailbox before its actor exists.
    ///
    /// Channels are wired first so mutually-referencing actors (the sync
    /// engine and the RPC session) can each hold the other's address
    /// without back-references.
    pub fn mailbox<M: Send + 'static>(&self) -> (Addr<M>, Mailbox<M>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Addr { tx, counters: Arc::clone(&self.counters) },
            Mailbox { rx, counters: Arc::clone(&self.counters) },
        )
    }

    /// Run `actor` against `mailbox` until every address is dropped.
    pub fn spawn<A: Actor>(&self, mut actor: A, mut mailbox: Mailbox<A::Msg>) {
        let counters = Arc::clone(&self.counters);
        tokio::spawn(async move {
            while let Some(msg) = mailbox.rx.recv().await {
                actor.handle(msg).await;
                counters.completed.fetch_add(1, Ordering::SeqCst);
            }
        });
    }

    /// Deliver `msg` to `addr` after `delay`.
    ///
    /// The send is counted immediately, so quiescence waits for pending
    /// timers; stale deliveries are disambiguated by message payload, not
    /// by cancellation.
    pub fn send_after<M: Send + 'static>(&self, addr: &Addr<M>, msg: M, delay: Duration) {
        let tx = addr.tx.clone();
        let counters = Arc::clone(&self.counters);
        counters.scheduled.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(msg).is_err() {
                counters.completed.fetch_add(1, Ordering::SeqCst);
            }
        });
    }

    /// Wait until every scheduled message (including delayed ones) has
    /// been handled.
    pub async fn quiesce(&self) {
        loop {
            if self.settled() {
                tokio::task::yield_now().await;
                if self.settled() {
                    return;
                }
            } else {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        }
    }

    fn settled(&self) -> bool {
        self.counters.scheduled.load(Ordering::SeqCst)
            == self.counters.completed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "actor_tests.rs"]
mod tests;
