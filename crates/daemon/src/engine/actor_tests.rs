// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex;

struct Recorder {
    seen: Arc<Mutex<Vec<u32>>>,
}

#[async_trait]
impl Actor for Recorder {
    type Msg = u32;

    async fn handle(&mut self, msg: u32) {
        self.seen.lock().push(msg);
    }
}

#[tokio::test(start_paused = true)]
async fn messages_are_handled_in_send_order() {
    let sched = Scheduler::new();
    let (addr, mailbox) = sched.mailbox();
    let seen = Arc::new(Mutex::new(Vec::new()));
    sched.spawn(Recorder { seen: Arc::clone(&seen) }, mailbox);

    for i in 0..100 {
        addr.send(i);
    }
    sched.quiesce().await;
    assert_eq!(*seen.lock(), (0..100).collect::<Vec<_>>());
}

#[tokio::test(start_paused = true)]
async fn quiesce_waits_for_delayed_sends() {
    let sched = Scheduler::new();
    let (addr, mailbox) = sched.mailbox();
    let seen = Arc::new(Mutex::new(Vec::new()));
    sched.spawn(Recorder { seen: Arc::clone(&seen) }, mailbox);

    sched.send_after(&addr, 7, Duration::from_secs(30));
    sched.quiesce().await;
    assert_eq!(*seen.lock(), [7]);
}

#[tokio::test(start_paused = true)]
async fn send_to_dropped_mailbox_still_settles() {
    let sched = Scheduler::new();
    let (addr, mailbox) = sched.mailbox::<u32>();
    drop(mailbox);
    addr.send(1);
    sched.send_after(&addr, 2, Duration::from_millis(5));
    sched.quiesce().await;
}

#[tokio::test(start_paused = true)]
async fn mailbox_can_be_drained_directly() {
    let sched = Scheduler::new();
    let (addr, mut mailbox) = sched.mailbox();
    addr.send(1u32);
    addr.send(2);
    assert_eq!(mailbox.recv().await, Some(1));
    assert_eq!(mailbox.try_recv(), Some(2));
    assert_eq!(mailbox.try_recv(), None);
    sched.quiesce().await;
}
