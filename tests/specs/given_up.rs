// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! After five consecutive failed reconnects the session parks until the
//! user forces a restart.

use super::prelude::*;

#[tokio::test(start_paused = true)]
async fn a_missing_agent_parks_the_session_after_backoff() {
    // Every launch fails: the agent binary is "missing".
    let world = world_with(&["work"], |agent| agent.fail_next_starts(100)).await;

    // Initial attempt plus five retries at 1, 2, 4, 8, 16 seconds.
    assert_eq!(world.agent.starts(), 6);
    assert_eq!(world.sink.last_image().unwrap(), "grey-dash");
    assert!(world.sink.last_tooltip().unwrap().contains("try again"));
    assert!(!world.notify.calls().is_empty(), "user is notified once parked");

    // Parked means parked: no further attempts on their own.
    tokio::time::sleep(Duration::from_secs(300)).await;
    settle(&world.engine).await;
    assert_eq!(world.agent.starts(), 6);
}

#[tokio::test(start_paused = true)]
async fn force_restart_revives_a_parked_session() {
    let world = world_with(&["work"], |agent| agent.fail_next_starts(6)).await;
    assert_eq!(world.sink.last_image().unwrap(), "grey-dash");

    world.engine.force_restart();
    settle(&world.engine).await;

    assert_eq!(world.agent.starts(), 7);
    // The bootstrap scan was buffered through the outage and lands now.
    assert_eq!(world.count_rpc("full_scan"), 1);
}

#[tokio::test(start_paused = true)]
async fn work_queued_while_parked_survives_the_revival() {
    let world = world_with(&["work"], |agent| agent.fail_next_starts(6)).await;

    std::fs::write(world.local(0, "queued.txt"), b"patience").unwrap();
    world.touch(0, "queued.txt");
    settle(&world.engine).await;
    assert_eq!(world.count_rpc("prepare_file"), 0);

    world.engine.force_restart();
    settle(&world.engine).await;
    assert!(world.agent.fs().get(Path::new("work/queued.txt")).is_some());
    assert_eq!(world.sink.last_image().unwrap(), "green-tick");
}
