// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event storms collapse into a single sync cycle.

use super::prelude::*;

#[tokio::test(start_paused = true)]
async fn a_thousand_events_produce_one_sync_cycle() {
    let world = world(&["work"]).await;
    std::fs::write(world.local(0, "f"), b"stormy").unwrap();

    for _ in 0..1000 {
        world.touch(0, "f");
    }
    settle(&world.engine).await;

    assert_eq!(world.count_rpc("prepare_file"), 1);
    assert_eq!(world.count_rpc("write_chunk"), 1);
    assert_eq!(world.count_rpc("complete"), 1);
}

#[tokio::test(start_paused = true)]
async fn quiet_gaps_split_bursts_into_separate_cycles() {
    let world = world(&["work"]).await;
    std::fs::write(world.local(0, "f"), b"one").unwrap();
    world.touch(0, "f");
    settle(&world.engine).await;

    std::fs::write(world.local(0, "f"), b"two").unwrap();
    world.touch(0, "f");
    settle(&world.engine).await;

    assert_eq!(world.count_rpc("prepare_file"), 2);
    assert_eq!(world.count_rpc("complete"), 2);
}

#[tokio::test(start_paused = true)]
async fn vcs_lockfile_noise_never_wakes_the_engine() {
    let world = world(&["work"]).await;
    let lock = world.local(0, ".git/index.lock");

    for _ in 0..50 {
        world.engine.paths(vec![lock.clone()]);
    }
    settle(&world.engine).await;

    // Only the bootstrap scan ever reached the agent.
    assert_eq!(world.rpc_names(), ["full_scan"]);
}
