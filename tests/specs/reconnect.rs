// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport failures: buffered work survives the reconnect and is
//! replayed in order before anything newer.

use super::prelude::*;

#[tokio::test(start_paused = true)]
async fn unacked_mkdir_is_resent_after_the_agent_dies() {
    let world = world(&["work"]).await;

    world.agent.hold_acks(true);
    std::fs::create_dir(world.local(0, "d")).unwrap();
    world.touch(0, "d");
    settle(&world.engine).await;
    assert_eq!(world.count_rpc("mkdir"), 1, "sent once, ack withheld");

    world.agent.hold_acks(false);
    world.agent.sever();
    settle(&world.engine).await;

    // The same MkDir went out again on the new session, and the batch
    // barrier after it completed the cycle.
    assert_eq!(world.count_rpc("mkdir"), 2);
    assert_eq!(world.agent.starts(), 2);
    assert!(world.agent.fs().get(Path::new("work/d")).is_some());
    assert_eq!(world.sink.last_image().unwrap(), "green-tick");
}

#[tokio::test(start_paused = true)]
async fn work_arriving_during_the_outage_lands_after_the_replay() {
    let world = world(&["work"]).await;

    world.agent.hold_acks(true);
    std::fs::create_dir(world.local(0, "first")).unwrap();
    world.touch(0, "first");
    settle(&world.engine).await;

    world.agent.hold_acks(false);
    world.agent.sever();
    // New work shows up while the session is down.
    std::fs::create_dir(world.local(0, "second")).unwrap();
    world.touch(0, "second");
    settle(&world.engine).await;

    let mkdirs: Vec<String> = world
        .agent
        .received()
        .iter()
        .filter_map(|r| match r {
            Rpc::MkDir { path, .. } => Some(path.display().to_string()),
            _ => None,
        })
        .collect();
    // first (original), then first again (replay), then second.
    let replayed: Vec<&str> = mkdirs.iter().map(String::as_str).collect();
    assert_eq!(replayed, ["work/first", "work/first", "work/second"]);
}

#[tokio::test(start_paused = true)]
async fn an_idle_reconnect_heals_with_a_barrier() {
    let world = world(&["work"]).await;
    std::fs::write(world.local(0, "a.txt"), b"x").unwrap();
    world.touch(0, "a.txt");
    settle(&world.engine).await;

    // Everything acked; kill the agent while idle.
    world.agent.sever();
    settle(&world.engine).await;

    assert_eq!(world.agent.starts(), 2);
    // The synthesized barrier is the only traffic on the new session.
    assert_eq!(world.agent.received().last().unwrap().name(), "complete");
    assert_eq!(world.sink.last_image().unwrap(), "green-tick");
}
