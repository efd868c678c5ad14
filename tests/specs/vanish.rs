// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Files disappearing underneath the engine are handled by dropping the
//! in-flight chunk and letting the next cycle observe the deletion.

use super::prelude::*;

#[tokio::test(start_paused = true)]
async fn deletion_after_sync_emits_delete_on_the_next_cycle() {
    let world = world(&["work"]).await;
    std::fs::write(world.local(0, "a.txt"), b"short lived").unwrap();
    world.touch(0, "a.txt");
    settle(&world.engine).await;
    assert!(world.agent.fs().get(Path::new("work/a.txt")).is_some());

    std::fs::remove_file(world.local(0, "a.txt")).unwrap();
    world.touch(0, "a.txt");
    settle(&world.engine).await;

    assert_eq!(world.count_rpc("delete"), 1);
    assert!(world.agent.fs().get(Path::new("work/a.txt")).is_none());
}

#[tokio::test(start_paused = true)]
async fn a_file_that_never_existed_remotely_sends_nothing() {
    let world = world(&["work"]).await;
    // The watcher can report a path that is already gone by the time the
    // debounce window closes.
    world.touch(0, "flash.txt");
    settle(&world.engine).await;

    assert_eq!(world.rpc_names(), ["full_scan"]);
    assert_ne!(world.sink.last_image().unwrap(), "red-cross");
}
