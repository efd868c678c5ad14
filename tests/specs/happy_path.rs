// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A fresh file flows to the agent as prepare + chunk + barrier.

use super::prelude::*;

#[tokio::test(start_paused = true)]
async fn single_file_create_reaches_the_agent() {
    let world = world(&["work"]).await;
    std::fs::write(world.local(0, "a.txt"), b"twelve bytes").unwrap();
    world.touch(0, "a.txt");
    settle(&world.engine).await;

    // FullScan from the bootstrap, then the file stream.
    assert_eq!(world.rpc_names(), ["full_scan", "prepare_file", "write_chunk", "complete"]);

    match &world.agent.received()[1] {
        Rpc::PrepareFile { path, blocks, .. } => {
            assert_eq!(path, Path::new("work/a.txt"));
            assert_eq!(*blocks, 1);
        }
        other => panic!("expected PrepareFile, got {:?}", other),
    }
    match &world.agent.received()[2] {
        Rpc::WriteChunk { dest, sub, offset, data } => {
            assert_eq!(dest, Path::new("work"));
            assert_eq!(sub, Path::new("a.txt"));
            assert_eq!(*offset, 0);
            assert_eq!(data, b"twelve bytes");
        }
        other => panic!("expected WriteChunk, got {:?}", other),
    }

    // The agent's model now matches the local file.
    match world.agent.fs().get(Path::new("work/a.txt")) {
        Some(Signature::File { size, .. }) => assert_eq!(*size, 12),
        other => panic!("expected file on the agent, got {:?}", other),
    }

    // Status walked active → done.
    let images = world.sink.images();
    let sync_pos = images.iter().position(|i| i == "blue-sync").expect("syncing icon");
    let done_pos = images.iter().rposition(|i| i == "green-tick").expect("done icon");
    assert!(sync_pos < done_pos);
    assert!(world.sink.last_tooltip().unwrap().contains("1 files 12 bytes"));
}

#[tokio::test(start_paused = true)]
async fn files_present_at_startup_are_pushed_by_the_initial_scan() {
    let temp = tempfile::TempDir::new().unwrap();
    // Build the world by hand so the file predates the engine.
    let root = temp.path().join("src");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(root.join("seed.txt"), b"already here").unwrap();

    let mapping = Mapping::new(vec![(root, PathBuf::from("work"))]).unwrap();
    let (launcher, agent) = FakeLauncher::new();
    let sink = RecordingSink::new();
    let engine = engine::start(
        EngineOpts {
            mapping,
            skippers: vec![Skipper::compile("").unwrap()],
            debounce_window: DEBOUNCE,
        },
        launcher,
        FakeNotifyAdapter::new(),
        FakeClock::new(),
        sink,
    );
    settle(&engine).await;

    assert!(agent.fs().get(Path::new("work/seed.txt")).is_some());
    assert_eq!(agent.received().iter().filter(|r| matches!(r, Rpc::Complete)).count(), 1);
}

#[tokio::test(start_paused = true)]
async fn remote_only_files_are_deleted_by_the_bootstrap_merge() {
    let world = world_with(&["work"], |agent| {
        agent.seed(
            Path::new("work/stale.txt"),
            Signature::File { perm: 0o644, size: 5, blocks: vec![[1; 16]] },
        );
    })
    .await;

    assert!(world.agent.fs().get(Path::new("work/stale.txt")).is_none());
    assert_eq!(world.count_rpc("delete"), 1);
}
