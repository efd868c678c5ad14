// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-root and within-root ordering of the RPC stream.

use super::prelude::*;

#[tokio::test(start_paused = true)]
async fn roots_flush_in_mapping_order_with_one_barrier() {
    let world = world(&["x", "y"]).await;
    std::fs::create_dir(world.local(0, "d")).unwrap();
    std::fs::write(world.local(0, "d/a.txt"), b"alpha").unwrap();
    std::fs::create_dir(world.local(1, "e")).unwrap();
    std::fs::write(world.local(1, "e/b.txt"), b"beta").unwrap();

    // One batch touching both roots.
    world.engine.paths(vec![
        world.local(0, "d"),
        world.local(0, "d/a.txt"),
        world.local(1, "e"),
        world.local(1, "e/b.txt"),
    ]);
    settle(&world.engine).await;

    let received = world.agent.received();
    let root_of = |rpc: &Rpc| -> Option<char> {
        let path = match rpc {
            Rpc::MkDir { path, .. } | Rpc::PrepareFile { path, .. } => path.clone(),
            Rpc::WriteChunk { dest, .. } => dest.clone(),
            _ => return None,
        };
        path.to_string_lossy().chars().next()
    };

    let sequence: Vec<char> = received.iter().filter_map(root_of).collect();
    let first_y = sequence.iter().position(|c| *c == 'y').expect("y ops present");
    assert!(
        sequence[..first_y].iter().all(|c| *c == 'x'),
        "all x/* RPCs precede all y/* RPCs: {:?}",
        sequence
    );

    // Within each root, the directory exists before the file under it.
    let names = world.rpc_names();
    let mkdir_x = names.iter().position(|n| *n == "mkdir").unwrap();
    let prepare_x = names.iter().position(|n| *n == "prepare_file").unwrap();
    assert!(mkdir_x < prepare_x);

    assert_eq!(world.count_rpc("complete"), 1, "one barrier for the whole batch");
    assert_eq!(received.last().unwrap().name(), "complete");
}

#[tokio::test(start_paused = true)]
async fn replacing_a_tree_deletes_children_before_the_parent() {
    let world = world(&["work"]).await;
    std::fs::create_dir(world.local(0, "d")).unwrap();
    std::fs::write(world.local(0, "d/inner.txt"), b"inner").unwrap();
    world.engine.paths(vec![world.local(0, "d"), world.local(0, "d/inner.txt")]);
    settle(&world.engine).await;

    std::fs::remove_dir_all(world.local(0, "d")).unwrap();
    world.engine.paths(vec![world.local(0, "d"), world.local(0, "d/inner.txt")]);
    settle(&world.engine).await;

    let tail: Vec<&str> = world.rpc_names().into_iter().rev().take(3).collect();
    // Reversed: complete, rmdir(d), delete(d/inner.txt).
    assert_eq!(tail, ["complete", "rmdir", "delete"]);
    assert!(world.agent.fs().get(Path::new("work/d")).is_none());
}
