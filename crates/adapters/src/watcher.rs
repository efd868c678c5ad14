// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw filesystem-event bridge.
//!
//! Watches every replicated local root recursively and hands each batch of
//! changed paths to the caller. The callback runs on notify's watcher
//! thread, so callers should only enqueue into a mailbox there.

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;

/// Start watching `roots`. The returned watcher stops when dropped.
pub fn watch_roots(
    roots: &[PathBuf],
    on_paths: impl Fn(Vec<PathBuf>) + Send + 'static,
) -> Result<RecommendedWatcher, notify::Error> {
    let mut watcher =
        notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) if !event.paths.is_empty() => on_paths(event.paths),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "filesystem watcher error"),
        })?;
    for root in roots {
        watcher.watch(root, RecursiveMode::Recursive)?;
    }
    Ok(watcher)
}
