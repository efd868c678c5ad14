// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filtered local tree walk.

use crate::hasher::signature_of;
use crate::skipper::Skipper;
use std::path::{Path, PathBuf};
use tether_core::Signature;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("walk failed under {root}: {source}")]
    Traversal {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Walk `root` depth-first, applying `skipper`, producing one
/// `(sub_path, signature)` per surviving entry.
///
/// Symlinks are reported as entries and never followed. Ignored
/// directories are pruned whole, so their contents are never stat'd.
/// The root itself is not reported. Entries that vanish mid-walk are
/// dropped; the live event stream will observe the deletion.
pub fn walk(root: &Path, skipper: &Skipper) -> Result<Vec<(PathBuf, Signature)>, WalkError> {
    let mut out = Vec::new();
    let iter = WalkDir::new(root).min_depth(1).follow_links(false).into_iter();
    let mut iter = iter.filter_entry(|e| {
        let sub = match e.path().strip_prefix(root) {
            Ok(s) => s,
            Err(_) => return true,
        };
        skipper.allows(sub, e.file_type().is_dir())
    });
    while let Some(entry) = iter.next() {
        let entry = match entry {
            Ok(e) => e,
            Err(source) => {
                if source.io_error().map(std::io::Error::kind)
                    == Some(std::io::ErrorKind::NotFound)
                {
                    continue;
                }
                return Err(WalkError::Traversal { root: root.to_path_buf(), source });
            }
        };
        let sub = match entry.path().strip_prefix(root) {
            Ok(s) => s.to_path_buf(),
            Err(_) => continue,
        };
        match signature_of(entry.path()) {
            Ok(Some(sig)) => out.push((sub, sig)),
            Ok(None) => {}
            Err(source) => return Err(WalkError::Io { path: entry.path().to_path_buf(), source }),
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
