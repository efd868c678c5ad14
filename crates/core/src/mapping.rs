// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Root mapping: which local trees replicate to which remote destinations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One replicated pair: an absolute local root and the relative remote
/// root it lands under on the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEntry {
    pub local: PathBuf,
    pub remote: PathBuf,
}

/// Errors raised while validating a mapping.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("mapping has no entries")]
    Empty,
    #[error("local root is not absolute: {0}")]
    RelativeLocalRoot(PathBuf),
    #[error("local roots overlap: {0} and {1}")]
    OverlappingRoots(PathBuf, PathBuf),
}

/// Immutable ordered list of replicated roots.
///
/// Local roots are disjoint: no entry's root is a prefix of another's.
/// Order is preserved; the sync engine processes entries in this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<MapEntry>,
}

impl Mapping {
    pub fn new(pairs: Vec<(PathBuf, PathBuf)>) -> Result<Self, MappingError> {
        if pairs.is_empty() {
            return Err(MappingError::Empty);
        }
        for (local, _) in &pairs {
            if !local.is_absolute() {
                return Err(MappingError::RelativeLocalRoot(local.clone()));
            }
        }
        for (i, (a, _)) in pairs.iter().enumerate() {
            for (b, _) in &pairs[i + 1..] {
                if a.starts_with(b) || b.starts_with(a) {
                    return Err(MappingError::OverlappingRoots(a.clone(), b.clone()));
                }
            }
        }
        let entries =
            pairs.into_iter().map(|(local, remote)| MapEntry { local, remote }).collect();
        Ok(Mapping { entries })
    }

    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry owning `path`, plus `path` relative to that entry's local
    /// root. `None` for paths outside every root.
    pub fn owner_of(&self, path: &Path) -> Option<(&MapEntry, PathBuf)> {
        self.entries.iter().find_map(|e| {
            path.strip_prefix(&e.local).ok().map(|sub| (e, sub.to_path_buf()))
        })
    }

    /// The entry whose remote root is `remote`.
    pub fn by_remote(&self, remote: &Path) -> Option<&MapEntry> {
        self.entries.iter().find(|e| e.remote == remote)
    }
}

#[cfg(test)]
#[path = "mapping_tests.rs"]
mod tests;
