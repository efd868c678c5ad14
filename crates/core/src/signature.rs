// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content signatures for filesystem nodes.
//!
//! A [`Signature`] is a fingerprint of one node, sufficient to detect any
//! observable change: permission bits for directories, per-block digests
//! plus size for regular files, the target for symlinks. Absence is
//! represented as `Option::<Signature>::None` at the call sites.

use serde::{Deserialize, Serialize};

/// Fixed block size used for file chunking and per-block hashing.
pub const BLOCK_SIZE: u64 = 64 * 1024;

/// Truncated digest of one file block.
pub type BlockHash = [u8; 16];

/// Fingerprint of a single filesystem node.
///
/// Two signatures are equal iff they have the same variant and all fields
/// are equal; block-hash comparison is positional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Signature {
    /// A directory with POSIX permission bits.
    #[serde(rename = "dir")]
    Dir { perm: u32 },

    /// A regular file partitioned into [`BLOCK_SIZE`] blocks.
    #[serde(rename = "file")]
    File { perm: u32, size: u64, blocks: Vec<BlockHash> },

    /// A symbolic link. The target is stored verbatim, never resolved.
    #[serde(rename = "symlink")]
    Symlink { target: String },
}

impl Signature {
    /// Variant name for log spans.
    pub fn kind(&self) -> &'static str {
        match self {
            Signature::Dir { .. } => "dir",
            Signature::File { .. } => "file",
            Signature::Symlink { .. } => "symlink",
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Signature::Dir { .. })
    }

    /// Permission bits, if the variant carries them.
    pub fn perm(&self) -> Option<u32> {
        match self {
            Signature::Dir { perm } | Signature::File { perm, .. } => Some(*perm),
            Signature::Symlink { .. } => None,
        }
    }

    /// Number of blocks a file of `size` bytes occupies.
    ///
    /// An empty file has zero blocks; a file of exactly [`BLOCK_SIZE`]
    /// bytes has one.
    pub fn block_count(size: u64) -> u64 {
        size.div_ceil(BLOCK_SIZE)
    }
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
