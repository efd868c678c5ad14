// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Block hashing and signature computation.
//!
//! Files are fingerprinted per 64 KiB block with a SHA-256 digest
//! truncated to 16 bytes; the chunk-diff in the sync engine compares these
//! positionally to decide which blocks to resend.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use tether_core::{BlockHash, Signature, BLOCK_SIZE};

/// Truncated digest of one block's bytes.
pub fn block_digest(data: &[u8]) -> BlockHash {
    let full = Sha256::digest(data);
    let mut hash = [0u8; 16];
    hash.copy_from_slice(&full[..16]);
    hash
}

/// Signature of the node at `path`, or `None` if nothing is there.
///
/// Symlinks are reported as symlinks, never followed.
pub fn signature_of(path: &Path) -> io::Result<Option<Signature>> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    if meta.file_type().is_symlink() {
        let target = std::fs::read_link(path)?;
        return Ok(Some(Signature::Symlink { target: target.to_string_lossy().into_owned() }));
    }
    if meta.is_dir() {
        return Ok(Some(Signature::Dir { perm: perm_bits(&meta) }));
    }
    Ok(Some(hash_file(path, perm_bits(&meta))?))
}

/// Hash `path` block by block into a file signature.
fn hash_file(path: &Path, perm: u32) -> io::Result<Signature> {
    let mut file = File::open(path)?;
    let mut blocks = Vec::new();
    let mut size: u64 = 0;
    let mut buf = vec![0u8; BLOCK_SIZE as usize];
    loop {
        let n = read_up_to(&mut file, &mut buf)?;
        if n == 0 {
            break;
        }
        blocks.push(block_digest(&buf[..n]));
        size += n as u64;
        if n < buf.len() {
            break;
        }
    }
    Ok(Signature::File { perm, size, blocks })
}

/// Read block `index` of the file at `path`.
///
/// Returns an empty vec when the file ends at or before the block start
/// (the file shrank since it was hashed).
pub fn read_block(path: &Path, index: u64) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(index * BLOCK_SIZE))?;
    let mut buf = vec![0u8; BLOCK_SIZE as usize];
    let n = read_up_to(&mut file, &mut buf)?;
    buf.truncate(n);
    Ok(buf)
}

/// Fill `buf` as far as the stream allows, stopping only at EOF.
fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(unix)]
fn perm_bits(meta: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn perm_bits(meta: &std::fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

#[cfg(test)]
#[path = "hasher_tests.rs"]
mod tests;
