//! Streams file contents through md5, sha1 and sha256 in a single pass.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::constants::HASH_CHUNK_SIZE;
use crate::error::Result;

/// The three digests of one file's content. The raw bytes double as store
/// keys, so there is no hex encoding here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashTriple {
    pub md5: [u8; 16],
    pub sha1: [u8; 20],
    pub sha256: [u8; 32],
}

impl HashTriple {
    /// The digests in fixed key order: md5, sha1, sha256.
    pub fn keys(&self) -> [&[u8]; 3] {
        [&self.md5, &self.sha1, &self.sha256]
    }
}

/// Hash `path` with all three algorithms in one read pass.
///
/// Symbolic links are never followed here; the directory walker is
/// responsible for filtering them out before calling this. A missing or
/// unreadable file surfaces as an IO error with no partial digests.
pub fn digest_file(path: &Path) -> Result<HashTriple> {
    debug!("Hashing {}", path.display());
    let mut fh = File::open(path)?;
    let mut md5 = Md5::new();
    let mut sha1 = Sha1::new();
    let mut sha256 = Sha256::new();
    let mut chunk = vec![0u8; HASH_CHUNK_SIZE];
    loop {
        let n = fh.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        md5.update(&chunk[..n]);
        sha1.update(&chunk[..n]);
        sha256.update(&chunk[..n]);
    }
    Ok(HashTriple {
        md5: md5.finalize().into(),
        sha1: sha1.finalize().into(),
        sha256: sha256.finalize().into(),
    })
}

/// Md5-only digest, used as the checksum key for the sources side-channel.
pub fn md5_file(path: &Path) -> Result<[u8; 16]> {
    let mut fh = File::open(path)?;
    let mut md5 = Md5::new();
    let mut chunk = vec![0u8; HASH_CHUNK_SIZE];
    loop {
        let n = fh.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        md5.update(&chunk[..n]);
    }
    Ok(md5.finalize().into())
}
