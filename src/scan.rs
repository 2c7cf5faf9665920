//! Directory walk driving hash triples into the whitelist store.

use std::path::Path;

use log::{info, warn};
use walkdir::WalkDir;

use crate::constants::DEFAULT_BATCH_SIZE;
use crate::error::{HashbankError, Result};
use crate::hashing::{self, HashTriple};
use crate::record::{ThreatLevel, TrustLevel, WhitelistRecord, WriteStats};
use crate::store::WhitelistStore;

/// Walks a file tree, hashes every regular file and persists the results
/// in bounded batches. Strictly sequential: walk, hash and flush never
/// overlap.
pub struct Scanner<'a> {
    store: &'a mut WhitelistStore,
    batch_size: usize,
    replace: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(store: &'a mut WhitelistStore) -> Self {
        Self {
            store,
            batch_size: DEFAULT_BATCH_SIZE,
            replace: true,
        }
    }

    /// Entries buffered before a flush. The default bounds peak memory
    /// and transaction size at 1024 entries.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Whether colliding digests overwrite the stored record.
    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Walk the tree rooted at `root` and ingest every regular file.
    ///
    /// Symlinks are never followed: a symlinked directory is not descended
    /// into and a symlinked file is logged and skipped. A file that turns
    /// unreadable mid-scan is skipped with a warning; store failures and a
    /// broken root abort the scan. Already-flushed batches stay committed.
    pub fn scan(
        &mut self,
        root: &Path,
        source_id: Option<&str>,
        threat: ThreatLevel,
        trust: TrustLevel,
    ) -> Result<WriteStats> {
        let root = std::path::absolute(root)?;
        info!("Exploring from root {}...", root.display());

        let mut batch: Vec<(HashTriple, WhitelistRecord)> = Vec::new();
        let mut totals = WriteStats::default();
        for entry in WalkDir::new(&root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    if e.depth() == 0 {
                        return Err(HashbankError::InvalidPath(root));
                    }
                    warn!("Walk error, subtree skipped: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_symlink() {
                info!("{} is a symlink, skipped", entry.path().display());
                continue;
            }
            if !entry.file_type().is_file() {
                continue;
            }
            let filepath = entry.path();
            info!("Encountered file {}", filepath.display());
            let hashes = match hashing::digest_file(filepath) {
                Ok(hashes) => hashes,
                Err(HashbankError::Io(e)) => {
                    warn!("Skipping unreadable file {}: {}", filepath.display(), e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            let record = WhitelistRecord {
                filepath: filepath.display().to_string(),
                source_id: source_id.map(str::to_string),
                threat,
                trust,
            };
            batch.push((hashes, record));
            if batch.len() >= self.batch_size {
                totals += self.store.batch_write(&batch, self.replace)?;
                batch.clear();
            }
        }
        if !batch.is_empty() {
            totals += self.store.batch_write(&batch, self.replace)?;
        }

        info!("Done exploring!");
        info!("{} records processed", totals.processed);
        info!("{} records already in store", totals.duplicates);
        Ok(totals)
    }
}
