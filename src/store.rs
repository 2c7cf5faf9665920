//! Content-addressed whitelist store on top of an embedded redb database.
//!
//! Keys are raw digest bytes; values are JSON-encoded [`WhitelistRecord`]s.
//! Every file is reachable through three keys (md5, sha1, sha256) that all
//! carry equivalent metadata. The unit of durability is the write batch:
//! one batch commits as one transaction, either fully or not at all.

use std::path::Path;

use log::{debug, info};
use redb::{Database, ReadableTable, TableDefinition};

use crate::error::Result;
use crate::hashing::HashTriple;
use crate::record::{SourceMeta, WhitelistRecord, WriteStats};

/// digest bytes -> JSON WhitelistRecord
const WHITELIST_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("whitelist");
/// source md5 -> JSON SourceMeta
const SOURCES_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("sources");

/// Persistent whitelist database. Constructing it opens the database and
/// takes the engine's exclusive file lock; a second process opening the
/// same path fails fast instead of corrupting data. [`WhitelistStore::close`]
/// consumes the store, so writing after close is not representable.
pub struct WhitelistStore {
    db: Database,
    batches: u64,
}

impl WhitelistStore {
    /// Open the store at `path`, creating it if missing. Existing data is
    /// kept and appended to.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)?;
        let txn = db.begin_write()?;
        {
            txn.open_table(WHITELIST_TABLE)?;
            txn.open_table(SOURCES_TABLE)?;
        }
        txn.commit()?;
        info!("Connected to store {}", path.display());
        Ok(Self { db, batches: 0 })
    }

    /// Write a batch of (hash triple, record) entries in one transaction.
    ///
    /// Each of an entry's three digests is keyed independently:
    /// - absent key: the record is inserted (counts as processed);
    /// - present key, `replace` false: the stored record wins (processed,
    ///   duplicate);
    /// - present key, `replace` true: the new record overwrites (processed,
    ///   duplicate, added).
    pub fn batch_write(
        &mut self,
        entries: &[(HashTriple, WhitelistRecord)],
        replace: bool,
    ) -> Result<WriteStats> {
        debug!("Batch write of {} entries", entries.len());
        let mut stats = WriteStats::default();
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(WHITELIST_TABLE)?;
            for (hashes, record) in entries {
                let encoded = serde_json::to_vec(record)?;
                for key in hashes.keys() {
                    stats.processed += 1;
                    let present = table.get(key)?.is_some();
                    if present {
                        debug!("{} already present in store", hex::encode(key));
                        stats.duplicates += 1;
                        if !replace {
                            continue;
                        }
                        crate::integrity_event!(
                            "replacing record for {} with {}",
                            hex::encode(key),
                            record.filepath
                        );
                        stats.added += 1;
                    }
                    table.insert(key, encoded.as_slice())?;
                }
            }
        }
        txn.commit()?;
        self.batches += 1;
        Ok(stats)
    }

    /// Look up the record stored under a single digest.
    pub fn get(&self, digest: &[u8]) -> Result<Option<WhitelistRecord>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(WHITELIST_TABLE)?;
        match table.get(digest)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Side-channel lookup: has a source with this checksum been ingested?
    pub fn source_seen(&self, checksum: &[u8]) -> Result<Option<SourceMeta>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(SOURCES_TABLE)?;
        match table.get(checksum)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Record a fully ingested source in the side-channel.
    pub fn record_source(&mut self, checksum: &[u8], meta: &SourceMeta) -> Result<()> {
        let encoded = serde_json::to_vec(meta)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(SOURCES_TABLE)?;
            table.insert(checksum, encoded.as_slice())?;
        }
        txn.commit()?;
        debug!("Source {} recorded", hex::encode(checksum));
        Ok(())
    }

    /// Number of committed write batches in this session.
    pub fn batches_committed(&self) -> u64 {
        self.batches
    }

    /// Flush and release the database. Dropping the store has the same
    /// effect; the explicit form marks the end of a scan session.
    pub fn close(self) -> Result<()> {
        info!("Store closed after {} batches", self.batches);
        drop(self.db);
        Ok(())
    }
}
