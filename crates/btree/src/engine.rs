//! `BTreeEngine` — a WAL-backed durable store built on [`crate::BTree`].
//!
//! Every `put`/`delete` is appended to the write-ahead log before it touches
//! the tree, exactly as the LSM side does for its memtable. Unlike the LSM,
//! there is nothing to flush to a sorted segment: `close` instead writes a
//! snapshot of every live key (tombstones are simply omitted, since the tree
//! never physically removes a key) and truncates the WAL. On the next
//! `open`, the snapshot — if any — is loaded first, then the WAL is replayed
//! on top to pick up whatever was written since the last clean close.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use wal::{WalError, WalReader, WalRecord, WalWriter};

use crate::BTree;

/// Errors specific to the standalone B-Tree engine's durability layer.
#[derive(Debug, Error)]
pub enum BTreeError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The write-ahead log or snapshot file failed to replay.
    #[error("wal error: {0}")]
    Wal(#[from] WalError),
}

const SNAPSHOT_FILE: &str = "snapshot";
const SNAPSHOT_TMP_FILE: &str = "snapshot.tmp";
const WAL_FILE: &str = "wal.log";

/// A standalone key-value store: a single [`BTree`] durable across restarts
/// via a write-ahead log and periodic snapshotting on `close`.
pub struct BTreeEngine {
    tree: BTree<Vec<u8>, Option<Vec<u8>>>,
    dir: PathBuf,
    wal: WalWriter,
    wal_sync: bool,
    seq: u64,
}

impl BTreeEngine {
    /// Opens (or creates) a B-Tree engine rooted at `dir`.
    ///
    /// If a snapshot from a previous clean close exists, it is loaded first;
    /// the WAL (containing only mutations since that snapshot) is replayed
    /// on top of it.
    pub fn open<P: AsRef<Path>>(
        dir: P,
        min_degree: usize,
        wal_sync: bool,
    ) -> Result<Self, BTreeError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut tree = BTree::new(min_degree);
        let mut seq = 0u64;

        let snapshot_path = dir.join(SNAPSHOT_FILE);
        if snapshot_path.exists() {
            let mut reader = WalReader::open(&snapshot_path)?;
            reader.replay(|rec| {
                if let WalRecord::Put { seq: s, key, value } = rec {
                    seq = seq.max(s);
                    tree.insert(key, Some(value));
                }
            })?;
        }

        let wal_path = dir.join(WAL_FILE);
        if wal_path.exists() {
            let mut reader = WalReader::open(&wal_path)?;
            reader.replay(|rec| match rec {
                WalRecord::Put { seq: s, key, value } => {
                    seq = seq.max(s);
                    tree.insert(key, Some(value));
                }
                WalRecord::Del { seq: s, key } => {
                    seq = seq.max(s);
                    tree.insert(key, None);
                }
            })?;
        }

        let wal = WalWriter::create(&wal_path, wal_sync)?;

        Ok(BTreeEngine {
            tree,
            dir,
            wal,
            wal_sync,
            seq,
        })
    }

    /// Appends the write to the WAL, then applies it to the tree.
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), BTreeError> {
        self.seq += 1;
        self.wal.append(&WalRecord::Put {
            seq: self.seq,
            key: key.clone(),
            value: value.clone(),
        })?;
        self.tree.insert(key, Some(value));
        Ok(())
    }

    /// Appends a tombstone to the WAL, then applies it to the tree.
    pub fn delete(&mut self, key: Vec<u8>) -> Result<(), BTreeError> {
        self.seq += 1;
        self.wal.append(&WalRecord::Del {
            seq: self.seq,
            key: key.clone(),
        })?;
        self.tree.insert(key, None);
        Ok(())
    }

    /// Looks up `key`. Returns `None` for both an absent key and a
    /// tombstoned one.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        match self.tree.search(&key.to_vec()) {
            Some(Some(value)) => Some(value.as_slice()),
            _ => None,
        }
    }

    /// Returns every live (non-tombstoned) `(key, value)` pair in ascending
    /// key order.
    #[must_use]
    pub fn scan(&self) -> Vec<(&[u8], &[u8])> {
        self.tree
            .items()
            .into_iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_slice(), v.as_slice())))
            .collect()
    }

    /// Returns the number of entries currently tracked, including
    /// tombstones — mirrors `Memtable::len`'s semantics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Persists a snapshot of every live key, then truncates the WAL.
    ///
    /// Uses the same tmp-file-then-rename discipline the LSM side uses for
    /// segment flushes, so a crash mid-snapshot never corrupts the previous
    /// one.
    pub fn close(mut self) -> Result<(), BTreeError> {
        self.flush_snapshot()?;
        Ok(())
    }

    fn flush_snapshot(&mut self) -> Result<(), BTreeError> {
        let tmp_path = self.dir.join(SNAPSHOT_TMP_FILE);
        let snapshot_path = self.dir.join(SNAPSHOT_FILE);
        {
            let mut writer = WalWriter::create(&tmp_path, true)?;
            for (key, value) in self.tree.items() {
                if let Some(value) = value {
                    writer.append(&WalRecord::Put {
                        seq: 0,
                        key: key.clone(),
                        value: value.clone(),
                    })?;
                }
            }
            writer.sync_to_disk()?;
        }
        fs::rename(&tmp_path, &snapshot_path)?;

        // The old WAL's contents are now fully captured by the snapshot;
        // truncate it by recreating the file empty, then reopen for append.
        let wal_path = self.dir.join(WAL_FILE);
        fs::File::create(&wal_path)?;
        self.wal = WalWriter::create(&wal_path, self.wal_sync)?;
        Ok(())
    }
}
