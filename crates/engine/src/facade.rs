//! The `StorageEngine` capability contract and the `Db` dispatcher.

use std::path::Path;

use btree::BTreeEngine;
use config::{EngineConfig, EngineType};

use crate::{EngineError, LSMTree};

/// The capability set both backends satisfy. `fuzzy_get` is optional: the
/// default implementation rejects
/// it with [`EngineError::CapabilityUnsupported`], which is exactly what
/// the B-Tree engine wants.
pub trait StorageEngine {
    /// Inserts or overwrites `key` with `value`.
    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), EngineError>;
    /// Looks up `key`; `None` covers both "never written" and "deleted".
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, EngineError>;
    /// Deletes `key` (a tombstone write, not an immediate removal).
    fn delete(&mut self, key: Vec<u8>) -> Result<(), EngineError>;

    /// Levenshtein-filtered scan, LSM only. Default: capability error.
    fn fuzzy_get(
        &self,
        search_key: &[u8],
        max_distance: usize,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, EngineError> {
        let _ = (search_key, max_distance);
        Err(EngineError::CapabilityUnsupported("fuzzy_get"))
    }

    /// Forces an immediate memtable flush, LSM only. Default: capability
    /// error.
    fn force_flush(&mut self) -> Result<(), EngineError> {
        Err(EngineError::CapabilityUnsupported("force_flush"))
    }

    /// Merges every segment into one, LSM only. Default: capability error.
    fn compact(&mut self) -> Result<(), EngineError> {
        Err(EngineError::CapabilityUnsupported("compact"))
    }
}

impl StorageEngine for LSMTree {
    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), EngineError> {
        LSMTree::put(self, key, value)
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, EngineError> {
        LSMTree::get(self, key)
    }

    fn delete(&mut self, key: Vec<u8>) -> Result<(), EngineError> {
        LSMTree::delete(self, key)
    }

    fn fuzzy_get(
        &self,
        search_key: &[u8],
        max_distance: usize,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, EngineError> {
        LSMTree::fuzzy_get(self, search_key, max_distance)
    }

    fn force_flush(&mut self) -> Result<(), EngineError> {
        LSMTree::force_flush(self)
    }

    fn compact(&mut self) -> Result<(), EngineError> {
        LSMTree::compact(self)
    }
}

impl StorageEngine for BTreeEngine {
    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), EngineError> {
        Ok(BTreeEngine::put(self, key, value)?)
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, EngineError> {
        Ok(BTreeEngine::get(self, key).map(<[u8]>::to_vec))
    }

    fn delete(&mut self, key: Vec<u8>) -> Result<(), EngineError> {
        Ok(BTreeEngine::delete(self, key)?)
    }
}

/// Selects and wraps one of the two backends behind [`StorageEngine`].
///
/// Construction picks the engine by `config.engine_type`; every operation
/// after that dispatches to whichever variant was opened. `fuzzy_get`
/// against a `Db::BTree` surfaces [`EngineError::CapabilityUnsupported`]
/// rather than panicking or silently returning an empty list.
pub enum Db {
    BTree(BTreeEngine),
    Lsm(LSMTree),
}

impl Db {
    /// Opens the engine named by `config.engine_type`, rooted at `dir`.
    pub fn open<P: AsRef<Path>>(dir: P, config: &EngineConfig) -> Result<Self, EngineError> {
        let dir = dir.as_ref();
        let db = match config.engine_type {
            EngineType::BTree => {
                Db::BTree(BTreeEngine::open(dir, config.btree_min_degree, config.wal_sync)?)
            }
            EngineType::LsmTree => Db::Lsm(LSMTree::open(dir, config)?),
        };
        tracing::info!(engine_type = %config.engine_type, dir = %dir.display(), "opened Db");
        Ok(db)
    }

    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), EngineError> {
        match self {
            Db::BTree(e) => StorageEngine::put(e, key, value),
            Db::Lsm(e) => StorageEngine::put(e, key, value),
        }
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, EngineError> {
        match self {
            Db::BTree(e) => StorageEngine::get(e, key),
            Db::Lsm(e) => StorageEngine::get(e, key),
        }
    }

    pub fn delete(&mut self, key: Vec<u8>) -> Result<(), EngineError> {
        match self {
            Db::BTree(e) => StorageEngine::delete(e, key),
            Db::Lsm(e) => StorageEngine::delete(e, key),
        }
    }

    /// Rejected with [`EngineError::CapabilityUnsupported`] on `Db::BTree`.
    pub fn fuzzy_get(
        &self,
        search_key: &[u8],
        max_distance: usize,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, EngineError> {
        match self {
            Db::BTree(e) => StorageEngine::fuzzy_get(e, search_key, max_distance),
            Db::Lsm(e) => StorageEngine::fuzzy_get(e, search_key, max_distance),
        }
    }

    /// Rejected with [`EngineError::CapabilityUnsupported`] on `Db::BTree`.
    pub fn force_flush(&mut self) -> Result<(), EngineError> {
        match self {
            Db::BTree(e) => StorageEngine::force_flush(e),
            Db::Lsm(e) => StorageEngine::force_flush(e),
        }
    }

    /// Rejected with [`EngineError::CapabilityUnsupported`] on `Db::BTree`.
    pub fn compact(&mut self) -> Result<(), EngineError> {
        match self {
            Db::BTree(e) => StorageEngine::compact(e),
            Db::Lsm(e) => StorageEngine::compact(e),
        }
    }

    /// A human-readable one-line summary for the CLI's `STATS` command.
    pub fn stats(&self) -> String {
        match self {
            Db::BTree(e) => format!("btree engine: {} keys", e.len()),
            Db::Lsm(e) => format!("{e:?}"),
        }
    }

    /// Closes the underlying engine, flushing a non-empty memtable first
    /// (LSM) or snapshotting and truncating the WAL (B-Tree).
    pub fn close(self) -> Result<(), EngineError> {
        tracing::info!("closing Db");
        match self {
            Db::BTree(e) => Ok(e.close()?),
            Db::Lsm(e) => e.close(),
        }
    }
}

