//! # Config
//!
//! The storage engine's construction-time configuration: which backend to
//! use, where its directory lives, and the handful of tuning knobs each
//! backend recognizes.
//!
//! `EngineConfig` is a plain struct with a `Default` impl matching the
//! defaults in the engine's external interface, and derives `serde::{
//! Serialize, Deserialize}` so it can be loaded from a TOML file or built up
//! from environment variables / CLI flags by the caller.

use serde::{Deserialize, Serialize};

/// Which storage backend a [`EngineConfig`] selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineType {
    /// The durable in-memory B-Tree, backed by a write-ahead log.
    BTree,
    /// The Log-Structured Merge-Tree with on-disk sorted segments.
    LsmTree,
}

impl Default for EngineType {
    fn default() -> Self {
        EngineType::BTree
    }
}

impl std::str::FromStr for EngineType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "btree" => Ok(EngineType::BTree),
            "lsmtree" | "lsm" => Ok(EngineType::LsmTree),
            other => Err(ConfigError::UnknownEngineType(other.to_string())),
        }
    }
}

impl std::fmt::Display for EngineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineType::BTree => write!(f, "btree"),
            EngineType::LsmTree => write!(f, "lsmtree"),
        }
    }
}

/// A construction-time config error: an unrecognized `engine_type` tag or an
/// out-of-range tuning knob.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown engine_type {0:?}, expected \"btree\" or \"lsmtree\"")]
    UnknownEngineType(String),
    #[error("btree_min_degree must be >= 2, got {0}")]
    MinDegreeTooSmall(usize),
    #[error("memtable_threshold must be >= 1, got {0}")]
    MemtableThresholdZero(usize),
    #[error("bloom_false_positive_rate must be in (0, 1), got {0}")]
    BloomRateOutOfRange(f64),
    #[error("sparse_index_stride must be >= 1, got {0}")]
    SparseStrideZero(usize),
}

/// Construction-time configuration for [`engine::Db`](../engine/struct.Db.html).
///
/// Every field has a default matching the external interface's documented
/// defaults; callers typically start from [`EngineConfig::default`] and
/// override only what they need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Which backend to open: `btree` or `lsmtree`.
    pub engine_type: EngineType,
    /// The directory the engine owns exclusively while open.
    pub directory: String,
    /// LSM only: number of entries the memtable may hold before it is
    /// flushed to a new segment.
    pub memtable_threshold: usize,
    /// Minimum degree of the backing B-Tree (both engines).
    pub btree_min_degree: usize,
    /// LSM only: target false-positive rate for each segment's bloom filter.
    pub bloom_false_positive_rate: f64,
    /// LSM only: number of data records between consecutive sparse index
    /// entries.
    pub sparse_index_stride: usize,
    /// Whether every WAL append is followed by an `fsync`. `false` trades
    /// durability latency for throughput.
    pub wal_sync: bool,
    /// LSM only: whether the memtable is backed by its own WAL. When `false`,
    /// unflushed memtable contents are lost on crash (an explicit, documented
    /// engine property, not a default most callers want).
    pub lsm_wal: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_type: EngineType::BTree,
            directory: "data_dir".to_string(),
            memtable_threshold: 1000,
            btree_min_degree: 3,
            bloom_false_positive_rate: 0.01,
            sparse_index_stride: 100,
            wal_sync: true,
            lsm_wal: true,
        }
    }
}

impl EngineConfig {
    /// Checks every tuning knob is in range, independent of `engine_type`
    /// (both engines share the B-Tree degree, only the LSM engine reads the
    /// rest).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.btree_min_degree < 2 {
            return Err(ConfigError::MinDegreeTooSmall(self.btree_min_degree));
        }
        if self.memtable_threshold == 0 {
            return Err(ConfigError::MemtableThresholdZero(self.memtable_threshold));
        }
        if !(0.0 < self.bloom_false_positive_rate && self.bloom_false_positive_rate < 1.0) {
            return Err(ConfigError::BloomRateOutOfRange(self.bloom_false_positive_rate));
        }
        if self.sparse_index_stride == 0 {
            return Err(ConfigError::SparseStrideZero(self.sparse_index_stride));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
