//! # Engine — the LSM-Tree orchestrator and the `Db` facade
//!
//! Ties together [`memtable`], [`wal`], and [`sstable`] into the
//! Log-Structured Merge-Tree backend, and wraps both it and
//! [`btree::BTreeEngine`] behind one [`StorageEngine`] contract via [`Db`].
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   |
//!   v
//! ┌───────────────────────────────────────────────┐
//! │                  LSMTree                       │
//! │                                               │
//! │ write.rs → WAL append → Memtable insert       │
//! │              |                                │
//! │              |  (memtable.len() >= threshold?)│
//! │              v                                │
//! │           flush() → new segment (generation g)│
//! │                                               │
//! │ read.rs  → Memtable → segments, newest first  │
//! │            (first match wins; tombstone hides)│
//! │                                               │
//! │ compaction.rs → k-way merge → one new segment │
//! │ fuzzy.rs       → full scan, Levenshtein filter│
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Module responsibilities
//!
//! | Module | Purpose |
//! |---|---|
//! | [`lib`] | `LSMTree` struct, constructor, accessors, `Drop` |
//! | [`recovery`] | segment directory scan, memtable WAL replay, tmp cleanup |
//! | [`write`] | `put()`, `delete()`, `force_flush()`, internal `flush()` |
//! | [`read`] | `get()` |
//! | [`compaction`] | `compact()`: streaming k-way merge + tombstone GC |
//! | [`fuzzy`] | `fuzzy_get()`: Levenshtein scan across memtable + segments |
//! | [`facade`] | [`StorageEngine`] trait and the [`Db`] dispatcher |
//!
//! ## Segment list
//!
//! Stored oldest-to-newest, so the read path walks it with `.iter().rev()`
//! to get newest-first recency semantics. Generations embedded in
//! filenames (`segment-<g>`)
//! let `LSMTree::open` recover this order from a directory listing alone.
//!
//! ## Crash safety
//!
//! Every write is appended to the memtable WAL (if configured) **before**
//! the memtable update. The WAL is truncated only **after** a successful
//! flush. Segments are written atomically via temp file + rename — see
//! [`sstable::SSTableWriter`].
mod compaction;
mod error;
mod facade;
mod fuzzy;
mod read;
mod recovery;
mod write;

pub use error::EngineError;
pub use facade::{Db, StorageEngine};

use config::EngineConfig;
use memtable::Memtable;
use sstable::SSTableReader;
use std::path::{Path, PathBuf};
use wal::WalWriter;

const MEMTABLE_WAL_FILE: &str = "memtable.wal";

/// The LSM-Tree backend: a memtable, an ordered list of on-disk segments,
/// and the flush/compaction/fuzzy-search machinery over them.
pub struct LSMTree {
    pub(crate) mem: Memtable,
    /// Segments ordered oldest to newest; the read path walks this in
    /// reverse.
    pub(crate) segments: Vec<SSTableReader>,
    pub(crate) dir: PathBuf,
    pub(crate) next_generation: u64,
    pub(crate) seq: u64,
    pub(crate) memtable_threshold: usize,
    pub(crate) bloom_fpr: f64,
    pub(crate) sparse_stride: usize,
    /// `Some` when `EngineConfig::lsm_wal` is enabled; `None` means an
    /// unflushed memtable is lost on crash, an explicit documented property.
    pub(crate) wal: Option<WalWriter>,
    pub(crate) wal_path: PathBuf,
    pub(crate) wal_sync: bool,
}

impl std::fmt::Debug for LSMTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LSMTree")
            .field("dir", &self.dir)
            .field("seq", &self.seq)
            .field("memtable_entries", &self.mem.len())
            .field("memtable_threshold", &self.memtable_threshold)
            .field("segment_count", &self.segments.len())
            .field("next_generation", &self.next_generation)
            .field("has_memtable_wal", &self.wal.is_some())
            .finish()
    }
}

impl LSMTree {
    /// Opens (or creates) an LSM-Tree rooted at `dir`, driven by `config`.
    ///
    /// 1. Creates `dir` if absent and cleans up any leftover `*.tmp` files
    ///    from an interrupted flush or compaction.
    /// 2. Enumerates existing segment stems, sorts by embedded generation,
    ///    and opens each one, oldest first.
    /// 3. If `config.lsm_wal`, replays the memtable WAL (if any) into a
    ///    fresh memtable and reopens the WAL for append; otherwise starts
    ///    with an empty memtable and no WAL.
    pub fn open<P: AsRef<Path>>(dir: P, config: &EngineConfig) -> Result<Self, EngineError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        recovery::cleanup_tmp_files(&dir);

        let segments = recovery::load_segments(&dir)?;
        let next_generation = segments
            .last()
            .map(|s| s.generation() + 1)
            .unwrap_or(0);

        let wal_path = dir.join(MEMTABLE_WAL_FILE);
        let mut mem = Memtable::with_min_degree(config.btree_min_degree);
        let mut seq = 0u64;
        let wal = if config.lsm_wal {
            seq = recovery::replay_memtable_wal(&wal_path, &mut mem)?;
            Some(WalWriter::create(&wal_path, config.wal_sync)?)
        } else {
            None
        };

        let max_segment_seq = segments.iter().map(recovery::segment_max_seq).max().unwrap_or(0);
        seq = seq.max(max_segment_seq);

        tracing::info!(
            dir = %dir.display(),
            segments = segments.len(),
            next_generation,
            "opened LSMTree",
        );

        Ok(Self {
            mem,
            segments,
            dir,
            next_generation,
            seq,
            memtable_threshold: config.memtable_threshold,
            bloom_fpr: config.bloom_false_positive_rate,
            sparse_stride: config.sparse_index_stride,
            wal,
            wal_path,
            wal_sync: config.wal_sync,
        })
    }

    /// Flushes a non-empty memtable, then releases file handles. A `Db`
    /// wrapping this tree calls `close` explicitly; `Drop` also attempts a
    /// best-effort flush as a last resort.
    pub fn close(mut self) -> Result<(), EngineError> {
        if !self.mem.is_empty() {
            self.flush()?;
        }
        tracing::info!(dir = %self.dir.display(), "closed LSMTree");
        Ok(())
    }

    /// Number of committed segments currently backing reads.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of live entries (including tombstones) in the memtable.
    #[must_use]
    pub fn memtable_len(&self) -> usize {
        self.mem.len()
    }
}

/// Best-effort flush on drop — mirrors the B-Tree engine's `close`, but
/// cannot propagate an error, so failures are silently dropped. Any data
/// that fails to flush here is still safe in the memtable WAL (if enabled)
/// and will be recovered on the next `open`.
impl Drop for LSMTree {
    fn drop(&mut self) {
        if !self.mem.is_empty() {
            let _ = self.flush();
        }
    }
}

#[cfg(test)]
mod tests;
