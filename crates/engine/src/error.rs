//! The engine's error type.
//!
//! `NotFound` is deliberately absent here — an absent key is a distinguished
//! value (`Option::None`), not an error. Only the four genuinely exceptional
//! kinds get a variant.

use thiserror::Error;

/// Errors surfaced by [`crate::LSMTree`], [`btree::BTreeEngine`], and
/// [`crate::Db`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested operation is not part of this engine's capability set
    /// (e.g. `fuzzy_get` on the B-Tree engine).
    #[error("capability unsupported: {0}")]
    CapabilityUnsupported(&'static str),

    /// A filesystem operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The write-ahead log failed to append or replay.
    #[error("wal error: {0}")]
    Wal(#[from] wal::WalError),

    /// The standalone B-Tree engine's durability layer failed.
    #[error("btree engine error: {0}")]
    BTree(#[from] btree::BTreeError),

    /// A segment read, write, or merge failed — includes corruption
    /// (`CorruptionError`) and invariant violations (`InvariantViolation`)
    /// surfaced by the `sstable` crate, which reports both via `anyhow`.
    #[error("segment error: {0}")]
    Segment(#[from] anyhow::Error),
}
