//! # SSTable — Sorted String Table
//!
//! Immutable, on-disk segments for the LSM side of the storage engine.
//!
//! When the in-memory memtable exceeds its size threshold the engine
//! flushes it to disk as a segment. Segments are *write-once, read-many* —
//! once committed they are never modified, only superseded during
//! compaction.
//!
//! ## File layout
//!
//! A segment of generation `g` is three sidecar files sharing the stem
//! `segment-<g>`:
//!
//! ```text
//! segment-<g>.data   sequence of CRC-framed records, sorted ascending by key
//! segment-<g>.index  sparse (key, offset) list, one entry per STRIDE records
//! segment-<g>.bloom  serialized BloomFilter over every key in the segment
//! ```
//!
//! See [`format`] for the exact byte layout of each file.

pub mod format;
mod merge;
mod reader;
mod writer;

pub use format::{generation_from_stem, stem_for_generation};
pub use merge::MergeIterator;
pub use reader::{generation_from_data_filename, SSTableIter, SSTableReader};
pub use writer::{remove_segment_files, SSTableWriter, WriteOptions};
