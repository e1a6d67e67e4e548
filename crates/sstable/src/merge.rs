//! Merge iterator over multiple [`SSTableReader`]s.
//!
//! Produces `(key, ValueEntry)` pairs in ascending key order. When the same
//! key appears in multiple segments, only the entry from the **newest**
//! segment is emitted — ties are broken by rank, not by sequence number,
//! matching compaction's "newest segment wins" rule rather than a raw
//! highest-seq comparison.
//!
//! Each source is read lazily through its own [`crate::reader::SSTableIter`],
//! so merging holds at most one pending record per source in memory at a
//! time regardless of segment size.

use anyhow::Result;
use memtable::ValueEntry;
use minheap::MinHeap;
use std::cmp::Ordering;

use crate::reader::SSTableIter;
use crate::SSTableReader;

struct HeapItem {
    key: Vec<u8>,
    seq: u64,
    value: Option<Vec<u8>>,
    /// Lower rank means a newer segment; ties on `key` are broken in favor
    /// of the lowest rank.
    rank: usize,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.rank == other.rank
    }
}

impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key).then_with(|| self.rank.cmp(&other.rank))
    }
}

/// Merges multiple segments into a single sorted stream of `(key, ValueEntry)`,
/// keeping only the newest segment's record for each key.
///
/// `readers` must be given **newest first** — rank `0` is the newest segment
/// and wins ties, matching compaction's newest-segment-wins rule (spec
/// §4.7, step 3).
pub struct MergeIterator {
    sources: Vec<SSTableIter>,
    heap: MinHeap<HeapItem>,
}

impl MergeIterator {
    /// Opens a fresh iterator over each of `readers` (newest first) and
    /// seeds the heap with each source's first record.
    pub fn new(readers: &[SSTableReader]) -> Result<Self> {
        let mut sources = Vec::with_capacity(readers.len());
        for reader in readers {
            sources.push(reader.iter()?);
        }
        let heap = MinHeap::with_capacity(sources.len());
        let mut merger = Self { sources, heap };
        for rank in 0..merger.sources.len() {
            merger.pull(rank)?;
        }
        Ok(merger)
    }

    fn pull(&mut self, rank: usize) -> Result<()> {
        if let Some(item) = self.sources[rank].next() {
            let (key, seq, value) = item?;
            self.heap.push(HeapItem { key, seq, value, rank });
        }
        Ok(())
    }

    /// Returns the next `(key, ValueEntry)` in ascending key order, or `None`
    /// once every source is exhausted. Older duplicates of the winning key
    /// are drained and discarded (their sources are advanced so the merge
    /// keeps making progress).
    pub fn next_entry(&mut self) -> Result<Option<(Vec<u8>, ValueEntry)>> {
        let winner = match self.heap.pop() {
            Some(item) => item,
            None => return Ok(None),
        };
        self.pull(winner.rank)?;

        while let Some(peek) = self.heap.peek() {
            if peek.key != winner.key {
                break;
            }
            let dup = self.heap.pop().expect("peeked Some");
            self.pull(dup.rank)?;
        }

        Ok(Some((
            winner.key,
            ValueEntry {
                seq: winner.seq,
                value: winner.value,
            },
        )))
    }

    /// Collects all remaining entries into a `Vec`. Intended for tests and
    /// small fixtures; compaction drives `next_entry` directly to keep
    /// memory bounded.
    pub fn collect_all(&mut self) -> Result<Vec<(Vec<u8>, ValueEntry)>> {
        let mut result = Vec::new();
        while let Some(pair) = self.next_entry()? {
            result.push(pair);
        }
        Ok(result)
    }
}

#[cfg(test)]
#[path = "tests/merge_tests.rs"]
mod tests;
