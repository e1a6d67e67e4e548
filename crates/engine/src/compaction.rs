//! Compaction: merges every committed segment into one new segment.
//!
//! Uses [`sstable::MergeIterator`] (itself built on [`minheap::MinHeap`]) to
//! stream all segments in sorted, newest-wins order. Tombstones are dropped
//! unconditionally — a full compaction has no older segment left to shadow,
//! so there is nothing left for a tombstone to protect.

use sstable::{remove_segment_files, MergeIterator, SSTableWriter, WriteOptions};

use crate::{EngineError, LSMTree};

impl LSMTree {
    /// Compacts every segment in `self.segments` into a single new one.
    ///
    /// A no-op when there is nothing to gain: zero or one segment.
    /// Otherwise:
    /// 1. Feeds every segment (newest first) into a [`MergeIterator`].
    /// 2. Streams `(key, ValueEntry)` pairs out of it, dropping tombstones,
    ///    into [`SSTableWriter::write_from_iterator`] at a fresh generation
    ///    newer than every input.
    /// 3. Commits the new segment, then deletes the old segments' files.
    /// 4. Replaces `self.segments` with the single new reader.
    ///
    /// If every input key turns out to be a tombstone, the merged output is
    /// empty; the old segments are still deleted and the segment list ends
    /// up empty (no new segment is written — segment files are never
    /// empty by construction).
    pub fn compact(&mut self) -> Result<(), EngineError> {
        if self.segments.len() <= 1 {
            return Ok(());
        }

        // Take ownership and reverse in place: MergeIterator wants its
        // sources newest-first so ties break toward the newer segment,
        // while `self.segments` is stored oldest-first.
        let mut newest_first = std::mem::take(&mut self.segments);
        newest_first.reverse();
        let old_generations: Vec<u64> = newest_first.iter().map(|s| s.generation()).collect();

        let mut merge = MergeIterator::new(&newest_first).map_err(EngineError::Segment)?;

        let estimated_count: usize = newest_first.len() * self.memtable_threshold;
        let generation = self.next_generation;
        let opts = WriteOptions {
            bloom_fpr: self.bloom_fpr,
            sparse_stride: self.sparse_stride,
        };

        let mut merge_error = None;
        let live_entries = std::iter::from_fn(|| loop {
            match merge.next_entry() {
                Ok(Some((key, entry))) => {
                    if entry.value.is_none() {
                        continue;
                    }
                    return Some((key, entry));
                }
                Ok(None) => return None,
                Err(e) => {
                    merge_error = Some(e);
                    return None;
                }
            }
        });

        let write_result = SSTableWriter::write_from_iterator(
            &self.dir,
            generation,
            estimated_count.max(1),
            live_entries,
            opts,
        );

        if let Some(e) = merge_error {
            return Err(EngineError::Segment(e));
        }

        // `write_from_iterator` returns `Ok(None)` when every input key was a
        // tombstone and the merged stream was empty — a structural signal,
        // not an error, so no new segment is written in that case.
        let new_segment = write_result.map_err(EngineError::Segment)?;

        // Drop readers before unlinking their files so no handle is dangling
        // on platforms that refuse to remove an open file.
        drop(newest_first);
        for generation in old_generations {
            remove_segment_files(&self.dir, generation).map_err(EngineError::Segment)?;
        }

        if let Some(reader) = new_segment {
            self.next_generation += 1;
            tracing::debug!(generation, "compacted segments");
            self.segments.push(reader);
        }

        Ok(())
    }
}
