//! Write path: `put()`, `delete()`, `force_flush()`, and the internal
//! `flush()`.
//!
//! Every mutation is appended to the memtable WAL (if configured) before it
//! touches the in-memory memtable. When the memtable's entry count reaches
//! `memtable_threshold`, it is flushed to a new immutable segment.

use sstable::{SSTableWriter, WriteOptions};
use wal::WalRecord;

use crate::{EngineError, LSMTree};

impl LSMTree {
    /// Inserts `(key, value)` into the memtable.
    ///
    /// Appends to the memtable WAL first when one is configured, then
    /// applies the write. Triggers a flush once the memtable reaches
    /// `memtable_threshold` entries.
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), EngineError> {
        self.seq += 1;
        let seq = self.seq;
        if let Some(wal) = self.wal.as_mut() {
            wal.append(&WalRecord::Put {
                seq,
                key: key.clone(),
                value: value.clone(),
            })?;
        }
        self.mem.put(key, value, seq);
        if self.mem.len() >= self.memtable_threshold {
            self.flush()?;
        }
        Ok(())
    }

    /// Deletes `key` by writing a tombstone. Always a write — it never
    /// probes segments.
    pub fn delete(&mut self, key: Vec<u8>) -> Result<(), EngineError> {
        self.seq += 1;
        let seq = self.seq;
        if let Some(wal) = self.wal.as_mut() {
            wal.append(&WalRecord::Del {
                seq,
                key: key.clone(),
            })?;
        }
        self.mem.delete(key, seq);
        if self.mem.len() >= self.memtable_threshold {
            self.flush()?;
        }
        Ok(())
    }

    /// Flushes the memtable to a new segment regardless of its current size.
    /// A no-op if the memtable is empty.
    pub fn force_flush(&mut self) -> Result<(), EngineError> {
        if self.mem.is_empty() {
            return Ok(());
        }
        self.flush()
    }

    /// Internal flush: write the memtable to a new segment, append it to the
    /// segment list, truncate the memtable WAL, and reset the memtable.
    ///
    /// 1. Write a new segment at `next_generation` via
    ///    [`SSTableWriter::write_from_memtable`] (atomic temp + rename).
    /// 2. Append the opened reader to `segments` (newest goes last).
    /// 3. Truncate the memtable WAL (if any) and reopen it for append.
    /// 4. Clear the memtable.
    pub(crate) fn flush(&mut self) -> Result<(), EngineError> {
        let generation = self.next_generation;
        let opts = WriteOptions {
            bloom_fpr: self.bloom_fpr,
            sparse_stride: self.sparse_stride,
        };
        let reader = SSTableWriter::write_from_memtable(&self.dir, generation, &self.mem, opts)
            .map_err(EngineError::Segment)?;
        self.next_generation += 1;
        self.segments.push(reader);
        self.mem.clear();

        if self.wal.is_some() {
            std::fs::File::create(&self.wal_path)?;
            self.wal = Some(wal::WalWriter::create(&self.wal_path, self.wal_sync)?);
        }

        tracing::debug!(generation, segment_count = self.segments.len(), "flushed memtable");
        Ok(())
    }
}
