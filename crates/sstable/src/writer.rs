use anyhow::{bail, Context, Result};
use bloom::BloomFilter;
use byteorder::{LittleEndian, WriteBytesExt};
use memtable::{Memtable, ValueEntry};
use std::fs::{rename, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::format::{
    encode_record, stem_for_generation, DATA_MAGIC, INDEX_MAGIC,
};
use crate::reader::SSTableReader;

/// Default bloom filter false-positive rate (1%).
const DEFAULT_BLOOM_FPR: f64 = 0.01;
/// Default sparse index sampling stride: one entry recorded every N records.
const DEFAULT_SPARSE_STRIDE: usize = 100;

/// Flushes a sorted stream of entries to a new, immutable on-disk segment.
///
/// The writer itself is stateless: all work happens in
/// [`write_from_iterator`](SSTableWriter::write_from_iterator). A segment is
/// three sidecar files sharing a `segment-<generation>` stem — `.data`,
/// `.index`, `.bloom` — written to `*.tmp` paths, fsynced, and atomically
/// renamed into place so a crash mid-write leaves no partially-observable
/// segment.
pub struct SSTableWriter;

/// Tuning knobs for a single segment write, mirroring the engine's
/// configuration (`bloom_false_positive_rate`, `sparse_index_stride`).
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    pub bloom_fpr: f64,
    pub sparse_stride: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            bloom_fpr: DEFAULT_BLOOM_FPR,
            sparse_stride: DEFAULT_SPARSE_STRIDE,
        }
    }
}

impl SSTableWriter {
    /// Flushes `mem`'s contents to a new segment of the given `generation`
    /// inside `dir`, opening and returning a reader for it.
    pub fn write_from_memtable(
        dir: &Path,
        generation: u64,
        mem: &Memtable,
        opts: WriteOptions,
    ) -> Result<SSTableReader> {
        if mem.is_empty() {
            bail!("refusing to write an empty segment (empty memtable)");
        }
        let count = mem.len();
        let iter = mem.iter().map(|(k, v)| (k.to_vec(), v.clone()));
        // The memtable is non-empty, so the iterator always yields at least
        // one entry — `write_from_iterator` cannot return `Ok(None)` here.
        match Self::write_from_iterator(dir, generation, count, iter, opts)? {
            Some(reader) => Ok(reader),
            None => unreachable!("non-empty memtable produced an empty iterator"),
        }
    }

    /// Writes a segment from any iterator of `(key, ValueEntry)` pairs in
    /// ascending key order — the compaction entry point. Entries are streamed
    /// straight to disk, so memory use is proportional to the bloom filter
    /// and sparse index, not to the data itself.
    ///
    /// Returns `Ok(None)` if `iter` yields zero entries — a structural signal
    /// callers can match on, distinct from a genuine write failure — rather
    /// than writing out a segment with no records.
    ///
    /// # Errors
    ///
    /// Returns an error if keys are not strictly increasing (an
    /// `InvariantViolation` per the segment-sortedness guarantee), or on I/O
    /// failure.
    pub fn write_from_iterator<I>(
        dir: &Path,
        generation: u64,
        expected_count: usize,
        iter: I,
        opts: WriteOptions,
    ) -> Result<Option<SSTableReader>>
    where
        I: Iterator<Item = (Vec<u8>, ValueEntry)>,
    {
        std::fs::create_dir_all(dir)?;
        let stem = stem_for_generation(generation);
        let data_tmp = dir.join(format!("{stem}.data.tmp"));
        let index_tmp = dir.join(format!("{stem}.index.tmp"));
        let bloom_tmp = dir.join(format!("{stem}.bloom.tmp"));
        let data_path = dir.join(format!("{stem}.data"));
        let index_path = dir.join(format!("{stem}.index"));
        let bloom_path = dir.join(format!("{stem}.bloom"));

        let mut bloom = BloomFilter::new(expected_count.max(1), opts.bloom_fpr);
        let mut index: Vec<(Vec<u8>, u64)> = Vec::new();
        let mut last_key: Option<Vec<u8>> = None;
        let mut count: usize = 0;

        {
            let data_file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&data_tmp)?;
            let mut data = BufWriter::new(data_file);
            data.write_u32::<LittleEndian>(DATA_MAGIC)?;
            let mut offset: u64 = crate::format::DATA_HEADER_LEN;

            let mut record_buf = Vec::with_capacity(256);
            for (key, entry) in iter {
                if let Some(ref prev) = last_key {
                    if key <= *prev {
                        bail!(
                            "invariant violation: segment keys must be strictly increasing \
                             (got a key <= the previous one during flush)"
                        );
                    }
                }

                record_buf.clear();
                encode_record(&mut record_buf, &key, entry.seq, entry.value.as_deref())
                    .context("encoding segment record")?;
                data.write_all(&record_buf)?;

                bloom.insert(&key);
                if count % opts.sparse_stride.max(1) == 0 {
                    index.push((key.clone(), offset));
                }

                offset += record_buf.len() as u64;
                count += 1;
                last_key = Some(key);
            }

            if count == 0 {
                drop(data);
                let _ = std::fs::remove_file(&data_tmp);
                return Ok(None);
            }

            data.flush()?;
            data.into_inner()?.sync_all()?;
        }

        {
            let index_file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&index_tmp)?;
            let mut w = BufWriter::new(index_file);
            w.write_u32::<LittleEndian>(INDEX_MAGIC)?;
            w.write_u32::<LittleEndian>(opts.sparse_stride.max(1) as u32)?;
            for (key, data_offset) in &index {
                w.write_u32::<LittleEndian>(key.len() as u32)?;
                w.write_all(key)?;
                w.write_u64::<LittleEndian>(*data_offset)?;
            }
            w.flush()?;
            w.into_inner()?.sync_all()?;
        }

        {
            let bloom_file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&bloom_tmp)?;
            let mut w = BufWriter::new(bloom_file);
            bloom.write_to(&mut w)?;
            w.flush()?;
            w.into_inner()?.sync_all()?;
        }

        // Commit data first, then the sidecars — if a crash happens between
        // these renames, `open()` is expected to fail loudly on the missing
        // sidecar rather than silently serve a half-committed segment.
        rename(&data_tmp, &data_path)?;
        rename(&index_tmp, &index_path)?;
        rename(&bloom_tmp, &bloom_path)?;
        fsync_dir(dir);

        SSTableReader::open(dir, generation).map(Some)
    }
}

fn fsync_dir(dir: &Path) {
    if let Ok(f) = File::open(dir) {
        let _ = f.sync_all();
    }
}

/// Removes a generation's three files from `dir`, tolerating already-missing
/// files (e.g. a retried cleanup after a partial delete).
pub fn remove_segment_files(dir: &Path, generation: u64) -> Result<()> {
    let stem = stem_for_generation(generation);
    for ext in ["data", "index", "bloom"] {
        let path: PathBuf = dir.join(format!("{stem}.{ext}"));
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/writer_tests.rs"]
mod tests;
