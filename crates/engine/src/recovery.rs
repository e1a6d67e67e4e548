//! Cold-start recovery: segment directory scan and memtable WAL replay.

use memtable::Memtable;
use sstable::SSTableReader;
use std::path::Path;
use wal::{WalReader, WalRecord};

use crate::EngineError;

/// Enumerates `dir` for `segment-<g>.data` files, opens each one, and
/// returns them sorted ascending by generation (oldest first) — the order
/// [`crate::LSMTree`] keeps its segment list in.
///
/// A directory with no segments yet (fresh DB) returns an empty `Vec`, not
/// an error.
pub(crate) fn load_segments(dir: &Path) -> Result<Vec<SSTableReader>, EngineError> {
    let mut generations: Vec<u64> = Vec::new();
    if dir.exists() {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(generation) = sstable::generation_from_data_filename(name) {
                generations.push(generation);
            }
        }
    }
    generations.sort_unstable();

    let mut segments = Vec::with_capacity(generations.len());
    for generation in generations {
        segments.push(SSTableReader::open(dir, generation).map_err(EngineError::Segment)?);
    }
    Ok(segments)
}

/// Replays the memtable WAL at `path` into `mem`, returning the highest
/// sequence number seen. A missing WAL (fresh DB, or `lsm_wal` was off on a
/// previous run) is not an error — it means there is nothing to replay.
pub(crate) fn replay_memtable_wal(path: &Path, mem: &mut Memtable) -> Result<u64, EngineError> {
    if !path.exists() {
        return Ok(0);
    }
    let mut reader = WalReader::open(path)?;
    let mut max_seq = 0u64;
    reader.replay(|rec| match rec {
        WalRecord::Put { seq, key, value } => {
            mem.put(key, value, seq);
            max_seq = max_seq.max(seq);
        }
        WalRecord::Del { seq, key } => {
            mem.delete(key, seq);
            max_seq = max_seq.max(seq);
        }
    })?;
    Ok(max_seq)
}

/// Scans a segment's data file for the highest sequence number recorded in
/// it. Segments carry no footer in this format, so recovering the watermark
/// costs a full scan — acceptable since it only runs once, at `open`.
pub(crate) fn segment_max_seq(reader: &SSTableReader) -> u64 {
    let Ok(iter) = reader.iter() else { return 0 };
    let mut max = 0u64;
    for item in iter {
        if let Ok((_, seq, _)) = item {
            max = max.max(seq);
        }
    }
    max
}

/// Removes any leftover `*.tmp` sidecar files from an interrupted flush or
/// compaction, so a stale temp file is never mistaken for a real segment.
pub(crate) fn cleanup_tmp_files(dir: &Path) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == "tmp").unwrap_or(false) {
                let _ = std::fs::remove_file(&path);
            }
        }
    }
}
