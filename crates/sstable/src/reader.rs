use anyhow::{bail, Context, Result};
use bloom::BloomFilter;
use byteorder::{LittleEndian, ReadBytesExt};
use memtable::ValueEntry;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::format::{
    decode_record, generation_from_stem, stem_for_generation, DATA_HEADER_LEN, DATA_MAGIC,
    INDEX_MAGIC, MAX_KEY_BYTES,
};

/// Opens a segment (three sidecar files sharing a `segment-<generation>`
/// stem) for point lookups and full-scan iteration.
///
/// [`open`](SSTableReader::open) loads the sparse index and the bloom filter
/// fully into memory; the data file itself is left on disk and accessed by
/// seek. A persistent file handle is kept for point lookups, guarded by a
/// `Mutex` so `get` can be called through a shared `&self`.
pub struct SSTableReader {
    dir: PathBuf,
    generation: u64,
    /// Sparse index: one `(key, data-file offset)` pair per `stride` data
    /// records, sorted ascending by key.
    index: Vec<(Vec<u8>, u64)>,
    bloom: BloomFilter,
    file: Mutex<BufReader<File>>,
}

impl SSTableReader {
    /// Opens the segment of generation `generation` inside `dir`.
    ///
    /// # Errors
    ///
    /// A missing sidecar or a checksum/format mismatch is fatal: this
    /// segment is unusable and `open` returns an error rather than silently
    /// dropping it.
    pub fn open(dir: &Path, generation: u64) -> Result<Self> {
        let stem = stem_for_generation(generation);
        let data_path = dir.join(format!("{stem}.data"));
        let index_path = dir.join(format!("{stem}.index"));
        let bloom_path = dir.join(format!("{stem}.bloom"));

        let mut data_file =
            File::open(&data_path).with_context(|| format!("opening {}", data_path.display()))?;
        let magic = data_file.read_u32::<LittleEndian>().context("reading data magic")?;
        if magic != DATA_MAGIC {
            bail!("corrupt segment {stem}: bad data file magic");
        }

        let index_file = File::open(&index_path)
            .with_context(|| format!("opening {}", index_path.display()))?;
        let mut index_reader = BufReader::new(index_file);
        let index = read_index(&mut index_reader)
            .with_context(|| format!("reading index for segment {stem}"))?;

        let bloom_file = File::open(&bloom_path)
            .with_context(|| format!("opening {}", bloom_path.display()))?;
        let mut bloom_reader = BufReader::new(bloom_file);
        let bloom = BloomFilter::read_from(&mut bloom_reader)
            .with_context(|| format!("reading bloom filter for segment {stem}"))?;

        Ok(Self {
            dir: dir.to_path_buf(),
            generation,
            index,
            bloom,
            file: Mutex::new(BufReader::new(data_file)),
        })
    }

    /// Returns the generation number embedded in this segment's filenames.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Point lookup for a single key.
    ///
    /// 1. Bloom filter check — a negative result means the key is
    ///    **definitely absent**, short-circuiting without touching disk.
    /// 2. Binary search the sparse index for the greatest indexed key `<=`
    ///    `key`, seek there (or to the start of the data file if `key` is
    ///    smaller than every indexed key).
    /// 3. Scan forward, decoding records, until the key matches (return it —
    ///    it may be a tombstone, left for the caller to interpret), the
    ///    decoded key exceeds `key` (absent), or EOF (absent).
    pub fn get(&self, key: &[u8]) -> Result<Option<ValueEntry>> {
        if !self.bloom.may_contain(key) {
            return Ok(None);
        }

        let start_offset = match self.index.partition_point(|(k, _)| k.as_slice() <= key) {
            0 => DATA_HEADER_LEN,
            i => self.index[i - 1].1,
        };

        let mut f = self
            .file
            .lock()
            .map_err(|e| anyhow::anyhow!("lock poisoned: {e}"))?;
        f.seek(SeekFrom::Start(start_offset))?;

        loop {
            match decode_record(&mut *f)? {
                None => return Ok(None),
                Some((k, seq, value)) => {
                    if k.as_slice() == key {
                        return Ok(Some(ValueEntry { seq, value }));
                    }
                    if k.as_slice() > key {
                        return Ok(None);
                    }
                }
            }
        }
    }

    /// Returns a fresh, lazy iterator over every `(key, seq, value)` record
    /// in ascending key order, reading the data file from its own file
    /// handle independent of `get`'s. Used by compaction and fuzzy search so
    /// memory stays bounded to one record at a time.
    pub fn iter(&self) -> Result<SSTableIter> {
        let stem = stem_for_generation(self.generation);
        let data_path = self.dir.join(format!("{stem}.data"));
        let mut file = File::open(&data_path)?;
        let magic = file.read_u32::<LittleEndian>()?;
        if magic != DATA_MAGIC {
            bail!("corrupt segment {stem}: bad data file magic");
        }
        Ok(SSTableIter {
            reader: BufReader::new(file),
        })
    }

    /// Returns the number of sparse index entries loaded (not the true
    /// record count — this is the stride-sampled index, not a full count).
    #[must_use]
    pub fn sparse_index_len(&self) -> usize {
        self.index.len()
    }
}

fn read_index<R: Read>(r: &mut R) -> Result<Vec<(Vec<u8>, u64)>> {
    let magic = r.read_u32::<LittleEndian>().context("reading index magic")?;
    if magic != INDEX_MAGIC {
        bail!("bad index file magic");
    }
    let _stride = r.read_u32::<LittleEndian>().context("reading index stride")?;

    let mut entries = Vec::new();
    loop {
        let key_len = match r.read_u32::<LittleEndian>() {
            Ok(v) => v as usize,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        };
        if key_len > MAX_KEY_BYTES {
            bail!("corrupt index: key_len {key_len} exceeds cap");
        }
        let mut key = vec![0u8; key_len];
        r.read_exact(&mut key).context("reading index key")?;
        let offset = r.read_u64::<LittleEndian>().context("reading index offset")?;
        entries.push((key, offset));
    }
    Ok(entries)
}

/// Lazy sequential iterator over a segment's data file.
pub struct SSTableIter {
    reader: BufReader<File>,
}

impl Iterator for SSTableIter {
    type Item = Result<(Vec<u8>, u64, Option<Vec<u8>>)>;

    fn next(&mut self) -> Option<Self::Item> {
        decode_record(&mut self.reader).transpose()
    }
}

/// Parses the generation embedded in a segment's data-file name, if any.
#[must_use]
pub fn generation_from_data_filename(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(".data")?;
    generation_from_stem(stem)
}

#[cfg(test)]
#[path = "tests/reader_tests.rs"]
mod tests;
