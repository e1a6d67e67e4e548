use crate::*;
use anyhow::Result;
use memtable::Memtable;
use tempfile::tempdir;

fn make_sample_memtable() -> Memtable {
    let mut m = Memtable::new();
    m.put(b"a".to_vec(), b"apple".to_vec(), 1);
    m.put(b"b".to_vec(), b"banana".to_vec(), 2);
    m.put(b"c".to_vec(), b"".to_vec(), 3); // present but empty value
    m.delete(b"d".to_vec(), 4); // tombstone
    m
}

#[test]
fn write_empty_memtable_is_rejected() {
    let dir = tempdir().unwrap();
    let mem = Memtable::new();
    let result = SSTableWriter::write_from_memtable(dir.path(), 0, &mem, WriteOptions::default());
    assert!(result.is_err(), "writing an empty memtable should fail");
    assert!(
        result.unwrap_err().to_string().contains("empty"),
        "error message should mention 'empty'"
    );
    assert!(!dir.path().join("segment-0.data").exists());
}

#[test]
fn write_produces_three_sidecar_files() -> Result<()> {
    let dir = tempdir()?;
    let mem = make_sample_memtable();
    SSTableWriter::write_from_memtable(dir.path(), 7, &mem, WriteOptions::default())?;

    assert!(dir.path().join("segment-7.data").exists());
    assert!(dir.path().join("segment-7.index").exists());
    assert!(dir.path().join("segment-7.bloom").exists());
    assert!(!dir.path().join("segment-7.data.tmp").exists());
    Ok(())
}

#[test]
fn written_segment_round_trips_through_a_fresh_reader() -> Result<()> {
    let dir = tempdir()?;
    let mem = make_sample_memtable();
    SSTableWriter::write_from_memtable(dir.path(), 1, &mem, WriteOptions::default())?;

    let reader = SSTableReader::open(dir.path(), 1)?;
    let a = reader.get(b"a")?.expect("a must exist");
    assert_eq!(a.seq, 1);
    assert_eq!(a.value, Some(b"apple".to_vec()));

    let d = reader.get(b"d")?.expect("tombstone is still a record");
    assert_eq!(d.value, None);

    assert_eq!(reader.get(b"missing")?, None);
    Ok(())
}

#[test]
fn sparse_index_samples_at_the_configured_stride() -> Result<()> {
    let dir = tempdir()?;
    let mut mem = Memtable::new();
    for i in 0..250u64 {
        mem.put(format!("key{:04}", i).into_bytes(), b"v".to_vec(), i);
    }
    let opts = WriteOptions {
        sparse_stride: 10,
        ..WriteOptions::default()
    };
    SSTableWriter::write_from_memtable(dir.path(), 2, &mem, opts)?;
    let reader = SSTableReader::open(dir.path(), 2)?;

    // 250 records sampled every 10th (0, 10, 20, ..., 240) -> 25 entries
    assert_eq!(reader.sparse_index_len(), 25);

    // Point lookups still work for keys between sampled entries.
    let got = reader.get(b"key0005")?.expect("key0005 exists");
    assert_eq!(got.seq, 5);
    Ok(())
}

#[test]
fn keys_must_be_strictly_increasing() {
    let dir = tempdir().unwrap();
    let entries = vec![
        (b"b".to_vec(), memtable::ValueEntry { seq: 1, value: Some(b"1".to_vec()) }),
        (b"a".to_vec(), memtable::ValueEntry { seq: 2, value: Some(b"2".to_vec()) }),
    ];
    let result = SSTableWriter::write_from_iterator(
        dir.path(),
        3,
        entries.len(),
        entries.into_iter(),
        WriteOptions::default(),
    );
    assert!(result.is_err());
}
