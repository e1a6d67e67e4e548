use crate::*;
use anyhow::Result;
use memtable::Memtable;
use tempfile::tempdir;

fn make_sample_memtable() -> Memtable {
    let mut m = Memtable::new();
    m.put(b"a".to_vec(), b"apple".to_vec(), 1);
    m.put(b"b".to_vec(), b"banana".to_vec(), 2);
    m.put(b"c".to_vec(), b"".to_vec(), 3);
    m.delete(b"d".to_vec(), 4);
    m
}

#[test]
fn open_and_get_entries() -> Result<()> {
    let dir = tempdir()?;
    let mem = make_sample_memtable();
    SSTableWriter::write_from_memtable(dir.path(), 0, &mem, WriteOptions::default())?;
    let reader = SSTableReader::open(dir.path(), 0)?;

    let a = reader.get(b"a")?.expect("a must exist");
    assert_eq!(a.seq, 1);
    assert_eq!(a.value, Some(b"apple".to_vec()));

    let b = reader.get(b"b")?.expect("b must exist");
    assert_eq!(b.seq, 2);
    assert_eq!(b.value, Some(b"banana".to_vec()));

    let c = reader.get(b"c")?.expect("c must exist");
    assert_eq!(c.seq, 3);
    assert_eq!(c.value, Some(b"".to_vec()));

    let d = reader.get(b"d")?.expect("tombstone is still a record");
    assert_eq!(d.seq, 4);
    assert_eq!(d.value, None);

    assert!(reader.get(b"nope")?.is_none());
    Ok(())
}

#[test]
fn bloom_filter_rejects_absent_keys_without_disk_read() -> Result<()> {
    let dir = tempdir()?;
    let mut mem = Memtable::new();
    for i in 0..200u64 {
        mem.put(format!("key{:04}", i).into_bytes(), b"v".to_vec(), i);
    }
    SSTableWriter::write_from_memtable(dir.path(), 1, &mem, WriteOptions::default())?;
    let reader = SSTableReader::open(dir.path(), 1)?;

    for i in 0..200u64 {
        let key = format!("key{:04}", i).into_bytes();
        assert!(reader.get(&key)?.is_some(), "key{:04} should be found", i);
    }

    let mut misses = 0;
    for i in 0..100u64 {
        let key = format!("missing{:04}", i).into_bytes();
        if reader.get(&key)?.is_none() {
            misses += 1;
        }
    }
    assert!(
        misses > 90,
        "bloom filter should reject most absent keys, got {misses} misses out of 100"
    );
    Ok(())
}

#[test]
fn open_fails_loudly_on_missing_sidecar() -> Result<()> {
    let dir = tempdir()?;
    let mem = make_sample_memtable();
    SSTableWriter::write_from_memtable(dir.path(), 5, &mem, WriteOptions::default())?;

    std::fs::remove_file(dir.path().join("segment-5.bloom"))?;
    let result = SSTableReader::open(dir.path(), 5);
    assert!(
        result.is_err(),
        "missing bloom sidecar must fail open(), not be silently skipped"
    );
    Ok(())
}

#[test]
fn open_fails_on_truncated_data_file() -> Result<()> {
    let dir = tempdir()?;
    let mem = make_sample_memtable();
    SSTableWriter::write_from_memtable(dir.path(), 6, &mem, WriteOptions::default())?;

    std::fs::write(dir.path().join("segment-6.data"), b"x")?;
    let result = SSTableReader::open(dir.path(), 6);
    assert!(result.is_err());
    Ok(())
}

#[test]
fn full_scan_iterator_yields_every_record_in_order() -> Result<()> {
    let dir = tempdir()?;
    let mut mem = Memtable::new();
    mem.put(b"z".to_vec(), b"1".to_vec(), 1);
    mem.put(b"a".to_vec(), b"2".to_vec(), 2);
    mem.put(b"m".to_vec(), b"3".to_vec(), 3);
    SSTableWriter::write_from_memtable(dir.path(), 9, &mem, WriteOptions::default())?;

    let reader = SSTableReader::open(dir.path(), 9)?;
    let keys: Vec<Vec<u8>> = reader
        .iter()?
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .map(|(k, _, _)| k)
        .collect();
    assert_eq!(keys, vec![b"a".to_vec(), b"m".to_vec(), b"z".to_vec()]);
    Ok(())
}

#[test]
fn generation_is_reported() -> Result<()> {
    let dir = tempdir()?;
    let mem = make_sample_memtable();
    SSTableWriter::write_from_memtable(dir.path(), 42, &mem, WriteOptions::default())?;
    let reader = SSTableReader::open(dir.path(), 42)?;
    assert_eq!(reader.generation(), 42);
    Ok(())
}
