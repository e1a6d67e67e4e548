use tempfile::tempdir;

use crate::LSMTree;

use super::helpers::{count_segments, test_config};

#[test]
fn compact_with_zero_or_one_segment_is_a_no_op() {
    let dir = tempdir().unwrap();
    let config = test_config(1000);
    let mut tree = LSMTree::open(dir.path(), &config).unwrap();
    tree.compact().unwrap();
    assert_eq!(tree.segment_count(), 0);

    tree.put(b"a".to_vec(), b"1".to_vec()).unwrap();
    tree.force_flush().unwrap();
    tree.compact().unwrap();
    assert_eq!(tree.segment_count(), 1);
}

/// Two flushed generations of the same key compact down to exactly one
/// record holding the newest value, and the old segment files are gone.
#[test]
fn compaction_dedup() {
    let dir = tempdir().unwrap();
    let config = test_config(1);
    let mut tree = LSMTree::open(dir.path(), &config).unwrap();

    tree.put(b"x".to_vec(), b"1".to_vec()).unwrap();
    tree.put(b"x".to_vec(), b"2".to_vec()).unwrap();
    assert_eq!(tree.segment_count(), 2);

    tree.compact().unwrap();

    assert_eq!(tree.segment_count(), 1);
    assert_eq!(count_segments(dir.path()), 1, "old segment files must be deleted");
    assert_eq!(tree.get(b"x").unwrap(), Some(b"2".to_vec()));
}

#[test]
fn compaction_drops_tombstones_for_keys_with_no_live_value() {
    let dir = tempdir().unwrap();
    let config = test_config(1);
    let mut tree = LSMTree::open(dir.path(), &config).unwrap();

    tree.put(b"x".to_vec(), b"1".to_vec()).unwrap();
    tree.delete(b"x".to_vec()).unwrap();
    assert_eq!(tree.segment_count(), 2);

    tree.compact().unwrap();

    // Every input was consumed by a tombstone with nothing live behind it:
    // the compacted output holds no segment at all.
    assert_eq!(tree.segment_count(), 0);
    assert_eq!(tree.get(b"x").unwrap(), None);
}

#[test]
fn compaction_preserves_unrelated_keys() {
    let dir = tempdir().unwrap();
    let config = test_config(1);
    let mut tree = LSMTree::open(dir.path(), &config).unwrap();

    tree.put(b"a".to_vec(), b"1".to_vec()).unwrap();
    tree.put(b"b".to_vec(), b"2".to_vec()).unwrap();
    tree.put(b"c".to_vec(), b"3".to_vec()).unwrap();
    tree.compact().unwrap();

    assert_eq!(tree.segment_count(), 1);
    assert_eq!(tree.get(b"a").unwrap(), Some(b"1".to_vec()));
    assert_eq!(tree.get(b"b").unwrap(), Some(b"2".to_vec()));
    assert_eq!(tree.get(b"c").unwrap(), Some(b"3".to_vec()));
}
