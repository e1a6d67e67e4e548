use config::EngineConfig;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Number of distinct segment generations present in `dir`, counted from the
/// `.data` files.
pub fn count_segments(dir: &Path) -> usize {
    let mut generations = HashSet::new();
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            if let Some(name) = entry.file_name().to_str() {
                if let Some(g) = sstable::generation_from_data_filename(name) {
                    generations.insert(g);
                }
            }
        }
    }
    generations.len()
}

/// An `EngineConfig` tuned for fast, deterministic tests: a small memtable
/// threshold so flushes are easy to trigger, no fsync overhead, and no
/// memtable WAL unless the test explicitly wants crash-recovery coverage.
pub fn test_config(memtable_threshold: usize) -> EngineConfig {
    EngineConfig {
        memtable_threshold,
        wal_sync: false,
        ..EngineConfig::default()
    }
}
