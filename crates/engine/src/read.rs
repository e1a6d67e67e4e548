//! Read path: `get()`.
//!
//! Checks the memtable first (freshest data, tombstone-aware), then walks
//! segments newest to oldest. The first match — live value or tombstone —
//! wins; a tombstone anywhere in the chain means the key reads as absent.
//! There is no range scan here — only point get, delete, and fuzzy scan.

use crate::{EngineError, LSMTree};

impl LSMTree {
    /// Looks up `key`.
    ///
    /// 1. Probe the memtable: present and live returns its value; present
    ///    and a tombstone returns absent.
    /// 2. Walk `segments` newest to oldest: each segment's bloom filter
    ///    gates a sparse-index-assisted point lookup. A returned tombstone
    ///    means absent; a returned live value wins; absent means continue.
    /// 3. `None` if no segment has the key.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, EngineError> {
        if let Some(entry) = self.mem.get_entry(key) {
            return Ok(entry.value.clone());
        }

        for segment in self.segments.iter().rev() {
            if let Some(entry) = segment.get(key).map_err(EngineError::Segment)? {
                return Ok(entry.value);
            }
        }

        Ok(None)
    }
}
