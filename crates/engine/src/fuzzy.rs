//! `fuzzy_get`: Levenshtein-filtered scan across the memtable and every
//! segment.
//!
//! There is no acceleration structure for this path — bloom filters only
//! answer exact membership, not "within edit distance `d`" — so every
//! segment is scanned in full, newest to oldest, same as the exact-match
//! read path's recency order.

use std::collections::HashSet;

use crate::{EngineError, LSMTree};

impl LSMTree {
    /// Returns every live `(key, value)` pair within Levenshtein distance
    /// `max_distance` of `search_key`.
    ///
    /// Walks the memtable, then each segment newest to oldest. The first
    /// time a key is observed decides its fate for the whole search — later
    /// (older) sightings of the same key are skipped, preserving
    /// recency-correct shadowing without a second pass. Tombstones are
    /// recorded as "seen" (so an older live value never resurfaces) but are
    /// filtered out of the returned list.
    ///
    /// Order is insertion order of first observation — stable for a fixed
    /// set of writes, but otherwise unspecified.
    pub fn fuzzy_get(
        &self,
        search_key: &[u8],
        max_distance: usize,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, EngineError> {
        let mut seen: HashSet<Vec<u8>> = HashSet::new();
        let mut results = Vec::new();

        for (key, entry) in self.mem.iter() {
            if seen.insert(key.to_vec()) && levenshtein::distance(search_key, key) <= max_distance {
                if let Some(value) = &entry.value {
                    results.push((key.to_vec(), value.clone()));
                }
            }
        }

        for segment in self.segments.iter().rev() {
            for item in segment.iter().map_err(EngineError::Segment)? {
                let (key, _seq, value) = item.map_err(EngineError::Segment)?;
                if !seen.insert(key.clone()) {
                    continue;
                }
                if levenshtein::distance(search_key, &key) <= max_distance {
                    if let Some(value) = value {
                        results.push((key, value));
                    }
                }
            }
        }

        Ok(results)
    }
}
