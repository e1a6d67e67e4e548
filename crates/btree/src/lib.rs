//! # BTree
//!
//! A classical in-memory B-Tree of minimum degree `t`: every non-root node
//! holds between `t - 1` and `2t - 1` keys, every internal node's child count
//! is exactly `keys.len() + 1`, and no key ever appears twice. Insertion
//! splits full nodes on the way down (`split_child` + `insert_non_full`) so a
//! single pass from the root is always enough — no post-insertion rebalance.
//!
//! This crate only implements the tree itself (`insert`/`search`/`items`/
//! `size`); [`engine::BTreeEngine`] pairs it with a [`wal`] to make it a
//! durable standalone store.

mod engine;
mod node;

use node::Node;

pub use engine::{BTreeEngine, BTreeError};

/// An in-memory B-Tree keyed by `K`, storing values of type `V`.
pub struct BTree<K, V> {
    root: Box<Node<K, V>>,
    t: usize,
    len: usize,
}

impl<K: Ord, V> BTree<K, V> {
    /// Creates an empty tree with the given minimum degree.
    ///
    /// # Panics
    ///
    /// Panics if `min_degree < 2` — a degree-1 B-Tree cannot satisfy the
    /// `t - 1` minimum key invariant for non-root nodes.
    #[must_use]
    pub fn new(min_degree: usize) -> Self {
        assert!(min_degree >= 2, "B-Tree minimum degree must be >= 2");
        BTree {
            root: Box::new(Node::leaf()),
            t: min_degree,
            len: 0,
        }
    }

    /// Inserts `value` under `key`, or updates the value in place if `key`
    /// is already present.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some(slot) = self.root.find_mut(&key) {
            *slot = value;
            return;
        }
        if self.root.keys.len() == 2 * self.t - 1 {
            let old_root = std::mem::replace(&mut self.root, Box::new(Node::leaf()));
            self.root.leaf = false;
            self.root.children.push(old_root);
            self.root.split_child(0, self.t);
            self.root.insert_non_full(key, value, self.t);
        } else {
            self.root.insert_non_full(key, value, self.t);
        }
        self.len += 1;
    }

    /// Looks up `key`, returning the stored value if present.
    #[must_use]
    pub fn search(&self, key: &K) -> Option<&V> {
        self.root.find(key)
    }

    /// Returns every `(key, value)` pair in ascending key order.
    #[must_use]
    pub fn items(&self) -> Vec<(&K, &V)> {
        let mut out = Vec::with_capacity(self.len);
        self.root.collect_into(&mut out);
        out
    }

    /// Returns the number of entries currently stored.
    #[must_use]
    pub fn size(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every entry, resetting the tree to a single empty leaf root.
    pub fn clear(&mut self) {
        self.root = Box::new(Node::leaf());
        self.len = 0;
    }
}

#[cfg(test)]
mod tests;
