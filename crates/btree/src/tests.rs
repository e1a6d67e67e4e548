use super::*;

fn tree() -> BTree<i32, &'static str> {
    BTree::new(2)
}

#[test]
fn search_on_empty_tree_is_absent() {
    let t: BTree<i32, &str> = tree();
    assert_eq!(t.search(&1), None);
}

#[test]
fn insert_then_search_round_trips() {
    let mut t = tree();
    t.insert(5, "five");
    t.insert(3, "three");
    t.insert(8, "eight");
    assert_eq!(t.search(&5), Some(&"five"));
    assert_eq!(t.search(&3), Some(&"three"));
    assert_eq!(t.search(&8), Some(&"eight"));
    assert_eq!(t.search(&99), None);
}

#[test]
fn insert_existing_key_updates_in_place_without_growing_size() {
    let mut t = tree();
    t.insert(1, "a");
    t.insert(1, "b");
    assert_eq!(t.search(&1), Some(&"b"));
    assert_eq!(t.size(), 1);
}

#[test]
fn items_are_returned_in_ascending_order_across_many_splits() {
    let mut t = tree();
    let mut keys: Vec<i32> = (0..200).collect();
    // insert out of order to exercise splitting from multiple directions
    let mut shuffled = keys.clone();
    shuffled.rotate_left(77);
    for k in &shuffled {
        t.insert(*k, "x");
    }
    keys.sort_unstable();
    let got: Vec<i32> = t.items().into_iter().map(|(k, _)| *k).collect();
    assert_eq!(got, keys);
    assert_eq!(t.size(), 200);
}

#[test]
fn no_duplicate_keys_survive_repeated_inserts() {
    let mut t = tree();
    for _ in 0..5 {
        for k in 0..50 {
            t.insert(k, "x");
        }
    }
    assert_eq!(t.size(), 50);
}

#[test]
fn size_reflects_distinct_key_count() {
    let mut t = tree();
    assert_eq!(t.size(), 0);
    assert!(t.is_empty());
    t.insert(1, "a");
    t.insert(2, "b");
    t.insert(1, "c");
    assert_eq!(t.size(), 2);
    assert!(!t.is_empty());
}

#[test]
#[should_panic(expected = "minimum degree")]
fn degree_below_two_panics() {
    let _t: BTree<i32, i32> = BTree::new(1);
}

#[test]
fn clear_empties_the_tree_and_allows_reuse() {
    let mut t = tree();
    for k in 0..64 {
        t.insert(k, "x");
    }
    t.clear();
    assert_eq!(t.size(), 0);
    assert!(t.is_empty());
    assert_eq!(t.search(&0), None);
    t.insert(1, "y");
    assert_eq!(t.search(&1), Some(&"y"));
    assert_eq!(t.size(), 1);
}
