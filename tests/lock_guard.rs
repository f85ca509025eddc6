#![cfg(test)]

use hashtab::HashTab;

#[test]
fn guard_locks_and_unlocks() {
    let mut t = HashTab::new();
    {
        let g = t.locked();
        assert!(g.is_locked());
        // drop guard at end of scope
    }
    assert!(!t.is_locked());
}

#[test]
fn guard_keeps_refs_valid_across_removals() {
    let keys: Vec<String> = (0..40).map(|i| format!("g{i}")).collect();
    let mut t = HashTab::new();
    for k in &keys {
        t.add(k).unwrap();
    }
    let refs: Vec<_> = keys.iter().map(|k| t.find(k)).collect();
    let mut g = t.locked();
    for (r, k) in refs.into_iter().zip(&keys) {
        assert_eq!(g.remove(r), Ok(k.as_str()));
    }
    drop(g);
    assert!(t.is_empty());
    assert!(t.is_inline());
}

#[test]
#[should_panic(expected = "stale SlotRef")]
fn rebuild_invalidates_unlocked_refs() {
    let keys: Vec<String> = (0..43).map(|i| format!("g{i}")).collect();
    let mut t = HashTab::new();
    for k in &keys[..42] {
        t.add(k).unwrap();
    }
    assert_eq!(t.capacity(), 64);
    let refs: Vec<_> = keys[..42].iter().map(|k| t.find(k)).collect();
    // The 43rd key crosses two thirds of 64 and rebuilds the table.
    t.add(&keys[42]).unwrap();
    assert_eq!(t.capacity(), 128);
    let _ = t.remove(refs[0]);
}
