#![cfg(test)]

// Property tests for HashTab kept inside the crate so they can look at
// counters without widening the public surface.

use crate::hash::hash_key;
use crate::hash_tab::HashTab;
use crate::HashTabError;
use hashbrown::HashSet;
use proptest::prelude::*;
use std::collections::BTreeSet;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Add(usize),
    AddItem(usize),
    Remove(usize),
    Find(usize),
    Contains(String),
    Lock,
    Unlock,
    Reserve(usize),
    Iterate,
}

fn arb_scenario(
    keys: impl Strategy<Value = String> + Clone + 'static,
    pool_len: std::ops::RangeInclusive<usize>,
    ops_len: std::ops::Range<usize>,
) -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec(keys.clone(), pool_len).prop_flat_map(move |pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => idx.clone().prop_map(OpI::Add),
            2 => idx.clone().prop_map(OpI::AddItem),
            3 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Find),
            1 => keys.clone().prop_map(OpI::Contains),
            1 => Just(OpI::Lock),
            1 => Just(OpI::Unlock),
            1 => (0usize..200).prop_map(OpI::Reserve),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, ops_len.clone()).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_scenario(pool: &[String], ops: Vec<OpI>) -> Result<(), TestCaseError> {
    let mut sut = HashTab::new();
    let mut model: HashSet<&str> = HashSet::new();
    let mut locked_at: Option<usize> = None;

    for op in ops {
        match op {
            OpI::Add(i) | OpI::AddItem(i) => {
                let k = pool[i].as_str();
                // Adding to a locked table is only sound while a free slot remains.
                if sut.is_locked() && sut.filled() + 1 >= sut.capacity() {
                    continue;
                }
                let already = model.contains(k);
                let (used, filled) = (sut.len(), sut.filled());
                let res = match op {
                    OpI::Add(_) => sut.add(k),
                    _ => {
                        let hash = hash_key(k);
                        let slot = sut.lookup(k, hash);
                        if slot.is_occupied() {
                            Err(HashTabError::DuplicateKey)
                        } else {
                            sut.add_item(slot, k, hash)
                        }
                    }
                };
                match res {
                    Ok(()) => {
                        prop_assert!(!already, "add must fail on duplicate");
                        model.insert(k);
                    }
                    Err(HashTabError::DuplicateKey) => {
                        prop_assert!(already, "duplicate error only when key exists");
                        prop_assert_eq!(sut.len(), used);
                        prop_assert_eq!(sut.filled(), filled);
                    }
                    Err(e) => prop_assert!(false, "unexpected error {:?}", e),
                }
            }
            OpI::Remove(i) => {
                let k = pool[i].as_str();
                let slot = sut.find(k);
                if model.contains(k) {
                    prop_assert!(slot.is_occupied());
                    let removed = sut.remove(slot).expect("table is not frozen");
                    prop_assert_eq!(removed, k);
                    model.remove(k);
                } else {
                    prop_assert!(slot.is_vacant());
                }
            }
            OpI::Find(i) => {
                let k = pool[i].as_str();
                let slot = sut.find(k);
                prop_assert_eq!(slot.is_occupied(), model.contains(k));
                if slot.is_occupied() {
                    prop_assert_eq!(slot.key(), Some(k));
                    prop_assert_eq!(slot.hash(), Some(hash_key(k)));
                }
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains(&s), model.contains(s.as_str()));
            }
            OpI::Lock => {
                sut.lock();
                locked_at.get_or_insert(sut.capacity());
            }
            OpI::Unlock => {
                if sut.is_locked() {
                    sut.unlock().expect("rebuild succeeds");
                    if !sut.is_locked() {
                        locked_at = None;
                        prop_assert!(sut.filled() * 3 < sut.capacity() * 2 || sut.is_inline());
                    }
                }
            }
            OpI::Reserve(n) => {
                sut.reserve(n).expect("small reserve succeeds");
                if !sut.is_locked() {
                    prop_assert!(sut.capacity() >= n);
                }
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<&str> = sut.iter().filter_map(|s| s.key()).collect();
                let m_keys: BTreeSet<&str> = model.iter().copied().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        // Post-conditions after each op
        let cap = sut.capacity();
        prop_assert!(cap.is_power_of_two() && cap >= 16);
        prop_assert!(sut.len() <= sut.filled() && sut.filled() <= cap);
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        if let Some(at) = locked_at {
            prop_assert_eq!(cap, at, "capacity changed while locked");
        }
    }

    for k in &model {
        prop_assert!(sut.contains(k));
    }
    Ok(())
}

// Property: State-machine equivalence against a hashbrown::HashSet model.
// Invariants exercised across random operation sequences:
// - Duplicate keys are rejected without touching `used`/`filled`.
// - `find` reports occupied iff the model holds the key, with its cached hash.
// - `remove` hands back the stored key.
// - Capacity is a power of two >= 16 and does not move while locked.
// - `used <= filled <= capacity`; `iter` yields exactly the live keys.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario("[a-z]{0,5}".boxed(), 1..=24, 1..120)) {
        run_scenario(&pool, ops)?;
    }
}

// Property: same invariants with single-byte keys, whose hashes are their
// byte values; many share a probe start and tombstone reuse is frequent.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario("[a-zA-Z0-9]".boxed(), 1..=40, 1..200)) {
        run_scenario(&pool, ops)?;
    }
}

// Property: growth across many thresholds keeps every key reachable.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_bulk_add_then_find(keys in proptest::collection::btree_set("[a-z0-9]{1,8}", 0..600)) {
        let keys: Vec<String> = keys.into_iter().collect();
        let mut t = HashTab::new();
        for k in &keys {
            prop_assert_eq!(t.add(k), Ok(()));
        }
        prop_assert_eq!(t.len(), keys.len());
        for k in &keys {
            prop_assert_eq!(t.find(k).key(), Some(k.as_str()));
        }
        for k in &keys {
            prop_assert_eq!(t.add(k), Err(HashTabError::DuplicateKey));
        }
    }
}
