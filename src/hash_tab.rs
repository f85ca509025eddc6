//! HashTab: open-addressing table of borrowed string keys.

use crate::error::HashTabError;
use crate::hash::{hash_key, HashValue};
use crate::lock::LockGuard;
use crate::probe::{probe_limit, ProbeSeq};
use crate::resize::{self, Occupancy, ResizeRequest};
use crate::slot::{Slot, SlotRef};
use crate::storage::{Storage, MIN_CAPACITY};
use tracing::{debug, trace, warn};

/// Whether the last rebuild attempt could allocate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
enum GrowthState {
    #[default]
    Healthy,
    /// Sticky: only a successful rebuild clears it.
    AllocFailed,
}

/// Hash table of `&'k str` keys.
///
/// The table never copies or frees keys; it stores the caller's references
/// and hands them back on removal. Lookups return a [`SlotRef`] that is
/// either the key's slot or the best slot to insert it at, so callers can
/// hash once and then decide between reading and inserting.
#[derive(Debug)]
pub struct HashTab<'k> {
    storage: Storage<'k>,
    mask: usize,
    used: usize,
    filled: usize,
    changed: u64,
    // Bumped by every rebuild; slot refs from another epoch are stale.
    epoch: u64,
    locked: u32,
    state: GrowthState,
    frozen: bool,
}

impl<'k> HashTab<'k> {
    /// Empty table at minimum capacity, using inline storage.
    pub const fn new() -> Self {
        Self {
            storage: Storage::inline(),
            mask: MIN_CAPACITY - 1,
            used: 0,
            filled: 0,
            changed: 0,
            epoch: 0,
            locked: 0,
            state: GrowthState::Healthy,
            frozen: false,
        }
    }

    /// Empty table with room for `minitems` entries before it grows.
    pub fn with_capacity(minitems: usize) -> Result<Self, HashTabError> {
        let mut table = Self::new();
        table.reserve(minitems)?;
        Ok(table)
    }

    /// Release heap storage and return to the freshly created state.
    /// Keys are not touched; the caller still owns them. Outstanding locks
    /// stay held, and slot refs taken before the clear go stale.
    pub fn clear(&mut self) {
        let (locked, epoch) = (self.locked, self.epoch);
        *self = Self::new();
        self.locked = locked;
        self.epoch = epoch + 1;
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Live keys plus tombstones.
    pub fn filled(&self) -> usize {
        self.filled
    }

    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Structural-change counter; moves on every add, removal and rebuild.
    pub fn changed(&self) -> u64 {
        self.changed
    }

    pub fn lock_depth(&self) -> u32 {
        self.locked
    }

    pub fn is_locked(&self) -> bool {
        self.locked > 0
    }

    /// True while the slots live in the inline block.
    pub fn is_inline(&self) -> bool {
        self.storage.is_inline()
    }

    /// True after a rebuild failed to allocate, until one succeeds.
    pub fn alloc_failed(&self) -> bool {
        self.state == GrowthState::AllocFailed
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freeze or unfreeze the table. A frozen table refuses `remove`.
    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    /// `Err(FrozenTable)` if the table is frozen.
    pub fn check_frozen(&self) -> Result<(), HashTabError> {
        if self.frozen {
            return Err(HashTabError::FrozenTable);
        }
        Ok(())
    }

    /// Find `key`. The result is its slot if present, otherwise the slot
    /// an insertion of `key` should use.
    pub fn find(&self, key: &str) -> SlotRef<'k> {
        self.lookup(key, hash_key(key))
    }

    /// Like [`find`](Self::find) with a hash the caller already computed
    /// via [`hash_key`].
    ///
    /// # Panics
    ///
    /// If the table has neither `key` nor any free slot, which only happens
    /// when keys were added to a locked table until it filled up.
    pub fn lookup(&self, key: &str, hash: HashValue) -> SlotRef<'k> {
        let slots = self.storage.slots();
        let mut free = None;
        for pos in ProbeSeq::new(hash, self.mask).take(probe_limit(self.capacity())) {
            match slots[pos] {
                Slot::Empty => return self.slot_ref(free.unwrap_or(pos)),
                Slot::Tombstone => {
                    free.get_or_insert(pos);
                }
                slot if slot.matches(hash, key) => return self.slot_ref(pos),
                Slot::Occupied { .. } => {}
            }
        }
        match free {
            Some(pos) => self.slot_ref(pos),
            None => panic!("hash table is full: keys were added while it was locked"),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_occupied()
    }

    /// Insert `key`. Fails with `DuplicateKey` if it is already present.
    pub fn add(&mut self, key: &'k str) -> Result<(), HashTabError> {
        let hash = hash_key(key);
        let slot = self.lookup(key, hash);
        if slot.is_occupied() {
            return Err(HashTabError::DuplicateKey);
        }
        self.add_item(slot, key, hash)
    }

    /// Store `key` with `hash` in `slot`, which must come from a lookup of
    /// `key` that found it absent.
    ///
    /// Fails at once with `AllocationFailure` while an earlier rebuild
    /// failure is unresolved. Otherwise the key is stored and the growth
    /// check runs; if that rebuild fails the key stays stored, the error is
    /// returned and further insertions are blocked.
    ///
    /// # Panics
    ///
    /// If `slot` is from before the last rebuild or its slot is occupied.
    pub fn add_item(
        &mut self,
        slot: SlotRef<'k>,
        key: &'k str,
        hash: HashValue,
    ) -> Result<(), HashTabError> {
        if self.state == GrowthState::AllocFailed {
            return Err(HashTabError::AllocationFailure);
        }
        self.check_epoch(&slot);
        let target = &mut self.storage.slots_mut()[slot.index];
        assert!(
            !target.is_occupied(),
            "add_item: slot {} is already occupied",
            slot.index
        );
        if *target == Slot::Empty {
            self.filled += 1;
        }
        *target = Slot::Occupied { hash, key };
        self.used += 1;
        self.bump_changed();
        self.may_resize(ResizeRequest::GrowthCheck)
    }

    /// Remove the key held by `slot` and hand it back. The slot becomes a
    /// tombstone until the next rebuild.
    ///
    /// # Panics
    ///
    /// If `slot` is from before the last rebuild, its slot is not occupied,
    /// or the slot now holds a different key than the lookup saw.
    pub fn remove(&mut self, slot: SlotRef<'k>) -> Result<&'k str, HashTabError> {
        self.check_frozen()?;
        self.check_epoch(&slot);
        let target = &mut self.storage.slots_mut()[slot.index];
        let Slot::Occupied { key, .. } = *target else {
            panic!("remove: slot {} is not occupied", slot.index);
        };
        assert!(
            *target == slot.slot,
            "stale SlotRef: slot {} was reused by another key",
            slot.index
        );
        *target = Slot::Tombstone;
        self.used -= 1;
        self.bump_changed();
        // The removal stands even if compaction fails; the sticky state records it.
        let _ = self.may_resize(ResizeRequest::GrowthCheck);
        Ok(key)
    }

    /// Make sure `minitems` entries fit without growing. No-op while locked.
    pub fn reserve(&mut self, minitems: usize) -> Result<(), HashTabError> {
        self.may_resize(ResizeRequest::Reserve(minitems))
    }

    /// Freeze the layout: no rebuild happens until the matching `unlock`.
    /// Slot refs stay valid meanwhile. Avoid adding keys while locked:
    /// without rebuilds nothing guarantees a free slot remains.
    pub fn lock(&mut self) {
        self.locked += 1;
        trace!(depth = self.locked, "table locked");
    }

    /// Undo one `lock`. The last one runs the deferred growth check.
    ///
    /// # Panics
    ///
    /// If the table is not locked.
    pub fn unlock(&mut self) -> Result<(), HashTabError> {
        assert!(self.locked > 0, "unlock without matching lock");
        self.locked -= 1;
        trace!(depth = self.locked, "table unlocked");
        self.may_resize(ResizeRequest::GrowthCheck)
    }

    /// Lock the table for the lifetime of the returned guard.
    pub fn locked(&mut self) -> LockGuard<'_, 'k> {
        LockGuard::new(self)
    }

    /// Occupied slots, in table order.
    pub fn iter(&self) -> Iter<'_, 'k> {
        Iter {
            it: self.storage.slots().iter().enumerate(),
            epoch: self.epoch,
        }
    }

    fn slot_ref(&self, index: usize) -> SlotRef<'k> {
        SlotRef {
            index,
            epoch: self.epoch,
            slot: self.storage.slots()[index],
        }
    }

    fn check_epoch(&self, slot: &SlotRef<'k>) {
        assert_eq!(
            slot.epoch, self.epoch,
            "stale SlotRef: the table was rebuilt after the lookup"
        );
    }

    fn bump_changed(&mut self) {
        self.changed = self.changed.wrapping_add(1);
    }

    fn occupancy(&self) -> Occupancy {
        Occupancy {
            used: self.used,
            filled: self.filled,
            capacity: self.capacity(),
            inline: self.storage.is_inline(),
        }
    }

    fn may_resize(&mut self, req: ResizeRequest) -> Result<(), HashTabError> {
        if self.locked > 0 {
            return Ok(());
        }
        let target = resize::plan(self.occupancy(), req).inspect_err(|err| {
            warn!(?req, used = self.used, %err, "table capacity overflow");
        })?;
        match target {
            Some(capacity) => self.rebuild(capacity),
            None => Ok(()),
        }
    }

    /// Move every live entry into fresh storage of `capacity` slots,
    /// dropping tombstones.
    fn rebuild(&mut self, capacity: usize) -> Result<(), HashTabError> {
        let fresh = match Storage::allocate(capacity) {
            Ok(storage) => storage,
            Err(err) => {
                self.state = GrowthState::AllocFailed;
                warn!(
                    capacity,
                    used = self.used,
                    "table rebuild failed; insertions blocked"
                );
                return Err(err);
            }
        };
        // Staying inline swaps in a fresh block, so `old` is a detached copy
        // of the entries being compacted.
        let old = std::mem::replace(&mut self.storage, fresh);
        let mask = capacity - 1;
        let slots = self.storage.slots_mut();
        for slot in old.slots() {
            if let Slot::Occupied { hash, .. } = *slot {
                let mut probe = ProbeSeq::new(hash, mask);
                while slots[probe.pos()] != Slot::Empty {
                    probe.advance();
                }
                slots[probe.pos()] = *slot;
            }
        }
        debug!(
            old_capacity = old.capacity(),
            new_capacity = capacity,
            used = self.used,
            tombstones = self.filled - self.used,
            "table rebuilt"
        );
        self.mask = mask;
        self.filled = self.used;
        self.epoch += 1;
        self.bump_changed();
        if self.state == GrowthState::AllocFailed {
            self.state = GrowthState::Healthy;
            warn!(capacity, "table rebuild succeeded; insertions unblocked");
        }
        Ok(())
    }
}

impl Default for HashTab<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the occupied slots of a [`HashTab`].
pub struct Iter<'a, 'k> {
    it: std::iter::Enumerate<std::slice::Iter<'a, Slot<'k>>>,
    epoch: u64,
}

impl<'a, 'k> Iterator for Iter<'a, 'k> {
    type Item = SlotRef<'k>;

    fn next(&mut self) -> Option<Self::Item> {
        let epoch = self.epoch;
        self.it
            .by_ref()
            .find(|(_, slot)| slot.is_occupied())
            .map(|(index, &slot)| SlotRef { index, epoch, slot })
    }
}
