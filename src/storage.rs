//! Slot array backing a table: a fixed inline block for the minimum size,
//! a heap allocation otherwise.

use crate::error::HashTabError;
use crate::slot::Slot;

/// Smallest capacity a table ever has; also the size of the inline block.
pub const MIN_CAPACITY: usize = 16;

#[derive(Debug)]
pub(crate) enum Storage<'k> {
    Inline([Slot<'k>; MIN_CAPACITY]),
    Heap(Box<[Slot<'k>]>),
}

impl<'k> Storage<'k> {
    /// Fresh inline block, all slots Empty.
    pub(crate) const fn inline() -> Self {
        Storage::Inline([Slot::Empty; MIN_CAPACITY])
    }

    /// Storage of exactly `capacity` Empty slots. The minimum capacity uses
    /// the inline block; anything larger is allocated fallibly.
    pub(crate) fn allocate(capacity: usize) -> Result<Self, HashTabError> {
        debug_assert!(capacity.is_power_of_two() && capacity >= MIN_CAPACITY);
        if capacity == MIN_CAPACITY {
            return Ok(Self::inline());
        }
        let mut slots: Vec<Slot<'k>> = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| HashTabError::AllocationFailure)?;
        slots.resize(capacity, Slot::Empty);
        Ok(Storage::Heap(slots.into_boxed_slice()))
    }

    #[inline]
    pub(crate) fn is_inline(&self) -> bool {
        matches!(self, Storage::Inline(_))
    }

    #[inline]
    pub(crate) fn slots(&self) -> &[Slot<'k>] {
        match self {
            Storage::Inline(a) => a,
            Storage::Heap(b) => b,
        }
    }

    #[inline]
    pub(crate) fn slots_mut(&mut self) -> &mut [Slot<'k>] {
        match self {
            Storage::Inline(a) => a,
            Storage::Heap(b) => b,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots().len()
    }
}

impl Default for Storage<'_> {
    fn default() -> Self {
        Self::inline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_capacity_is_inline() {
        let s = Storage::allocate(MIN_CAPACITY).unwrap();
        assert!(s.is_inline());
        assert_eq!(s.capacity(), MIN_CAPACITY);
        assert!(s.slots().iter().all(|s| *s == Slot::Empty));
    }

    #[test]
    fn larger_capacity_is_heap_and_empty() {
        let s = Storage::allocate(64).unwrap();
        assert!(!s.is_inline());
        assert_eq!(s.capacity(), 64);
        assert!(s.slots().iter().all(|s| *s == Slot::Empty));
    }

    /// A byte size beyond `isize::MAX` is refused by the allocator path.
    #[test]
    fn impossible_allocation_reports_failure() {
        let cap = 1usize << (usize::BITS - 2);
        assert_eq!(
            Storage::allocate(cap).unwrap_err(),
            HashTabError::AllocationFailure
        );
    }

    #[test]
    fn slots_mut_writes_are_visible() {
        let mut s = Storage::inline();
        s.slots_mut()[3] = Slot::Tombstone;
        assert_eq!(s.slots()[3], Slot::Tombstone);
    }
}
