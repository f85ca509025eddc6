//! Slot states and the references handed out by lookups.

use crate::hash::HashValue;

/// One entry of the table array.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum Slot<'k> {
    /// Never used since the last rebuild; terminates a probe.
    #[default]
    Empty,
    /// Previously occupied; probes continue past it and inserts may reuse it.
    Tombstone,
    Occupied { hash: HashValue, key: &'k str },
}

impl<'k> Slot<'k> {
    #[inline]
    pub(crate) fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }

    #[inline]
    pub(crate) fn matches(&self, hash: HashValue, key: &str) -> bool {
        match *self {
            Slot::Occupied { hash: h, key: k } => h == hash && k == key,
            _ => false,
        }
    }
}

/// Reference to a slot, as returned by [`HashTab::find`] and
/// [`HashTab::lookup`].
///
/// A `SlotRef` is a snapshot: it records the slot index, what the slot held
/// when it was looked up, and the table layout it belongs to. It stays usable
/// with [`HashTab::add_item`] / [`HashTab::remove`] until the table is
/// rebuilt; lock the table to keep references alive across other mutations.
///
/// [`HashTab::find`]: crate::HashTab::find
/// [`HashTab::lookup`]: crate::HashTab::lookup
/// [`HashTab::add_item`]: crate::HashTab::add_item
/// [`HashTab::remove`]: crate::HashTab::remove
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SlotRef<'k> {
    pub(crate) index: usize,
    pub(crate) epoch: u64,
    pub(crate) slot: Slot<'k>,
}

impl<'k> SlotRef<'k> {
    /// Position of the slot in the table array.
    pub fn index(&self) -> usize {
        self.index
    }

    /// True if the slot held a live key (the lookup found its key).
    pub fn is_occupied(&self) -> bool {
        self.slot.is_occupied()
    }

    /// True if the slot is free for an insertion (Empty or Tombstone).
    pub fn is_vacant(&self) -> bool {
        !self.slot.is_occupied()
    }

    /// True if the slot is a reusable tombstone.
    pub fn is_tombstone(&self) -> bool {
        matches!(self.slot, Slot::Tombstone)
    }

    /// The stored key, if occupied.
    pub fn key(&self) -> Option<&'k str> {
        match self.slot {
            Slot::Occupied { key, .. } => Some(key),
            _ => None,
        }
    }

    /// The cached hash of the stored key, if occupied.
    pub fn hash(&self) -> Option<HashValue> {
        match self.slot {
            Slot::Occupied { hash, .. } => Some(hash),
            _ => None,
        }
    }
}
