//! Probe sequence shared by lookup and rebuild.
//!
//! Starts at `hash & mask` and steps with `idx = 5 * idx + perturb + 1`,
//! shifting `perturb` right by [`PERTURB_SHIFT`] after every step. Once
//! `perturb` has drained to zero the step is the full-period generator
//! `idx -> 5 * idx + 1 (mod capacity)`, so the sequence visits every slot.

use crate::hash::HashValue;

/// Bits dropped from `perturb` per step.
pub const PERTURB_SHIFT: u32 = 5;

/// Steps needed to drain a full-width `perturb` to zero.
const PERTURB_ROUNDS: usize = (HashValue::BITS / PERTURB_SHIFT) as usize + 1;

/// Upper bound on the number of positions needed to visit every slot of a
/// table with `capacity` slots.
#[inline]
pub const fn probe_limit(capacity: usize) -> usize {
    capacity + PERTURB_ROUNDS
}

/// Deterministic walk over slot indices for one hash.
#[derive(Clone, Debug)]
pub struct ProbeSeq {
    idx: usize,
    perturb: HashValue,
    mask: usize,
}

impl ProbeSeq {
    /// Begin the walk for `hash` in a table whose capacity is `mask + 1`.
    #[inline]
    pub fn new(hash: HashValue, mask: usize) -> Self {
        debug_assert!((mask + 1).is_power_of_two());
        Self {
            idx: (hash as usize) & mask,
            perturb: hash,
            mask,
        }
    }

    /// Current slot index.
    #[inline]
    pub fn pos(&self) -> usize {
        self.idx
    }

    /// Step to the next candidate slot.
    #[inline]
    pub fn advance(&mut self) {
        self.idx = (self.idx << 2)
            .wrapping_add(self.idx)
            .wrapping_add(self.perturb as usize)
            .wrapping_add(1)
            & self.mask;
        self.perturb >>= PERTURB_SHIFT;
    }
}

impl Iterator for ProbeSeq {
    type Item = usize;

    /// Yields the current position, then advances. Never ends.
    #[inline]
    fn next(&mut self) -> Option<usize> {
        let pos = self.idx;
        self.advance();
        Some(pos)
    }
}
