//! When to rebuild and to what capacity.
//!
//! The policy only looks at counters; performing the rebuild is the
//! table's job. A table grows (or is compacted in place) once live entries
//! plus tombstones reach two thirds of the capacity, and is rebuilt to hold
//! its live entries at most two thirds full.

use crate::error::HashTabError;
use crate::storage::MIN_CAPACITY;

/// Why the policy is consulted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ResizeRequest {
    /// After an insert, a removal or the final unlock.
    GrowthCheck,
    /// Guarantee room for this many entries.
    Reserve(usize),
}

/// Counters the policy decides on.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Occupancy {
    pub used: usize,
    pub filled: usize,
    pub capacity: usize,
    pub inline: bool,
}

/// Returns the capacity to rebuild at, or `None` when the current layout
/// is good enough.
pub(crate) fn plan(occ: Occupancy, req: ResizeRequest) -> Result<Option<usize>, HashTabError> {
    let minsize = match req {
        ResizeRequest::GrowthCheck => {
            // Small inline tables with at least two Empty slots left.
            if occ.inline && occ.filled < MIN_CAPACITY - 1 {
                return Ok(None);
            }
            if occ.filled.saturating_mul(3) < occ.capacity.saturating_mul(2) && occ.used > 0 {
                return Ok(None);
            }
            occ.used.saturating_mul(3) / 2 + 1
        }
        ResizeRequest::Reserve(minitems) => {
            if occ.capacity >= minitems {
                return Ok(None);
            }
            minitems
                .checked_mul(3)
                .and_then(|n| n.checked_add(1))
                .ok_or(HashTabError::Overflow)?
                / 2
        }
    };
    capacity_for(minsize).map(Some)
}

/// Smallest power of two that is at least `minsize` and [`MIN_CAPACITY`].
pub(crate) fn capacity_for(minsize: usize) -> Result<usize, HashTabError> {
    let mut capacity = MIN_CAPACITY;
    while capacity < minsize {
        capacity = capacity.checked_mul(2).ok_or(HashTabError::Overflow)?;
    }
    Ok(capacity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(used: usize, filled: usize, capacity: usize) -> Occupancy {
        Occupancy {
            used,
            filled,
            capacity,
            inline: capacity == MIN_CAPACITY,
        }
    }

    #[test]
    fn small_inline_table_is_left_alone() {
        for filled in 0..MIN_CAPACITY - 1 {
            assert_eq!(plan(occ(filled, filled, 16), ResizeRequest::GrowthCheck), Ok(None));
        }
    }

    #[test]
    fn inline_table_grows_when_nearly_full() {
        // 11 live, 15 filled: 45 >= 32, target 11*3/2+1 = 17 -> 32.
        assert_eq!(plan(occ(11, 15, 16), ResizeRequest::GrowthCheck), Ok(Some(32)));
    }

    /// Many tombstones in the inline block: compaction at the same size.
    #[test]
    fn inline_table_compacts_in_place() {
        assert_eq!(plan(occ(2, 15, 16), ResizeRequest::GrowthCheck), Ok(Some(16)));
    }

    #[test]
    fn two_thirds_threshold() {
        // 42 * 3 = 126 < 128
        assert_eq!(plan(occ(42, 42, 64), ResizeRequest::GrowthCheck), Ok(None));
        // 43 * 3 = 129 >= 128, target 43*3/2+1 = 65 -> 128
        assert_eq!(plan(occ(43, 43, 64), ResizeRequest::GrowthCheck), Ok(Some(128)));
    }

    /// Tombstones count toward the threshold, live entries size the target.
    #[test]
    fn tombstone_heavy_table_shrinks() {
        assert_eq!(plan(occ(10, 43, 64), ResizeRequest::GrowthCheck), Ok(Some(16)));
        assert_eq!(plan(occ(20, 43, 64), ResizeRequest::GrowthCheck), Ok(Some(32)));
    }

    #[test]
    fn emptied_heap_table_returns_to_minimum() {
        assert_eq!(plan(occ(0, 10, 64), ResizeRequest::GrowthCheck), Ok(Some(16)));
    }

    #[test]
    fn reserve_is_noop_when_capacity_suffices() {
        assert_eq!(plan(occ(0, 0, 16), ResizeRequest::Reserve(16)), Ok(None));
        assert_eq!(plan(occ(0, 0, 16), ResizeRequest::Reserve(0)), Ok(None));
    }

    #[test]
    fn reserve_targets_three_halves() {
        // (100 * 3 + 1) / 2 = 150 -> 256
        assert_eq!(plan(occ(0, 0, 16), ResizeRequest::Reserve(100)), Ok(Some(256)));
        // (17 * 3 + 1) / 2 = 26 -> 32
        assert_eq!(plan(occ(0, 0, 16), ResizeRequest::Reserve(17)), Ok(Some(32)));
    }

    #[test]
    fn reserve_overflow() {
        assert_eq!(
            plan(occ(0, 0, 16), ResizeRequest::Reserve(usize::MAX)),
            Err(HashTabError::Overflow)
        );
    }

    #[test]
    fn capacity_for_rounds_up() {
        assert_eq!(capacity_for(0), Ok(16));
        assert_eq!(capacity_for(16), Ok(16));
        assert_eq!(capacity_for(17), Ok(32));
        assert_eq!(capacity_for(1000), Ok(1024));
        assert_eq!(capacity_for(usize::MAX), Err(HashTabError::Overflow));
    }
}
