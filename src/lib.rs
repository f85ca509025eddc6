//! hashtab: an open-addressing hash table of borrowed string keys, meant
//! to be embedded in a host program as a low-overhead string set.
//!
//! Internal Design:
//!
//! Summary
//! - One table, four pieces composed around a single slot array:
//!   - `storage`: a 16-slot inline block or a heap array, chosen by capacity.
//!   - `hash`: multiplicative byte fold, cached per slot.
//!   - `probe`: perturbed `5 * idx + 1` walk shared by lookup and rebuild.
//!   - `resize`: the growth/compaction decision; `HashTab` performs it.
//!
//! Constraints
//! - Single-threaded: no synchronization, no atomicity across calls.
//! - Keys are `&'k str` owned by the caller; the table never copies or
//!   frees them, and `remove` hands them back.
//! - Capacity is a power of two, never below 16.
//! - Duplicate adds fail with `DuplicateKey` and change nothing.
//!
//! Slots and tombstones
//! - Each slot is Empty, Tombstone or Occupied. Removal leaves a tombstone
//!   so probes keep walking past it; lookups of absent keys report the first
//!   tombstone on the path so the next insert reuses it.
//! - `used` counts live keys, `filled` live keys plus tombstones. Rebuilds
//!   drop tombstones and reset `filled` to `used`.
//!
//! Growth and compaction
//! - After every add and removal: small inline tables with two or more
//!   Empty slots are left alone; otherwise once `filled` reaches two thirds
//!   of the capacity the table is rebuilt at the smallest power of two that
//!   holds `used * 3 / 2 + 1`. That may grow it, shrink it, or compact it in
//!   place.
//! - A rebuild that cannot allocate leaves the table untouched and marks it;
//!   while marked, `add_item` fails immediately. Only a later successful
//!   rebuild clears the mark.
//!
//! Slot references and locking
//! - `find`/`lookup` return a `SlotRef` snapshot tied to the current
//!   layout. `add_item`/`remove` panic on a ref from before a rebuild.
//! - `lock`/`unlock` nest; while locked no rebuild happens, which keeps
//!   refs valid across removals. The final `unlock` runs the deferred check.
//!
//! Frozen tables
//! - A frozen table refuses `remove`. Adding is not gated; callers that
//!   need that check `check_frozen` first.

mod error;
mod hash;
mod hash_tab;
mod hash_tab_proptest;
mod lock;
#[cfg(feature = "bench_internal")]
pub mod probe;
#[cfg(not(feature = "bench_internal"))]
mod probe;
mod resize;
mod slot;
mod storage;

// Public surface
pub use error::HashTabError;
pub use hash::{hash_key, HashValue};
pub use hash_tab::{HashTab, Iter};
pub use lock::LockGuard;
pub use slot::SlotRef;
pub use storage::MIN_CAPACITY;
