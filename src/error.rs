//! Errors reported by table operations.

use thiserror::Error;

/// Failure of a table operation. The table stays consistent after every one.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashTabError {
    /// `add` found the key already present; nothing changed.
    #[error("key is already present in the table")]
    DuplicateKey,
    /// A rebuild could not allocate its new storage. The table is marked and
    /// refuses further `add_item` calls until some rebuild succeeds.
    #[error("failed to allocate table storage; insertions blocked until a rebuild succeeds")]
    AllocationFailure,
    /// `remove` on a frozen table; nothing changed.
    #[error("table is frozen; removal is not allowed")]
    FrozenTable,
    /// The requested capacity does not fit a power of two in `usize`.
    #[error("required table capacity overflows")]
    Overflow,
}
