//! String hash used to place keys in the table.
//!
//! Multiplicative fold over the key bytes: the first byte seeds the value,
//! every following byte is folded in as `hash * 101 + byte`. The result is
//! cached in each occupied slot so lookups and rebuilds never rehash a
//! stored key.

/// Hash value cached alongside every occupied slot.
pub type HashValue = u64;

/// Hash `key` deterministically. The empty string hashes to 0.
#[inline]
pub fn hash_key(key: &str) -> HashValue {
    let mut bytes = key.bytes();
    let Some(first) = bytes.next() else {
        return 0;
    };
    bytes.fold(HashValue::from(first), |hash, b| {
        hash.wrapping_mul(101).wrapping_add(HashValue::from(b))
    })
}
