//! Triangular numbering of unordered pairs.
//!
//! The pair `{i, j}` with `i > j` has index `i(i-1)/2 + j`, so all pairs
//! among the first `i` items come before any pair involving item `i`.
//! Decoding inverts this with an exact integer square root: `i` is the
//! largest integer with `i(i-1)/2 <= index`, which is equivalent to
//! `2i - 1 <= isqrt(8 * index + 1)`.

use crate::PdError;

/// Number of unordered pairs among `n` items.
pub fn pair_count(n: usize) -> u64 {
    let n = n as u64;
    if n < 2 {
        return 0;
    }
    // One of n and n - 1 is even.
    let (a, b) = if n % 2 == 0 { (n / 2, n - 1) } else { (n, (n - 1) / 2) };
    a.saturating_mul(b)
}

pub fn encode(i: usize, j: usize) -> Result<u64, PdError> {
    if i <= j {
        return Err(PdError::config(format!("pair ({}, {}) must satisfy i > j", i, j)));
    }
    let i = i as u64;
    i.checked_mul(i - 1)
        .map(|t| t / 2)
        .and_then(|t| t.checked_add(j as u64))
        .ok_or_else(|| PdError::config(format!("pair ({}, {}) overflows the index space", i, j)))
}

pub fn decode(index: u64, n: usize) -> Result<(usize, usize), PdError> {
    if n < 2 {
        return Err(PdError::config(format!("need at least 2 items to form a pair, got {}", n)));
    }
    if index >= pair_count(n) {
        return Err(PdError::config(format!("pair index {} out of range for {} items", index, n)));
    }

    let root = (8 * index as u128 + 1).isqrt();
    let i = (root + 1) / 2;
    let j = index as u128 - i * (i - 1) / 2;
    debug_assert!(j < i);
    Ok((i as usize, j as usize))
}
