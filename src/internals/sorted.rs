//! Sorted-sequence operations: binary search and sorted insertion.

use std::cmp::Ordering;

use super::Link;

/// Binary search `node` for `item` using `compare`.
///
/// Returns `Ok(index)` if an element comparing equal was found, or
/// `Err(index)` with the insertion point that keeps the sequence sorted,
/// the same two's-complement convention as `[T]::binary_search`.
pub fn binary_search<E, F>(node: &Link<E>, compare: F) -> Result<usize, usize>
where
    F: Fn(&E) -> Ordering,
{
    let mut lo = 0usize;
    let mut hi = node.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let elem = node.get(mid).expect("mid is within [lo, hi) <= len");
        match compare(elem) {
            Ordering::Equal => return Ok(mid),
            Ordering::Less => lo = mid + 1,
            Ordering::Greater => hi = mid,
        }
    }
    Err(lo)
}
