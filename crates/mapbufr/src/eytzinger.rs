//! Eytzinger (BFS heap) layout: the permutation and the point-query search
//! that replace sorted-array binary search in the on-disk index.
//!
//! Reordering a sorted array into breadth-first heap order — root at slot 1,
//! children of slot `k` at `2k` and `2k+1` — puts the nodes a search visits
//! first in the same cache lines, trading the sorted array's worst-case
//! cache-miss-per-level for roughly `log(B)` fewer misses at block size `B`.

/// Build the permutation mapping a 0-indexed ascending-sorted sequence of
/// length `n` into Eytzinger (1-indexed BFS) order.
///
/// `out[k - 1]` holds the sorted-sequence index that the canonical search
/// (see [`search_by`]) visits at 1-indexed slot `k`. Implemented iteratively
/// with an explicit stack: the recursive in-order walk (visit left child,
/// emit current, visit right child) has depth `⌈log2(n)⌉ + 1`, bounded but
/// re-expressed here to avoid native stack growth on pathological inputs.
#[must_use]
pub fn permutation(n: usize) -> Vec<usize> {
    let mut out = vec![0usize; n];
    let mut next_sorted = 0usize;

    // Explicit-stack in-order walk of the implicit 1-indexed heap of size n.
    // Frame state: the heap slot `k`, and whether its left child has
    // already been pushed (so we know to emit `k` or descend right next).
    enum Step {
        Enter(usize),
        Emit(usize),
    }

    let mut stack = Vec::with_capacity(2 * (usize::BITS as usize - n.leading_zeros() as usize + 1));
    if n > 0 {
        stack.push(Step::Enter(1));
    }

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(k) => {
                if k > n {
                    continue;
                }
                // Post-order-ish: push right, push "emit self", push left,
                // so popping yields left, emit, right.
                stack.push(Step::Enter(2 * k + 1));
                stack.push(Step::Emit(k));
                stack.push(Step::Enter(2 * k));
            }
            Step::Emit(k) => {
                out[k - 1] = next_sorted;
                next_sorted += 1;
            }
        }
    }

    out
}

/// Permute `sorted` (ascending, 0-indexed) into Eytzinger order using the
/// permutation produced by [`permutation`].
#[must_use]
pub fn permute<T: Clone>(sorted: &[T]) -> Vec<T> {
    let perm = permutation(sorted.len());
    perm.into_iter().map(|i| sorted[i].clone()).collect()
}

/// Search an Eytzinger-ordered slice for `target`, extracting the
/// comparison key from each element via `key_of`.
///
/// Returns the 0-indexed slot in `eytzinger` holding `target`, or `None` if
/// `target` is not present. Implements the branchless descent: at each
/// level, `k = 2k + (E[k-1] < target)`; on loop exit, `k` is corrected by
/// clearing its trailing run of set bits (and the zero above them) via the
/// "find first set of `!k`" step, then decremented to a 0-index. The
/// candidate is validated with an equality check, so the walk tolerates the
/// same off-by-one slack whether or not the backing array is padded past
/// its logical length.
#[must_use]
pub fn search_by<T, K, F>(eytzinger: &[T], target: &K, key_of: F) -> Option<usize>
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    let n = eytzinger.len();
    let mut k = 1usize;
    while k <= n {
        let less = key_of(&eytzinger[k - 1]) < *target;
        k = 2 * k + usize::from(less);
    }
    // Clear the trailing run of 1-bits and the 0 above it: shift right by
    // ffs(!k), the 1-based position of `!k`'s lowest set bit.
    let shift = (!k).trailing_zeros() + 1;
    k >>= shift;
    if k == 0 {
        return None;
    }
    let idx = k - 1;
    if idx < n && key_of(&eytzinger[idx]) == *target {
        Some(idx)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eytzinger_ok(n: usize) -> bool {
        // An inorder walk of the heap (left, emit, right) must reproduce
        // 0..n in ascending order when read back through the permutation.
        let perm = permutation(n);
        perm.len() == n && {
            let mut seen: Vec<usize> = perm.clone();
            seen.sort_unstable();
            seen == (0..n).collect::<Vec<_>>()
        }
    }

    #[test]
    fn permutation_is_a_bijection_on_0_n() {
        for n in 0..200 {
            assert!(eytzinger_ok(n), "permutation({n}) is not a bijection");
        }
    }

    #[test]
    fn search_finds_every_stored_key_and_rejects_absent_keys() {
        for n in [0usize, 1, 2, 3, 7, 8, 9, 100, 255, 256, 1000] {
            let sorted: Vec<u64> = (0..n as u64).map(|i| i * 2).collect();
            let eytzinger = permute(&sorted);

            for &key in &sorted {
                let found = search_by(&eytzinger, &key, |k| *k);
                assert_eq!(found.map(|i| eytzinger[i]), Some(key));
            }
            for probe in [1u64, 3, 5, n as u64 * 2 + 1] {
                assert_eq!(search_by(&eytzinger, &probe, |k| *k), None);
            }
        }
    }

    #[test]
    fn search_over_key_offset_pairs() {
        let sorted: Vec<(u64, u64)> = (0..50u64).map(|i| (i * 3, i * 100)).collect();
        let eytzinger = permute(&sorted);
        for &(key, offset) in &sorted {
            let idx = search_by(&eytzinger, &key, |(k, _)| *k).unwrap();
            assert_eq!(eytzinger[idx].1, offset);
        }
        assert!(search_by(&eytzinger, &1u64, |(k, _)| *k).is_none());
    }
}
