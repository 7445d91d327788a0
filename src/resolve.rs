//! Leaf resolver: from a traversal endpoint to a sorted-array index.
//!
//! The walk narrows the predecessor to the in-order neighborhood of one
//! bottom block. Within a bottom SIMD block the three keys occupy three
//! consecutive in-order ranks, so the rank map seeds an index at most a
//! few positions below the answer and a short forward scan settles the
//! rest. The scan bound exceeds the block width, which covers every
//! off-by-one a block partition can introduce.
//!
//! Equal-key runs longer than a block are the one case a constant scan
//! cannot finish. When the scan budget is exhausted with the next key
//! still not above the query, the run is longer than the block and the
//! resolver hops straight to its end with one upper-bound search on the
//! sorted copy. Unique-key queries never take that path.

use crate::search::{LeafKind, LeafProbe};

/// Forward-scan budget after seeding from a SIMD block.
const SIMD_SCAN_STEPS: u32 = 3;

/// Forward-scan budget after seeding from a single-key block.
const SINGLE_SCAN_STEPS: u32 = 2;

/// Resolve a probe into the index of the largest key `<= query`, or `-1`
/// when every key is greater.
///
/// `ranks` and `keys` must come from the same build as the probe.
#[must_use]
pub fn resolve_predecessor(probe: LeafProbe, ranks: &[u32], keys: &[i32], query: i32) -> i64 {
    let n = keys.len() as i64;

    let (seed, budget) = match probe.kind {
        LeafKind::Simd => {
            // Block keys sit at consecutive in-order ranks t-1, t, t+1
            // for [left, root, right]; the child partition pins where
            // the query fell relative to them.
            let seed = match probe.child {
                0 => i64::from(ranks[probe.offset + 1]) - 1,
                1 => i64::from(ranks[probe.offset + 1]),
                2 => i64::from(ranks[probe.offset]),
                _ => i64::from(ranks[probe.offset + 2]),
            };
            (seed, SIMD_SCAN_STEPS)
        }
        LeafKind::Single => {
            let seed = match probe.child {
                0 => i64::from(ranks[probe.offset]) - 1,
                _ => i64::from(ranks[probe.offset]),
            };
            (seed, SINGLE_SCAN_STEPS)
        }
    };

    let mut index = seed.clamp(-1, n - 1);
    for _ in 0..budget {
        let next = index + 1;
        if next >= n || keys[next as usize] > query {
            return index;
        }
        index = next;
    }

    // Scan budget exhausted inside an equal-key run; finish at its end.
    if index + 1 < n && keys[(index + 1) as usize] <= query {
        index = keys.partition_point(|&k| k <= query) as i64 - 1;
    }
    index
}

/// Index of the smallest key `>= query`, or `keys.len()` when every key
/// is smaller. Plain binary search on the sorted copy.
#[inline]
#[must_use]
pub fn lower_bound(keys: &[i32], query: i32) -> i64 {
    keys.partition_point(|&k| k < query) as i64
}
