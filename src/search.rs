//! Traversal engine over the blocked layout.
//!
//! The walk mirrors the builder's recursion with three nested loops, one
//! per block granularity, all driven by a single linear offset into the
//! layout image:
//!
//! - the page loop traverses one page block at a time, then jumps to the
//!   chosen page-level child subtree;
//! - the region loop traverses the cache-line blocks inside one
//!   cache-line-level emission, jumping between sibling units;
//! - the unit loop resolves a SIMD-level unit of at most four levels,
//!   two levels per lane compare, one level per scalar compare when the
//!   unit depth is odd.
//!
//! Every jump lands on the start of a recursion unit, and a unit over a
//! depth-`r` subtree is exactly `2^r - 1` contiguous slots, so each jump
//! is `block_end + child_index * (2^r - 1)` with the child index
//! accumulated from the block decisions above it. No pointer chasing, no
//! per-node branches.
//!
//! The loop exits with the offset of the last block examined, the child
//! index that would have been taken next, and the block flavor. The
//! resolver turns that triple into a sorted-array index.

use crate::alloc::LayoutBuf;
use crate::blocking::{child_of_mask, CACHE_LINE_DEPTH, CACHE_LINE_KEYS, SIMD_DEPTH, SIMD_KEYS};
use crate::prefetch::prefetch_read;
use crate::simd;

/// Flavor of the last block a traversal examined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    /// Three-key SIMD block; child index is in `0..4`.
    Simd,
    /// Single-key block (odd tree depth); child index is in `0..2`.
    Single,
}

/// Traversal endpoint handed to the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafProbe {
    /// Layout offset of the last examined block.
    pub offset: usize,
    /// Child index that would have been taken next.
    pub child: usize,
    /// Flavor of the last examined block.
    pub kind: LeafKind,
}

/// Walk the tree for `query` and return the leaf probe.
///
/// `depth` and `page_depth` must describe the layout the image was built
/// with. The walk touches no memory outside the image and allocates
/// nothing.
#[must_use]
pub fn descend(image: &LayoutBuf, depth: u32, page_depth: u32, query: i32) -> LeafProbe {
    let mut remaining = depth;
    let mut base = 0usize;

    // Page loop: whole page blocks, then a jump to the page-level child.
    while remaining > page_depth {
        let (page_child, _) = descend_region(image, base, page_depth, query);
        let child_slots = (1usize << (remaining - page_depth)) - 1;
        base += ((1usize << page_depth) - 1) + page_child * child_slots;
        // SAFETY: `base` indexes a live slot; hint only.
        prefetch_read(unsafe { image.as_ptr().add(base) });
        remaining -= page_depth;
    }

    let (_, probe) = descend_region(image, base, remaining, query);
    probe
}

/// Traverse one cache-line-level emission of `span` levels at `base`.
///
/// Returns the accumulated child index in `0..2^span` (the position of
/// the chosen subtree among the emission's children) together with the
/// last block probe.
fn descend_region(image: &LayoutBuf, mut base: usize, span: u32, query: i32) -> (usize, LeafProbe) {
    debug_assert!(span >= 1);
    let mut levels_left = span;
    let mut acc = 0usize;

    // Cache-line loop: full blocks of four levels, then a jump to the
    // chosen cache-line-level child unit.
    while levels_left > CACHE_LINE_DEPTH {
        let (block_child, _) = descend_unit(image, base, CACHE_LINE_DEPTH, query);
        acc = (acc << CACHE_LINE_DEPTH) | block_child;
        let child_slots = (1usize << (levels_left - CACHE_LINE_DEPTH)) - 1;
        base += CACHE_LINE_KEYS + block_child * child_slots;
        // SAFETY: `base` indexes a live slot; hint only.
        prefetch_read(unsafe { image.as_ptr().add(base) });
        levels_left -= CACHE_LINE_DEPTH;
    }

    let (unit_child, probe) = descend_unit(image, base, levels_left, query);
    ((acc << levels_left) | unit_child, probe)
}

/// Resolve a SIMD-level unit of `span` levels (1 to 4) at `offset`.
///
/// Inside a unit the children of every block follow it directly, so the
/// step is the plain compact-subtree jump
/// `offset + block_keys + child * (2^r - 1)`.
fn descend_unit(image: &LayoutBuf, mut offset: usize, span: u32, query: i32) -> (usize, LeafProbe) {
    debug_assert!((1..=CACHE_LINE_DEPTH).contains(&span));
    let mut levels_left = span;
    let mut acc = 0usize;

    loop {
        if levels_left >= SIMD_DEPTH {
            // SAFETY: `offset` indexes a live slot and the image
            // guarantees 16 readable bytes from any slot.
            let mask = unsafe { simd::gt_mask(image.as_ptr().add(offset), query) };
            let child = child_of_mask(mask);
            acc = (acc << SIMD_DEPTH) | child;
            levels_left -= SIMD_DEPTH;
            if levels_left == 0 {
                return (
                    acc,
                    LeafProbe {
                        offset,
                        child,
                        kind: LeafKind::Simd,
                    },
                );
            }
            offset += SIMD_KEYS + child * ((1usize << levels_left) - 1);
        } else {
            let child = usize::from(query > image[offset]);
            return (
                (acc << 1) | child,
                LeafProbe {
                    offset,
                    child,
                    kind: LeafKind::Single,
                },
            );
        }
    }
}
