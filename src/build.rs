//! Layout builder: the hierarchical blocked permutation.
//!
//! Construction turns the sorted input into two parallel arrays of
//! `2^depth - 1` entries:
//!
//! - the layout image, holding the padded tree's keys in blocked order,
//! - the rank map, holding each layout position's in-order rank (which is
//!   exactly its index in the sorted input), or `n` for padded positions.
//!
//! The blocked order is defined by one recursion per granularity. A
//! subtree is emitted by writing its top block and then each child
//! subtree, consecutively:
//!
//! - SIMD level: write the top two levels in BFS order (3 slots), then
//!   the 4 child subtrees, each recursively at SIMD level.
//! - Cache-line level: emit the top four levels at SIMD level (15
//!   slots), then the 16 child subtrees, each at cache-line level.
//! - Page level: emit the top `page_depth` levels at cache-line level,
//!   then the `2^page_depth` child subtrees, each at page level.
//!
//! Subtrees that fit inside the current block depth fall through to the
//! next finer level, so the innermost recursion always bottoms out at a
//! BFS write of at most 3 slots. Two properties follow and the traversal
//! depends on both:
//!
//! - every recursion unit over a depth-`r` subtree occupies exactly
//!   `2^r - 1` contiguous slots, and
//! - a block's slot offset is a fixed function of the path into it, so
//!   the base alignment carries cache-line blocks onto 64-byte
//!   boundaries and page blocks onto page boundaries.
//!
//! Keys and ranks are derived per node from the closed-form in-order
//! rank, so no intermediate BFS image is materialized.

use crate::alloc::LayoutBuf;
use crate::blocking::{
    page_block_depth, CACHE_LINE_BYTES, CACHE_LINE_DEPTH, SIMD_DEPTH, SIMD_FANOUT,
};
use crate::error::{BuildError, Result};
use crate::rank::{inorder_rank, level_first, padded_nodes, tree_depth};
use crate::tracing_helpers::debug_log;

/// Everything the builder hands to the tree handle.
#[derive(Debug)]
pub struct BuiltLayout {
    /// Blocked key image, `padded_nodes(depth)` slots.
    pub image: LayoutBuf,
    /// Per-slot in-order rank, `n` marking padded slots.
    pub ranks: Box<[u32]>,
    /// Depth of the padded tree.
    pub depth: u32,
    /// Page-block depth derived from the page size.
    pub page_depth: u32,
}

/// Build the blocked layout for `keys` under the given page size.
///
/// `keys` must be non-empty and sorted ascending; the caller validates
/// both. `page_size` must be a power of two.
pub fn build(keys: &[i32], page_size: usize) -> Result<BuiltLayout> {
    debug_assert!(!keys.is_empty());
    debug_assert!(keys.len() < u32::MAX as usize);

    let n = keys.len();
    let depth = tree_depth(n);
    let slots = padded_nodes(depth);
    let page_depth = page_block_depth(page_size);

    // Cache-line alignment suffices while the whole tree fits in a few
    // lines; deeper trees want the page-block starts on page boundaries.
    let align = if depth > CACHE_LINE_DEPTH {
        page_size.max(CACHE_LINE_BYTES)
    } else {
        CACHE_LINE_BYTES
    };

    let mut image = LayoutBuf::new(slots, align)?;
    let mut ranks: Vec<u32> = Vec::new();
    ranks
        .try_reserve_exact(slots)
        .map_err(|_| BuildError::OutOfMemory {
            bytes: slots * std::mem::size_of::<u32>(),
        })?;

    let mut emitter = Emitter {
        keys,
        depth,
        page_depth,
        image: &mut image,
        ranks: &mut ranks,
        cursor: 0,
    };
    emitter.emit_page(0, depth);
    debug_assert_eq!(emitter.cursor, slots);
    debug_assert_eq!(ranks.len(), slots);

    debug_log!(
        n,
        depth,
        page_depth,
        slots,
        bytes = image.allocated_bytes(),
        align = image.align(),
        "layout built"
    );

    Ok(BuiltLayout {
        image,
        ranks: ranks.into_boxed_slice(),
        depth,
        page_depth,
    })
}

/// Sequential writer for the blocked emission.
///
/// `cursor` is the next free slot; every recursion writes its subtree's
/// slots contiguously from there.
struct Emitter<'a> {
    keys: &'a [i32],
    depth: u32,
    page_depth: u32,
    image: &'a mut LayoutBuf,
    ranks: &'a mut Vec<u32>,
    cursor: usize,
}

impl Emitter<'_> {
    fn emit_page(&mut self, root: usize, depth: u32) {
        if depth <= self.page_depth {
            self.emit_cache_line(root, depth);
            return;
        }
        self.emit_cache_line(root, self.page_depth);
        let first = level_first(root, self.page_depth);
        for child in 0..(1usize << self.page_depth) {
            self.emit_page(first + child, depth - self.page_depth);
        }
    }

    fn emit_cache_line(&mut self, root: usize, depth: u32) {
        if depth <= CACHE_LINE_DEPTH {
            self.emit_simd(root, depth);
            return;
        }
        self.emit_simd(root, CACHE_LINE_DEPTH);
        let first = level_first(root, CACHE_LINE_DEPTH);
        for child in 0..(1usize << CACHE_LINE_DEPTH) {
            self.emit_cache_line(first + child, depth - CACHE_LINE_DEPTH);
        }
    }

    fn emit_simd(&mut self, root: usize, depth: u32) {
        if depth <= SIMD_DEPTH {
            self.write_bfs(root, depth);
            return;
        }
        self.write_bfs(root, SIMD_DEPTH);
        let first = level_first(root, SIMD_DEPTH);
        for child in 0..SIMD_FANOUT {
            self.emit_simd(first + child, depth - SIMD_DEPTH);
        }
    }

    /// Write the top `depth` levels below `root` in BFS order.
    fn write_bfs(&mut self, root: usize, depth: u32) {
        for level in 0..depth {
            let first = level_first(root, level);
            for node in first..first + (1usize << level) {
                self.write_node(node);
            }
        }
    }

    fn write_node(&mut self, bfs: usize) {
        let rank = inorder_rank(bfs, self.depth);
        if rank < self.keys.len() {
            self.image[self.cursor] = self.keys[rank];
            self.ranks.push(rank as u32);
        } else {
            // Slot already holds the sentinel from allocation.
            self.ranks.push(self.keys.len() as u32);
        }
        self.cursor += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocking::SENTINEL;

    fn sequential_keys(n: usize) -> Vec<i32> {
        (0..n).map(|i| i as i32 * 2).collect()
    }

    /// Non-sentinel positions must map bijectively onto the sorted input.
    fn check_rank_bijection(built: &BuiltLayout, keys: &[i32]) {
        let n = keys.len();
        let mut seen = vec![false; n];
        for (pos, &rank) in built.ranks.iter().enumerate() {
            let rank = rank as usize;
            if rank < n {
                assert!(!seen[rank], "rank {rank} appears twice");
                seen[rank] = true;
                assert_eq!(built.image[pos], keys[rank], "position {pos}");
            } else {
                assert_eq!(rank, n);
                assert_eq!(built.image[pos], SENTINEL, "position {pos}");
            }
        }
        assert!(seen.iter().all(|&hit| hit), "some rank never emitted");
    }

    #[test]
    fn every_small_size_round_trips() {
        for n in 1..=80 {
            let keys = sequential_keys(n);
            let built = build(&keys, 4096).unwrap();
            assert_eq!(built.depth, tree_depth(n));
            assert_eq!(built.image.len(), padded_nodes(built.depth));
            assert_eq!(built.ranks.len(), built.image.len());
            check_rank_bijection(&built, &keys);
        }
    }

    #[test]
    fn small_page_sizes_round_trip() {
        // A 128-byte page gives page depth 5, so even modest trees cross
        // page-block boundaries.
        for n in [30, 31, 32, 33, 63, 64, 200, 1023, 1024] {
            let keys = sequential_keys(n);
            let built = build(&keys, 128).unwrap();
            assert_eq!(built.page_depth, 5);
            check_rank_bijection(&built, &keys);
        }
    }

    #[test]
    fn depth_two_block_is_bfs_ordered() {
        // Three keys: one SIMD block holding [root, left, right].
        let built = build(&[10, 20, 30], 4096).unwrap();
        assert_eq!(&built.image[..], &[20, 10, 30]);
        assert_eq!(&built.ranks[..], &[1, 0, 2]);
    }

    #[test]
    fn depth_three_pads_with_sentinels() {
        // Five keys in a depth-3 tree: ranks 5 and 6 are padding.
        let built = build(&[5, 5, 5, 5, 5], 4096).unwrap();
        assert_eq!(&built.image[..], &[5, 5, SENTINEL, 5, 5, 5, SENTINEL]);
        assert_eq!(&built.ranks[..], &[3, 1, 5, 0, 2, 4, 5]);
    }

    #[test]
    fn depth_six_nests_cache_line_blocks() {
        // 63 keys: a depth-4 top block of 15 slots, then 16 depth-2
        // child blocks of 3 slots each.
        let keys: Vec<i32> = (0..63).collect();
        let built = build(&keys, 4096).unwrap();
        // Top block root is the tree median.
        assert_eq!(built.image[0], 31);
        // First child block after the top 15 slots is the leftmost
        // depth-2 subtree: in-order ranks 0..3.
        assert_eq!(&built.image[15..18], &[1, 0, 2]);
        // Next sibling covers ranks 4..7.
        assert_eq!(&built.image[18..21], &[5, 4, 6]);
        check_rank_bijection(&built, &keys);
    }

    #[test]
    fn alignment_follows_depth() {
        // Shallow tree: cache-line alignment.
        let shallow = build(&sequential_keys(15), 4096).unwrap();
        assert_eq!(shallow.image.align(), 64);
        // Deep tree: page alignment.
        let deep = build(&sequential_keys(16), 4096).unwrap();
        assert_eq!(deep.image.align(), 4096);
    }
}
