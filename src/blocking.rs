//! Block-shape constants for the hierarchically blocked layout.
//!
//! The layout nests three block granularities, each a complete binary
//! subtree sized for one level of the memory hierarchy:
//!
//! - SIMD block: depth 2, 3 keys. With 4-byte keys, 3 keys plus one pad
//!   lane fill a 128-bit register, so one lane-parallel compare resolves
//!   two tree levels.
//! - Cache-line block: depth 4, 15 keys, 60 bytes. Fits a 64-byte line.
//! - Page block: depth `d_P`, chosen at build time so the block fits one
//!   virtual-memory page (depth 10 for 4 KiB pages, 19 for 2 MiB pages).

/// Tree levels consumed by one SIMD comparison.
pub const SIMD_DEPTH: u32 = 2;

/// Keys per SIMD block: `2^SIMD_DEPTH - 1`.
pub const SIMD_KEYS: usize = 3;

/// Child subtrees below a SIMD block.
pub const SIMD_FANOUT: usize = 4;

/// Tree levels per cache-line block.
pub const CACHE_LINE_DEPTH: u32 = 4;

/// Keys per cache-line block: `2^CACHE_LINE_DEPTH - 1`.
pub const CACHE_LINE_KEYS: usize = 15;

/// Base alignment of the layout image.
pub const CACHE_LINE_BYTES: usize = 64;

/// Pad value for tree positions beyond the last real key.
///
/// Compares greater than every possible query, so traversal is steered
/// away from padded positions by the ordinary lane compare.
pub const SENTINEL: i32 = i32::MAX;

/// Decode table from a 3-bit greater-than mask to a child index.
///
/// Bit `i` of the mask is `query > block[i]` for a block stored in BFS
/// order `[root, left, right]`. Because `left < root < right` holds in
/// every well-formed block (sentinel padding included), only four mask
/// values can occur:
///
/// | mask  | meaning                        | child |
/// |-------|--------------------------------|-------|
/// | 0b000 | query <= left                  | 0     |
/// | 0b010 | left < query <= root           | 1     |
/// | 0b011 | root < query <= right          | 2     |
/// | 0b111 | query > right                  | 3     |
///
/// The remaining encodings would require `root < left` or `right < root`
/// and cannot arise from a correctly built block. They decode to child 0
/// so that a corrupted image can never produce an out-of-range offset.
pub const CHILD_OF_MASK: [u8; 8] = [0, 0, 1, 2, 0, 0, 0, 3];

/// Decode a greater-than mask into a child index in `0..4`.
#[inline(always)]
#[must_use]
pub fn child_of_mask(mask: u32) -> usize {
    CHILD_OF_MASK[(mask & 0x7) as usize] as usize
}

/// Largest page-block depth whose keys fit in `page_size` bytes.
///
/// Returns the largest `d >= 1` with `(2^d - 1) * 4 <= page_size`.
#[must_use]
pub fn page_block_depth(page_size: usize) -> u32 {
    let capacity = page_size / std::mem::size_of::<i32>();
    let mut depth = 1;
    while ((1usize << (depth + 1)) - 1) <= capacity {
        depth += 1;
    }
    depth
}

/// Runtime page size of the host, with a 4 KiB fallback.
#[must_use]
pub fn system_page_size() -> usize {
    #[cfg(unix)]
    {
        // SAFETY: sysconf with a valid name has no preconditions.
        let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if page > 0 {
            return page as usize;
        }
    }
    4096
}

/// Construction-time options.
///
/// The defaults are right for production use; the page-size override
/// exists so tests can shrink the page block and exercise page-boundary
/// traversal without building multi-million-key trees.
#[derive(Debug, Clone, Default)]
pub struct BuildConfig {
    /// Page size in bytes used to derive the page-block depth and the
    /// layout alignment. Must be a power of two. `None` queries the
    /// operating system.
    pub page_size: Option<usize>,
}
