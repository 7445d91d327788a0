//! Lane-parallel comparison for one SIMD block.
//!
//! A SIMD block stores a depth-2 complete subtree as three consecutive
//! keys `[root, left, right]`. One 128-bit load picks up the three keys
//! plus one pad lane, one lane-wise signed greater-than compares all of
//! them against the broadcast query, and the sign-bit extraction yields a
//! 3-bit mask that the decode table turns into a child index. Two tree
//! levels resolve without a single conditional branch.
//!
//! # Architecture Support
//!
//! - **`x86_64`**: SSE2 path (baseline on this architecture, no runtime
//!   detection needed).
//! - **Other**: scalar path building the identical mask.
//!
//! Both paths are semantically equivalent and the scalar path stays
//! compiled on every target so the equivalence is testable.

// ============================================================================
//  Dispatch
// ============================================================================

/// Greater-than mask for the block at `block`: bit `i` set iff
/// `query > block[i]`, for `i` in `0..3`.
///
/// # Safety
///
/// `block` must be valid for a 16-byte read. The layout buffer
/// guarantees this for every in-bounds slot via its tail padding.
#[inline(always)]
#[must_use]
pub unsafe fn gt_mask(block: *const i32, query: i32) -> u32 {
    #[cfg(all(target_arch = "x86_64", not(miri)))]
    {
        // SAFETY: SSE2 is baseline on x86_64; caller upholds the read
        // contract.
        unsafe { sse2_impl::gt_mask_sse2(block, query) }
    }

    #[cfg(not(all(target_arch = "x86_64", not(miri))))]
    {
        // SAFETY: caller upholds the read contract.
        unsafe { gt_mask_scalar(block, query) }
    }
}

// ============================================================================
//  Scalar path (always compiled)
// ============================================================================

/// Scalar mask construction, bit-identical to the vector path.
///
/// # Safety
///
/// `block` must be valid for reads of three `i32` values.
#[inline(always)]
#[must_use]
#[allow(dead_code)] // dispatch target off x86_64, equivalence oracle on it
pub unsafe fn gt_mask_scalar(block: *const i32, query: i32) -> u32 {
    // SAFETY: caller guarantees three readable keys.
    let (root, left, right) = unsafe { (*block, *block.add(1), *block.add(2)) };
    u32::from(query > root) | (u32::from(query > left) << 1) | (u32::from(query > right) << 2)
}

// ============================================================================
//  SSE2 path (x86_64)
// ============================================================================

#[cfg(target_arch = "x86_64")]
mod sse2_impl {
    use std::arch::x86_64::{
        __m128i, _mm_castsi128_ps, _mm_cmpgt_epi32, _mm_loadu_si128, _mm_movemask_ps,
        _mm_set1_epi32,
    };

    /// Vector mask construction: broadcast, compare, extract sign bits.
    ///
    /// `_mm_movemask_ps` returns the sign bit of each 32-bit lane with
    /// lane 0 (the block root) in bit 0, so the mask comes out already in
    /// decode-table order. The fourth lane is masked off; it holds
    /// whatever padding follows the block.
    ///
    /// # Safety
    ///
    /// `block` must be valid for a 16-byte unaligned read.
    #[inline]
    #[target_feature(enable = "sse2")]
    pub unsafe fn gt_mask_sse2(block: *const i32, query: i32) -> u32 {
        unsafe {
            let v_query = _mm_set1_epi32(query);
            let v_block = _mm_loadu_si128(block.cast::<__m128i>());
            let v_gt = _mm_cmpgt_epi32(v_query, v_block);
            (_mm_movemask_ps(_mm_castsi128_ps(v_gt)) as u32) & 0x7
        }
    }
}

// ============================================================================
//  Tests
// ============================================================================
