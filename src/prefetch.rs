//! Software prefetch hint for block jumps.
//!
//! Crossing a cache-line or page block boundary lands the traversal on
//! memory it has not touched yet. Issuing the fetch hint as soon as the
//! jump target is known lets the line travel while the current step
//! finishes decoding.

/// Hint that the cache line at `ptr` is about to be read.
///
/// Prefetch is advisory: the CPU may ignore it, and no fault is raised
/// for addresses that are not mapped. On architectures without a stable
/// prefetch intrinsic this is a no-op.
#[inline(always)]
pub fn prefetch_read<T>(ptr: *const T) {
    #[cfg(all(target_arch = "x86_64", not(miri)))]
    {
        // SAFETY: _mm_prefetch is a hint and has no memory preconditions.
        unsafe {
            std::arch::x86_64::_mm_prefetch(ptr.cast::<i8>(), std::arch::x86_64::_MM_HINT_T0);
        }
    }

    #[cfg(not(all(target_arch = "x86_64", not(miri))))]
    {
        let _ = ptr;
    }
}
