//! Public tree handle.
//!
//! [`FastTree`] owns the three allocations produced by construction (the
//! blocked layout image, the rank map, and the sorted-key copy), created
//! together and released together on drop. After construction the tree
//! is immutable: queries take `&self`, touch read-only state, allocate
//! nothing, and are freely shareable across threads.

use crate::blocking::{system_page_size, BuildConfig};
use crate::build::{self, BuiltLayout};
use crate::error::{BuildError, Result};
use crate::resolve;
use crate::search;

/// Read-only predecessor index over a sorted array of `i32` keys.
///
/// Built once from a non-empty, ascending key sequence; duplicates are
/// allowed. Queries return indices into the original sorted order, so
/// the index doubles as the hook for any caller-side associated data.
///
/// # Examples
///
/// ```
/// use fastree::FastTree;
///
/// let tree = FastTree::new(&[2, 4, 6, 8, 10, 12, 14])?;
/// assert_eq!(tree.search_predecessor(9), 3);
/// assert_eq!(tree.search_predecessor(1), -1);
/// assert_eq!(tree.search_lower_bound(9), 4);
/// assert_eq!(tree.key_at(3), 8);
/// # Ok::<(), fastree::BuildError>(())
/// ```
pub struct FastTree {
    built: BuiltLayout,
    keys: Box<[i32]>,
}

impl FastTree {
    /// Build a tree from a sorted slice of keys.
    ///
    /// The slice must be non-decreasing; that contract is checked in
    /// debug builds only. Fails with [`BuildError::InvalidInput`] on an
    /// empty slice and [`BuildError::OutOfMemory`] when an allocation
    /// cannot be satisfied. No partial state survives a failure.
    pub fn new(keys: &[i32]) -> Result<Self> {
        Self::with_config(keys, &BuildConfig::default())
    }

    /// Build a tree with explicit construction options.
    pub fn with_config(keys: &[i32], config: &BuildConfig) -> Result<Self> {
        if keys.is_empty() {
            return Err(BuildError::InvalidInput);
        }
        debug_assert!(
            keys.windows(2).all(|pair| pair[0] <= pair[1]),
            "keys must be sorted ascending"
        );

        let page_size = config.page_size.unwrap_or_else(system_page_size);
        let built = build::build(keys, page_size)?;
        let keys = copy_keys(keys)?;
        Ok(Self { built, keys })
    }

    /// Index of the largest key `<= query`, or `-1` when `query` is
    /// smaller than every key.
    #[must_use]
    pub fn search_predecessor(&self, query: i32) -> i64 {
        let last = self.keys[self.keys.len() - 1];
        if query < self.keys[0] {
            return -1;
        }
        if query >= last {
            return self.keys.len() as i64 - 1;
        }

        let probe = search::descend(
            &self.built.image,
            self.built.depth,
            self.built.page_depth,
            query,
        );
        resolve::resolve_predecessor(probe, &self.built.ranks, &self.keys, query)
    }

    /// Index of the smallest key `>= query`, or `len()` when `query` is
    /// greater than every key.
    #[must_use]
    pub fn search_lower_bound(&self, query: i32) -> i64 {
        resolve::lower_bound(&self.keys, query)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false: construction rejects empty input.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key at `index` in the original sorted order.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    pub fn key_at(&self, index: usize) -> i32 {
        assert!(index < self.keys.len(), "index {index} out of range");
        self.keys[index]
    }
}

impl std::fmt::Debug for FastTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastTree")
            .field("len", &self.keys.len())
            .field("depth", &self.built.depth)
            .field("page_depth", &self.built.page_depth)
            .finish()
    }
}

/// Fallible copy of the input keys.
fn copy_keys(keys: &[i32]) -> Result<Box<[i32]>> {
    let mut copy: Vec<i32> = Vec::new();
    copy.try_reserve_exact(keys.len())
        .map_err(|_| BuildError::OutOfMemory {
            bytes: keys.len() * std::mem::size_of::<i32>(),
        })?;
    copy.extend_from_slice(keys);
    Ok(copy.into_boxed_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn tree_is_send_sync() {
        assert_send_sync::<FastTree>();
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = FastTree::new(&[]).unwrap_err();
        assert_eq!(err, BuildError::InvalidInput);
    }

    #[test]
    fn single_key_tree() {
        let tree = FastTree::new(&[42]).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.search_predecessor(42), 0);
        assert_eq!(tree.search_predecessor(10), -1);
        assert_eq!(tree.search_predecessor(100), 0);
        assert_eq!(tree.search_lower_bound(42), 0);
        assert_eq!(tree.search_lower_bound(43), 1);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn key_at_rejects_out_of_range() {
        let tree = FastTree::new(&[1, 2, 3]).unwrap();
        let _ = tree.key_at(3);
    }

    #[test]
    fn queries_are_deterministic() {
        let keys: Vec<i32> = (0..100).map(|i| i * 3).collect();
        let tree = FastTree::new(&keys).unwrap();
        for query in -5..310 {
            let first = tree.search_predecessor(query);
            assert_eq!(first, tree.search_predecessor(query));
        }
    }

    #[test]
    fn concurrent_readers_agree() {
        let keys: Vec<i32> = (0..1000).map(|i| i * 2).collect();
        let tree = std::sync::Arc::new(FastTree::new(&keys).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let tree = std::sync::Arc::clone(&tree);
                std::thread::spawn(move || {
                    for i in (worker..1000).step_by(4) {
                        assert_eq!(tree.search_predecessor(i as i32 * 2), i as i64);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn debug_output_names_the_shape() {
        let tree = FastTree::new(&[1, 2, 3]).unwrap();
        let rendered = format!("{tree:?}");
        assert!(rendered.contains("len: 3"));
        assert!(rendered.contains("depth: 2"));
    }
}
