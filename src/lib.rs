//! # fastree
//!
//! A read-only search tree over a sorted array of signed 32-bit keys,
//! laid out for the memory hierarchy rather than for comparison count.
//!
//! The tree answers *predecessor* queries (largest key `<= q`) and
//! *lower-bound* queries (smallest key `>= q`), returning indices into
//! the original sorted order.
//!
//! ## Design
//!
//! - The sorted input is spread over a padded complete binary tree and
//!   stored in a hierarchically blocked permutation: depth-2 SIMD blocks
//!   inside depth-4 cache-line blocks inside page-sized blocks. Four
//!   tree levels cost one cache line; a whole page block costs one TLB
//!   entry.
//! - Traversal resolves two levels per step with a single lane-parallel
//!   compare and a table lookup, tracking one linear offset. There is no
//!   per-node branching and no pointer chasing.
//! - A rank map ties every layout position back to its sorted index, so
//!   the final answer is settled with a bounded scan instead of a fresh
//!   search.
//!
//! The structure is immutable after construction and safe to query from
//! any number of threads concurrently.
//!
//! ## Example
//!
//! ```
//! use fastree::FastTree;
//!
//! let tree = FastTree::new(&[2, 4, 6, 8, 10, 12, 14])?;
//! assert_eq!(tree.search_predecessor(9), 3);
//! assert_eq!(tree.search_predecessor(14), 6);
//! assert_eq!(tree.search_predecessor(1), -1);
//! assert_eq!(tree.search_lower_bound(9), 4);
//! # Ok::<(), fastree::BuildError>(())
//! ```

pub mod error;

mod alloc;
mod blocking;
mod build;
mod prefetch;
mod rank;
mod resolve;
mod search;
mod simd;
mod tracing_helpers;
mod tree;

pub use blocking::BuildConfig;
pub use error::{BuildError, Result};
pub use tree::FastTree;
