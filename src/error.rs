//! Error types for tree construction.
//!
//! Both error kinds are confined to [`FastTree`](crate::FastTree)
//! construction. Queries against a built tree cannot fail: every invariant
//! they rely on is established before the constructor returns.

use thiserror::Error;

/// Result type alias for fallible construction.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors reported while bulk-building a tree.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    /// The input key slice was empty. The tree requires at least one key.
    #[error("input key slice is empty")]
    InvalidInput,

    /// One of the owned allocations (layout image, rank map, or sorted-key
    /// copy) could not be satisfied.
    #[error("allocation of {bytes} bytes failed")]
    OutOfMemory {
        /// Size of the allocation that failed.
        bytes: usize,
    },
}
