//! Errors the safe layer of [`crate::PoolArena`](crate::arena::PoolArena) can raise.
//!
//! The public, FFI-flavored entry points described alongside each method
//! translate these into the sentinel values their callers expect (negative
//! ints, the reserved sentinel pointer, null); the variants below exist so
//! the internal control flow reads as ordinary `Result`-propagating Rust.

use std::fmt;

/// Failure kinds surfaced by [`PoolArena`](crate::arena::PoolArena) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// `init` was given a null base pointer or a length too small to hold a
    /// single free-block header.
    BadInit,
    /// No free block satisfied the first-fit predicate.
    OutOfSpace,
    /// A free-list walk uncovered a size-accounting mismatch.
    ///
    /// Detection is best-effort: most corruption is simply undefined
    /// behavior, per the allocator's contract.
    Corruption,
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::BadInit => write!(f, "arena init: null base or length too small"),
            PoolError::OutOfSpace => write!(f, "arena alloc: no free block large enough"),
            PoolError::Corruption => write!(f, "arena check: free-space accounting mismatch"),
        }
    }
}

impl std::error::Error for PoolError {}
