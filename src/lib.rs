//! # pool_arena — a pool arena allocator over one pre-acquired byte region
//!
//! `pool_arena` sub-allocates variable-sized chunks out of a single
//! contiguous region of bytes handed to it once at startup, and never calls
//! back into an underlying allocator afterwards. It targets constrained
//! environments — a bare-metal target with no kernel, or a host process
//! that wants to sub-allocate inside one pre-reserved buffer — where
//! predictability and freedom from syscalls matter more than multi-threaded
//! scalability.
//!
//! ## Overview
//!
//! ```text
//!   Arena byte region, after a few alloc()/free() calls:
//!
//!   ┌───────┬───────┬────────────────────┬───────┬───────┬───────┬──────┐
//!   │Block 0│Block 1│     Free Space     │Block 3│ Free  │Block 4│ .... │
//!   └───────┴───────┴────────────────────┴───────┴───────┴───────┴──────┘
//! ```
//!
//! Every block starts with a size word. Allocated blocks carry only that
//! word; free blocks additionally carry `prev`/`next` links, threading an
//! address-ordered doubly linked list through the arena's own bytes:
//!
//! ```text
//!                     Free block                In-use block
//!
//!                 ┌────────────────┐         ┌────────────────┐
//!                 │      size      │         │      size      │
//!                 ├────────────────┤         ├────────────────┤
//!                 │  next block ptr│         │                │
//!                 ├────────────────┤         │    payload     │
//!                 │  prev block ptr│         │                │
//!                 ├────────────────┤         │                │
//!                 │      ....      │         │                │
//!                 └────────────────┘         └────────────────┘
//! ```
//!
//! ## Crate structure
//!
//! ```text
//!   pool_arena
//!   ├── geometry    - word width, header sizes, round_up
//!   ├── block       - header views cast over raw arena bytes (internal)
//!   ├── free_list   - address-ordered list operations: search, split, merge
//!   ├── arena       - PoolArena: init/alloc/calloc/realloc/free/size_of/check/log
//!   └── error       - PoolError
//! ```
//!
//! ## Quick start
//!
//! ```
//! use pool_arena::PoolArena;
//!
//! let mut region = vec![0u8; 4096];
//! let mut arena = PoolArena::init(region.as_mut_ptr(), region.len()).unwrap();
//!
//! let p = arena.alloc(64) as *mut u64;
//! assert!(!p.is_null());
//! unsafe {
//!     *p = 42;
//!     assert_eq!(*p, 42);
//! }
//! arena.free(p as *mut u8);
//! ```
//!
//! ## Allocation strategy
//!
//! `alloc` walks the free list first-fit, starting at an internal cursor
//! that drifts toward larger residuals as allocations and releases
//! interleave, searching toward lower addresses before wrapping to higher
//! ones. A block is carved from the low end of whichever free block fits;
//! the residual inherits the chosen block's links and becomes the new
//! cursor.
//!
//! `free` locates the freed block's place in the address-ordered list and
//! merges it with whichever neighbor(s) — low side, high side, or both —
//! turn out to be address-contiguous.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no internal synchronization; share an arena
//!   across threads by wrapping it in your own mutex.
//! - **No secure erase**: `free` never clears payload bytes.
//! - **Best-effort corruption detection**: `free` does not validate that its
//!   pointer belongs to the arena; passing an invalid pointer is undefined
//!   behavior, matching the allocator's documented contract.
//!
//! ## Safety
//!
//! This crate is inherently unsafe: it manages raw memory by casting byte
//! addresses to header views and back. The public surface accepts and
//! returns raw pointers; callers are responsible for pointer provenance
//! (never passing a pointer to `free`/`realloc`/`size_of` that this arena
//! did not hand out).

mod arena;
mod block;
pub mod error;
mod free_list;
pub mod geometry;

pub use arena::{INVALID_PTR, PoolArena};
pub use error::PoolError;
