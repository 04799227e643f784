//! The arena: process-wide state for one pool, and the public operations
//! over it (`alloc`, `calloc`, `realloc`, `free`, `size_of`, `check`, `log`).
//!
//! `PoolArena` owns no memory of its own — it layers a free-list structure
//! onto a caller-supplied byte region and never calls back into an
//! underlying allocator after [`PoolArena::init`].

use crate::block;
use crate::error::PoolError;
use crate::free_list;
use crate::geometry::{self, W};
use std::ptr;

/// Sentinel returned by [`PoolArena::alloc`] when no free block fits the
/// request. Distinct from any legitimate payload address (`-1` cast to a
/// pointer); `calloc`/`realloc` translate it to null.
pub const INVALID_PTR: *mut u8 = usize::MAX as *mut u8;

/// One pool arena: a free-list allocator over the half-open byte interval
/// `[base, base + len)`.
///
/// # Invariants
///
/// - I1: every block's `size` is a positive multiple of `W`.
/// - I2: an allocated block's `size` is at least `W`.
/// - I3: a free block's `size` is at least `2 * W`.
/// - I4: the free list is strictly address-ordered.
/// - I5: no two free-list neighbors are address-adjacent (they would have
///   been merged).
/// - I6: `allocated_bytes + free_bytes + W * live_block_count == len` (see
///   [`PoolArena::check`] for the externally observable form of this).
/// - I7: the cursor always points at a live free block while any free space
///   remains.
/// - I8: every block start address is `W`-aligned.
///
/// `PoolArena` is not `Send` or `Sync`: nothing here synchronizes concurrent
/// access, by design — callers sharing an arena across threads must wrap it
/// in their own mutex.
#[derive(Debug, PartialEq)]
pub struct PoolArena {
    base: *mut u8,
    len: usize,
    /// `len - W`, matching the accounting base the original C implementation
    /// uses in its free-space audit (see `check`).
    pool_size: usize,
    allocated_bytes: usize,
    free_bytes: usize,
    live_allocations: usize,
    cursor: *mut u8,
}

impl PoolArena {
    /// Establishes an arena over `[base, base + n)`.
    ///
    /// Fails with [`PoolError::BadInit`] if `base` is null or `n` is too
    /// small to hold a single free block's header (`n <= 3 * W`).
    pub fn init(base: *mut u8, n: usize) -> Result<Self, PoolError> {
        if base.is_null() || n <= geometry::FREE_HEADER {
            return Err(PoolError::BadInit);
        }

        let free_bytes = n - W;
        unsafe {
            ptr::write(
                block::as_free(base),
                block::FreeHeader::new(free_bytes, ptr::null_mut(), ptr::null_mut()),
            );
        }

        log::trace!("pool init: base={base:p} len={n} free_bytes={free_bytes}");

        Ok(Self {
            base,
            len: n,
            pool_size: n - W,
            allocated_bytes: 0,
            free_bytes,
            live_allocations: 0,
            cursor: base,
        })
    }

    /// Allocates `size` payload bytes using first-fit search from the
    /// cursor. A zero-byte request returns null, not the sentinel — tests
    /// require a zero request to yield no block at all.
    ///
    /// Returns [`INVALID_PTR`] when no free block is large enough.
    pub fn alloc(&mut self, size: usize) -> *mut u8 {
        if size == 0 {
            return ptr::null_mut();
        }
        match self.try_alloc(geometry::round_up(size)) {
            Ok(ptr) => ptr,
            Err(PoolError::OutOfSpace) => INVALID_PTR,
            Err(other) => unreachable!("try_alloc only raises OutOfSpace: {other}"),
        }
    }

    /// The fallible core of [`PoolArena::alloc`]: first-fit search, split,
    /// and bookkeeping, propagating [`PoolError::OutOfSpace`] instead of
    /// returning a sentinel. `alloc` maps that error to [`INVALID_PTR`] at
    /// the public boundary.
    fn try_alloc(&mut self, s: usize) -> Result<*mut u8, PoolError> {
        let chosen = unsafe { free_list::find_fit(self.cursor, s) }.ok_or_else(|| {
            log::debug!("alloc: no fit for {s} bytes, free_bytes={}", self.free_bytes);
            PoolError::OutOfSpace
        })?;

        let ptr = unsafe {
            let (_old_size, residual) = free_list::split(chosen, s);
            (*block::as_alloc(chosen)).size = s;
            self.cursor = residual;
            chosen.add(W)
        };

        self.allocated_bytes += s;
        self.free_bytes -= W + s;
        self.live_allocations += 1;

        debug_assert!(self.invariants_hold(), "alloc({s}) broke free-list invariants");
        Ok(ptr)
    }

    /// `alloc` followed by zeroing the normalized payload. Returns null on
    /// failure (the request was zero, or the arena had no fit).
    pub fn calloc(&mut self, size: usize) -> *mut u8 {
        let p = self.alloc(size);
        if p.is_null() || p == INVALID_PTR {
            return ptr::null_mut();
        }
        let n = self.size_of(p);
        unsafe { ptr::write_bytes(p, 0, n) };
        p
    }

    /// Allocates a new buffer of `size` bytes, copies
    /// `min(size_of(old), size_of(new))` bytes from `old`, then frees `old`.
    ///
    /// If the new allocation fails, `old` is left untouched and null is
    /// returned.
    pub fn realloc(&mut self, old: *mut u8, size: usize) -> *mut u8 {
        let new_ptr = self.alloc(size);
        if new_ptr.is_null() || new_ptr == INVALID_PTR {
            return ptr::null_mut();
        }
        let copy_len = self.size_of(old).min(self.size_of(new_ptr));
        unsafe { ptr::copy_nonoverlapping(old, new_ptr, copy_len) };
        self.free(old);
        new_ptr
    }

    /// Releases the payload at `ptr`, merging with whichever free-list
    /// neighbors are address-contiguous.
    ///
    /// # Safety (contract, not an `unsafe fn`)
    ///
    /// `ptr` must have been returned by `alloc`/`calloc`/`realloc` on this
    /// arena and not already freed. Passing any other pointer is undefined
    /// behavior — the core does not validate membership. A null `ptr` is a
    /// no-op.
    pub fn free(&mut self, ptr: *mut u8) -> i32 {
        if ptr.is_null() {
            return 0;
        }

        unsafe {
            let b = ptr.sub(W);
            let freed_size = (*block::as_alloc(b)).size;
            self.live_allocations -= 1;

            let (prev, next) = free_list::neighbors_for(self.cursor, b);
            free_list::link_in(b, freed_size, prev, next);

            let mut addr = b;

            let linked_next = (*block::as_free(addr)).next;
            if !linked_next.is_null() {
                let end = addr.add(W + (*block::as_free(addr)).size);
                if end == linked_next {
                    self.free_bytes += free_list::absorb_next(addr) as usize;
                }
            }

            let linked_prev = (*block::as_free(addr)).prev;
            if !linked_prev.is_null() {
                let prev_end = linked_prev.add(W + (*block::as_free(linked_prev)).size);
                if prev_end == addr {
                    let (survivor, reclaimed) = free_list::absorb_into_prev(addr, linked_prev);
                    self.free_bytes += reclaimed;
                    addr = survivor;
                }
            }

            self.free_bytes += freed_size;
            self.cursor = addr;
        }

        debug_assert!(self.invariants_hold(), "free() broke free-list invariants");
        0
    }

    /// Reads the normalized allocation size stored at `ptr`'s header.
    pub fn size_of(&self, ptr: *mut u8) -> usize {
        unsafe { (*block::as_alloc(ptr.sub(W))).size }
    }

    /// Audits the whole-arena accounting: walks the free list in both
    /// directions from the cursor, summing `size` fields, and checks that
    /// `free_bytes + in_use == pool_size - W * live_allocations`.
    ///
    /// `in_use` is the caller's own record of payload bytes currently in
    /// use; this lets a test harness corroborate its bookkeeping against
    /// the arena's. Returns 0 on success, a nonzero diagnostic code
    /// otherwise.
    pub fn check(&self, in_use: usize) -> i32 {
        match self.try_check(in_use) {
            Ok(()) => 0,
            Err(PoolError::Corruption) => 1,
            Err(other) => unreachable!("try_check only raises Corruption: {other}"),
        }
    }

    /// The fallible core of [`PoolArena::check`], propagating
    /// [`PoolError::Corruption`] instead of a bare diagnostic code.
    fn try_check(&self, in_use: usize) -> Result<(), PoolError> {
        let total_free = unsafe { free_list::walk_total(self.cursor) };
        let expected = self.pool_size.wrapping_sub(W * self.live_allocations);
        if total_free + in_use == expected {
            return Ok(());
        }
        log::warn!(
            "check({in_use}) failed: total_free={total_free} expected={expected} \
             (pool_size={}, live_allocations={})",
            self.pool_size,
            self.live_allocations
        );
        Err(PoolError::Corruption)
    }

    /// Emits a diagnostic dump of the arena's free list through the `log`
    /// crate at debug level: one line per free node, then a summary line.
    pub fn log(&self) {
        log::debug!(
            "pool arena: base={:p} len={} pool_size={} allocated_bytes={} free_bytes={} live_allocations={}",
            self.base,
            self.len,
            self.pool_size,
            self.allocated_bytes,
            self.free_bytes,
            self.live_allocations
        );

        if self.cursor.is_null() {
            log::debug!("  free list: empty");
            return;
        }

        let mut count = 0usize;
        unsafe {
            let mut node = self.cursor;
            loop {
                let hdr = &*block::as_free(node);
                log::debug!(
                    "  free block addr={node:p} size={} prev={:p} next={:p}",
                    hdr.size,
                    hdr.prev,
                    hdr.next
                );
                count += 1;
                if hdr.prev.is_null() {
                    break;
                }
                node = hdr.prev;
            }
            let mut node = (*block::as_free(self.cursor)).next;
            while !node.is_null() {
                let hdr = &*block::as_free(node);
                log::debug!(
                    "  free block addr={node:p} size={} prev={:p} next={:p}",
                    hdr.size,
                    hdr.prev,
                    hdr.next
                );
                count += 1;
                node = hdr.next;
            }
        }
        log::debug!("  free node count={count}");
    }

    /// Debug-only walk verifying I4/I5/I8: the free list, read left to
    /// right, has strictly increasing, non-adjacent, word-aligned blocks.
    #[cfg(debug_assertions)]
    fn invariants_hold(&self) -> bool {
        if self.cursor.is_null() {
            return true;
        }
        unsafe {
            let mut node = self.cursor;
            while !(*block::as_free(node)).prev.is_null() {
                node = (*block::as_free(node)).prev;
            }

            let mut prev_end: Option<usize> = None;
            loop {
                let hdr = &*block::as_free(node);
                if (node as usize) % W != 0 {
                    return false;
                }
                if hdr.size % W != 0 || hdr.size == 0 {
                    return false;
                }
                if let Some(end) = prev_end {
                    if (node as usize) <= end {
                        return false;
                    }
                }
                prev_end = Some(node as usize + W + hdr.size);
                if hdr.next.is_null() {
                    break;
                }
                node = hdr.next;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_arena(len: usize) -> (Vec<u8>, PoolArena) {
        let mut region = vec![0u8; len];
        let base = region.as_mut_ptr();
        let arena = PoolArena::init(base, len).expect("init should succeed");
        (region, arena)
    }

    #[test]
    fn init_rejects_null_base() {
        assert_eq!(PoolArena::init(ptr::null_mut(), 1024), Err(PoolError::BadInit));
    }

    #[test]
    fn init_rejects_too_small_region() {
        let mut buf = [0u8; 4];
        let err = PoolArena::init(buf.as_mut_ptr(), geometry::FREE_HEADER);
        assert_eq!(err.err(), Some(PoolError::BadInit));
    }

    #[test]
    fn zero_size_alloc_returns_null_and_check_passes() {
        let (_region, mut arena) = new_arena(1024);
        assert!(arena.alloc(0).is_null());
        assert_eq!(arena.check(0), 0);
    }

    #[test]
    fn sub_word_and_word_allocs_are_word_sized_and_ordered() {
        let (_region, mut arena) = new_arena(1024);
        let p0 = arena.alloc(W - 1);
        let p1 = arena.alloc(W);
        assert!(!p0.is_null() && p0 != INVALID_PTR);
        assert!(!p1.is_null() && p1 != INVALID_PTR);
        assert!((p1 as usize) > (p0 as usize));
        assert_eq!(arena.size_of(p0), W);
        assert_eq!(arena.size_of(p1), W);
    }

    #[test]
    fn alloc_free_round_trip_reuses_space() {
        let (_region, mut arena) = new_arena(1024);
        let p = arena.alloc(10 * W);
        assert!(!p.is_null() && p != INVALID_PTR);
        assert_eq!(arena.free(p), 0);
        assert_eq!(arena.check(0), 0);
        let p2 = arena.alloc(10 * W);
        assert!(!p2.is_null() && p2 != INVALID_PTR);
    }

    #[test]
    fn exhausted_arena_returns_sentinel() {
        let (_region, mut arena) = new_arena(1024);
        assert!(!arena.alloc(512).is_null());
        assert_eq!(arena.alloc(1024), INVALID_PTR);
    }

    #[test]
    fn freeing_both_neighbors_merges_into_one_block() {
        let (_region, mut arena) = new_arena(4096);
        let a = arena.alloc(64);
        let b = arena.alloc(64);
        let c = arena.alloc(64);
        assert_eq!(arena.free(a), 0);
        assert_eq!(arena.free(c), 0);
        assert_eq!(arena.free(b), 0);
        assert_eq!(arena.check(0), 0);
        // the whole middle region should be reclaimed as one block, large
        // enough to satisfy a request spanning all three original chunks.
        let reclaimed = arena.alloc(3 * 64 + 2 * W);
        assert!(!reclaimed.is_null() && reclaimed != INVALID_PTR);
    }

    #[test]
    fn calloc_zeroes_the_payload() {
        let (_region, mut arena) = new_arena(1024);
        let p = arena.calloc(64);
        assert!(!p.is_null());
        let slice = unsafe { std::slice::from_raw_parts(p, arena.size_of(p)) };
        assert!(slice.iter().all(|&b| b == 0));
    }

    #[test]
    fn calloc_on_exhausted_arena_returns_null_not_sentinel() {
        let (_region, mut arena) = new_arena(128);
        assert!(!arena.calloc(64).is_null());
        assert!(arena.calloc(1024).is_null());
    }

    #[test]
    fn realloc_preserves_data_and_grows() {
        let (_region, mut arena) = new_arena(4096);
        let p = arena.alloc(32);
        unsafe {
            std::ptr::write_bytes(p, 0xAB, 32);
        }
        let grown = arena.realloc(p, 256);
        assert!(!grown.is_null() && grown != INVALID_PTR);
        let slice = unsafe { std::slice::from_raw_parts(grown, 32) };
        assert!(slice.iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn realloc_failure_preserves_old_pointer() {
        let (_region, mut arena) = new_arena(256);
        let p = arena.alloc(32);
        unsafe {
            std::ptr::write_bytes(p, 0x5A, 32);
        }
        let result = arena.realloc(p, 4096);
        assert!(result.is_null());
        let slice = unsafe { std::slice::from_raw_parts(p, 32) };
        assert!(slice.iter().all(|&b| b == 0x5A));
    }
}
