// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Raw memory primitives.
//!
//! Thin wrappers over `std::alloc` and `std::ptr`. Allocation failure is
//! fatal: [`allocate`] never returns null, it aborts.

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

/// Allocate a zero-filled block. Aborts on allocation failure.
///
/// `layout` must have a non-zero size.
#[must_use]
pub fn allocate(layout: Layout) -> NonNull<u8> {
    debug_assert!(layout.size() > 0);
    // SAFETY: layout has a non-zero size (asserted above, guaranteed by
    // EntryLayout::block which rounds zero up to one byte).
    let raw = unsafe { alloc::alloc_zeroed(layout) };
    match NonNull::new(raw) {
        Some(block) => block,
        None => {
            log::error!("[mem] allocation of {} bytes failed", layout.size());
            alloc::handle_alloc_error(layout)
        }
    }
}

/// Release a block obtained from [`allocate`].
///
/// # Safety
///
/// `block` must come from [`allocate`] with the same `layout` and must not be
/// used afterwards.
pub unsafe fn free(block: NonNull<u8>, layout: Layout) {
    alloc::dealloc(block.as_ptr(), layout);
}

/// Copy `n` bytes between non-overlapping regions.
///
/// # Safety
///
/// `src` must be readable and `dst` writable for `n` bytes; the regions must
/// not overlap.
#[inline]
pub unsafe fn copy_bytes(dst: *mut u8, src: *const u8, n: usize) {
    ptr::copy_nonoverlapping(src, dst, n);
}

/// Copy `n` bytes between possibly overlapping regions.
///
/// # Safety
///
/// `src` must be readable and `dst` writable for `n` bytes.
#[inline]
pub unsafe fn move_bytes(dst: *mut u8, src: *const u8, n: usize) {
    ptr::copy(src, dst, n);
}

/// Zero `n` bytes.
///
/// # Safety
///
/// `dst` must be writable for `n` bytes.
#[inline]
pub unsafe fn zero_bytes(dst: *mut u8, n: usize) {
    ptr::write_bytes(dst, 0, n);
}

/// Owned raw block, freed on drop.
pub struct Block {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl Block {
    /// Allocate a zero-filled block. Aborts on allocation failure.
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self {
            ptr: allocate(layout),
            layout,
        }
    }

    /// Base address.
    #[inline]
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Base address, non-null.
    #[inline]
    pub fn as_non_null(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Allocation layout.
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        // SAFETY: ptr was returned by allocate(self.layout) and is freed once.
        unsafe { free(self.ptr, self.layout) };
    }
}

// SAFETY: Block exclusively owns its allocation; nothing else aliases it.
unsafe impl Send for Block {}
