// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! One key/value record in its own heap block.

use crate::layout::EntryLayout;
use crate::mem::Block;
use std::alloc::Layout;
use std::fmt;
use std::ptr::NonNull;

/// Owned entry block: `[key][pad][value]`, zero-filled on creation.
pub(crate) struct Entry {
    block: Block,
}

impl Entry {
    /// Allocate a zeroed entry. Aborts on allocation failure.
    pub(crate) fn new(block: Layout) -> Self {
        Self {
            block: Block::new(block),
        }
    }

    #[inline]
    pub(crate) fn base(&self) -> *mut u8 {
        self.block.as_ptr()
    }
}

/// Borrowed view of a live entry.
///
/// Pointers are computed with the same [`EntryLayout`] generated code uses,
/// so `key_ptr`/`value_ptr` are exactly what the direct-access path sees.
#[derive(Clone, Copy)]
pub struct EntryRef<'a> {
    entry: &'a Entry,
    layout: &'a EntryLayout,
}

impl<'a> EntryRef<'a> {
    pub(crate) fn new(entry: &'a Entry, layout: &'a EntryLayout) -> Self {
        Self { entry, layout }
    }

    /// Start of the entry block.
    #[inline]
    pub fn base(&self) -> NonNull<u8> {
        self.entry.block.as_non_null()
    }

    #[inline]
    pub fn key_ptr(&self) -> *mut u8 {
        // SAFETY: key_offset + key_size <= block size by construction.
        unsafe { self.entry.base().add(self.layout.key_offset) }
    }

    #[inline]
    pub fn value_ptr(&self) -> *mut u8 {
        // SAFETY: value_offset + value_size <= block size by construction.
        unsafe { self.entry.base().add(self.layout.value_offset) }
    }

    /// Raw key bytes.
    pub fn key_bytes(&self) -> &'a [u8] {
        // SAFETY: the block is live for 'a and holds key_size key bytes.
        unsafe { std::slice::from_raw_parts(self.key_ptr(), self.layout.key_size) }
    }

    /// Raw value bytes.
    pub fn value_bytes(&self) -> &'a [u8] {
        // SAFETY: as above, for the value region.
        unsafe { std::slice::from_raw_parts(self.value_ptr(), self.layout.value_size) }
    }
}

impl fmt::Debug for EntryRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryRef")
            .field("base", &self.base())
            .field("key", &self.key_bytes())
            .field("value", &self.value_bytes())
            .finish()
    }
}
