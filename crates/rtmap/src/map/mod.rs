// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-erased map runtime.
//!
//! A map is a [`MapStore`]: a list of heap entries, each holding one key and
//! one value at offsets fixed by the map descriptor. Keys are compared with
//! the key type's equality algorithm, one entry at a time; there is no
//! hashing.
//!
//! An absent store (`None`) behaves as an empty map for [`length`],
//! [`lookup`] and [`delete`].

mod entry;
mod iter;
mod shared;
mod store;


pub use entry::EntryRef;
pub use iter::MapIterator;
pub use shared::SharedMap;
pub use store::MapStore;

use crate::error::Result;
use std::ptr::NonNull;

/// Live entry count; 0 for an absent store.
#[inline]
pub fn length(store: Option<&MapStore>) -> usize {
    store.map_or(0, MapStore::len)
}

/// Value slot for `key`; `None` for an absent store or key.
///
/// # Safety
///
/// `key` must point to a valid value of the store's key type.
pub unsafe fn lookup(store: Option<&MapStore>, key: *const u8) -> Result<Option<NonNull<u8>>> {
    match store {
        Some(store) => store.lookup(key),
        None => Ok(None),
    }
}

/// Remove `key`; a no-op on an absent store or key.
///
/// # Safety
///
/// `key` must point to a valid value of the store's key type.
pub unsafe fn delete(store: Option<&mut MapStore>, key: *const u8) -> Result<bool> {
    match store {
        Some(store) => store.delete(key),
        None => Ok(false),
    }
}
