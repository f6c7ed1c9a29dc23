// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Traversal over a [`MapStore`].

use super::entry::EntryRef;
use super::store::MapStore;
use crate::error::{Error, Result};
use crate::mem;
use crate::types::{identical, TypeRef};

/// Cursor over a store, positioned before the first entry.
///
/// There is no snapshot: the borrow of the store rules out mutation while
/// the iterator is alive.
#[derive(Debug, Clone)]
pub struct MapIterator<'a> {
    ty: TypeRef,
    store: Option<&'a MapStore>,
    cursor: usize,
    key_size: usize,
    value_size: usize,
}

impl<'a> MapIterator<'a> {
    /// Iterator for map type `ty` over `store` (`None` is an empty map).
    ///
    /// # Errors
    ///
    /// [`Error::NotAMap`] when `ty` is not a map descriptor,
    /// [`Error::TypeMismatch`] when it does not describe `store`.
    pub fn new(ty: TypeRef, store: Option<&'a MapStore>) -> Result<Self> {
        let map = ty.map_type().ok_or_else(|| Error::NotAMap {
            type_name: ty.string().to_string(),
        })?;
        match store {
            Some(store) => {
                let actual = store.type_descriptor();
                if !identical(ty, actual)? {
                    return Err(Error::TypeMismatch {
                        expected: actual.string().to_string(),
                        got: ty.string().to_string(),
                    });
                }
                Ok(Self::over(store))
            }
            None => Ok(Self {
                ty,
                store: None,
                cursor: 0,
                key_size: map.key.size(),
                value_size: map.elem.size(),
            }),
        }
    }

    pub(crate) fn over(store: &'a MapStore) -> Self {
        let layout = store.entry_layout();
        Self {
            ty: store.type_descriptor(),
            store: Some(store),
            cursor: 0,
            key_size: layout.key_size,
            value_size: layout.value_size,
        }
    }

    pub fn type_descriptor(&self) -> TypeRef {
        self.ty
    }

    /// Advance and return the next entry, `None` once exhausted.
    pub fn next_entry(&mut self) -> Option<EntryRef<'a>> {
        let entry = self.store?.entry_at(self.cursor)?;
        self.cursor += 1;
        Some(entry)
    }

    /// Entry the next call to [`MapIterator::next_entry`] would return.
    pub fn peek(&self) -> Option<EntryRef<'a>> {
        self.store?.entry_at(self.cursor)
    }

    /// Advance and copy the entry's key and value into caller buffers.
    ///
    /// Returns false once exhausted, in which case both buffers are
    /// zero-filled. Null buffers are skipped.
    ///
    /// # Safety
    ///
    /// Non-null `key_out` / `value_out` must be writable for the key / value
    /// size and must not overlap the store's entries.
    pub unsafe fn next_into(&mut self, key_out: *mut u8, value_out: *mut u8) -> bool {
        match self.next_entry() {
            Some(entry) => {
                if !key_out.is_null() {
                    mem::copy_bytes(key_out, entry.key_ptr(), self.key_size);
                }
                if !value_out.is_null() {
                    mem::copy_bytes(value_out, entry.value_ptr(), self.value_size);
                }
                true
            }
            None => {
                if !key_out.is_null() {
                    mem::zero_bytes(key_out, self.key_size);
                }
                if !value_out.is_null() {
                    mem::zero_bytes(value_out, self.value_size);
                }
                false
            }
        }
    }
}

impl<'a> Iterator for MapIterator<'a> {
    type Item = EntryRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self
            .store
            .map_or(0, |s| s.len().saturating_sub(self.cursor));
        (left, Some(left))
    }
}

impl ExactSizeIterator for MapIterator<'_> {}
