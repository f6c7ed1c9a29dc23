// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Array-backed, type-erased map store.
//!
//! Entries live in a `Vec` in insertion order. Lookup is a linear scan using
//! the key type's equality algorithm; delete removes and shifts so the
//! survivors keep their relative order.

use super::entry::{Entry, EntryRef};
use super::iter::MapIterator;
use crate::alg;
use crate::config;
use crate::error::{Error, Result};
use crate::layout::EntryLayout;
use crate::mem;
use crate::types::{MapType, TypeRef};
use std::alloc::Layout;
use std::fmt;
use std::ptr::NonNull;

/// Map instance for one map descriptor.
///
/// `MapStore` owns its entries and may move between threads, but has no
/// internal locking (see [`super::SharedMap`]).
///
/// # Example
///
/// ```rust
/// use rtmap::types::{builtin, TypeBuilder};
/// use rtmap::{Kind, MapStore};
///
/// let ty = TypeBuilder::map(builtin(Kind::Int32).unwrap(), builtin(Kind::Float64).unwrap())
///     .build()
///     .unwrap();
/// let mut store = MapStore::new(ty).unwrap();
///
/// let (key, value) = (7i32, 2.5f64);
/// unsafe {
///     store
///         .assign((&key as *const i32).cast(), Some((&value as *const f64).cast()))
///         .unwrap();
///     let slot = store.lookup((&key as *const i32).cast()).unwrap().unwrap();
///     assert_eq!(*slot.cast::<f64>().as_ptr(), 2.5);
/// }
/// assert_eq!(store.len(), 1);
/// ```
pub struct MapStore {
    ty: TypeRef,
    map: MapType,
    layout: EntryLayout,
    block: Layout,
    entries: Vec<Entry>,
}

impl MapStore {
    /// Create an empty store for the map descriptor `ty`.
    ///
    /// # Errors
    ///
    /// [`Error::NotAMap`] when `ty` is not a map descriptor,
    /// [`Error::Incomparable`] when its key type has no equality.
    pub fn new(ty: TypeRef) -> Result<Self> {
        let map = ty.map_type().ok_or_else(|| Error::NotAMap {
            type_name: ty.string().to_string(),
        })?;
        if !map.key.alg().is_comparable() {
            return Err(Error::Incomparable {
                type_name: map.key.string().to_string(),
            });
        }
        let layout = EntryLayout::new(
            (map.key.size(), map.key.align()),
            (map.elem.size(), map.elem.align()),
        )
        .map_err(|e| match e {
            Error::InvalidLayout { reason, .. } => Error::InvalidLayout {
                type_name: ty.string().to_string(),
                reason,
            },
            other => other,
        })?;
        let block = layout.block()?;
        let capacity = config::global().entry_capacity;
        log::debug!(
            "[map] new {} (entry {} bytes, key@{} value@{})",
            ty,
            layout.size,
            layout.key_offset,
            layout.value_offset
        );
        Ok(Self {
            ty,
            map,
            layout,
            block,
            entries: Vec::with_capacity(capacity),
        })
    }

    /// Map descriptor this store was created for.
    #[inline]
    pub fn type_descriptor(&self) -> TypeRef {
        self.ty
    }

    #[inline]
    pub fn key_type(&self) -> TypeRef {
        self.map.key
    }

    #[inline]
    pub fn elem_type(&self) -> TypeRef {
        self.map.elem
    }

    /// Byte placement shared by every entry of this store.
    #[inline]
    pub fn entry_layout(&self) -> &EntryLayout {
        &self.layout
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the entry whose key equals the key at `key`.
    /// A probe with no equality is rejected even when nothing is stored.
    unsafe fn position(&self, key: *const u8) -> Result<Option<usize>> {
        alg::check_comparable(self.map.key, key)?;
        for (i, entry) in self.entries.iter().enumerate() {
            let stored = entry.base().add(self.layout.key_offset);
            if alg::equal(self.map.key, stored, key)? {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// Value slot for `key`, if present.
    ///
    /// # Safety
    ///
    /// `key` must point to a valid value of the key type.
    pub unsafe fn lookup(&self, key: *const u8) -> Result<Option<NonNull<u8>>> {
        Ok(self
            .position(key)?
            .and_then(|i| NonNull::new(self.entries[i].base().add(self.layout.value_offset))))
    }

    /// Value slot for `key`, inserting a zero-filled entry on a miss when
    /// `insert` is set.
    ///
    /// The returned slot stays valid until the store is next mutated.
    ///
    /// # Errors
    ///
    /// [`Error::Incomparable`] when the key holds a value with no equality,
    /// even on an empty store; nothing is inserted.
    ///
    /// # Safety
    ///
    /// `key` must point to a valid value of the key type.
    pub unsafe fn lookup_or_insert(
        &mut self,
        key: *const u8,
        insert: bool,
    ) -> Result<Option<NonNull<u8>>> {
        if let Some(slot) = self.lookup(key)? {
            return Ok(Some(slot));
        }
        if !insert {
            return Ok(None);
        }
        let entry = Entry::new(self.block);
        mem::copy_bytes(
            entry.base().add(self.layout.key_offset),
            key,
            self.layout.key_size,
        );
        let value = entry.base().add(self.layout.value_offset);
        self.entries.push(entry);
        log::trace!("[map] {} insert, len={}", self.ty, self.entries.len());
        Ok(NonNull::new(value))
    }

    /// Insert-or-update with `Some(value)`, delete with `None`.
    ///
    /// # Safety
    ///
    /// `key` must point to a valid key; `value`, when given, must be readable
    /// for the element size.
    pub unsafe fn assign(&mut self, key: *const u8, value: Option<*const u8>) -> Result<()> {
        match value {
            Some(src) => {
                if let Some(slot) = self.lookup_or_insert(key, true)? {
                    mem::move_bytes(slot.as_ptr(), src, self.layout.value_size);
                }
                Ok(())
            }
            None => self.delete(key).map(|_| ()),
        }
    }

    /// Remove the entry for `key`. Returns false (and does nothing) when the
    /// key is absent.
    ///
    /// # Safety
    ///
    /// `key` must point to a valid value of the key type.
    pub unsafe fn delete(&mut self, key: *const u8) -> Result<bool> {
        match self.position(key)? {
            Some(i) => {
                // Dropping the entry frees its block.
                drop(self.entries.remove(i));
                log::trace!("[map] {} delete, len={}", self.ty, self.entries.len());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Entry at `index` in traversal order.
    pub fn entry_at(&self, index: usize) -> Option<EntryRef<'_>> {
        self.entries
            .get(index)
            .map(|entry| EntryRef::new(entry, &self.layout))
    }

    /// Direct-access traversal step.
    ///
    /// A cursor of 0 starts at the first entry; the returned cursor is passed
    /// back to fetch the following one. `None` marks the end.
    pub fn next_entry(&self, cursor: usize) -> Option<(usize, EntryRef<'_>)> {
        self.entry_at(cursor).map(|entry| (cursor + 1, entry))
    }

    /// Traverse all entries in insertion order.
    pub fn iter(&self) -> MapIterator<'_> {
        MapIterator::over(self)
    }
}

impl<'a> IntoIterator for &'a MapStore {
    type Item = EntryRef<'a>;
    type IntoIter = MapIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for MapStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapStore")
            .field("type", &self.ty.string())
            .field("len", &self.entries.len())
            .field("layout", &self.layout)
            .finish()
    }
}
