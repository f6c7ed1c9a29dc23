// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Introspection access to maps.
//!
//! Runtime reflection knows a map only through its descriptor, so every call
//! here takes the map descriptor explicitly and checks it against the store.
//! Iteration follows the reflection protocol: [`mapiterinit`] lands on the
//! first entry, [`mapiterkey`] reads the current one, [`mapiternext`] moves
//! on.
//!
//! # Example
//!
//! ```rust
//! use rtmap::reflect::{self, IWord};
//! use rtmap::types::{builtin, TypeBuilder};
//! use rtmap::Kind;
//!
//! let ty = TypeBuilder::map(builtin(Kind::Bool).unwrap(), builtin(Kind::Int32).unwrap())
//!     .build()
//!     .unwrap();
//! let mut m = reflect::makemap(ty).unwrap();
//! unsafe {
//!     let (k, v) = (true, 3i32);
//!     reflect::mapassign(ty, Some(&mut m), (&k as *const bool).cast(), Some((&v as *const i32).cast()))
//!         .unwrap();
//! }
//! let it = reflect::mapiterinit(ty, Some(&m)).unwrap();
//! match reflect::mapiterkey(&it) {
//!     Some(IWord::Value(word)) => assert_eq!(word.to_ne_bytes()[0], 1),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

use crate::config::POINTER_SIZE;
use crate::error::{Error, Result};
use crate::map::{EntryRef, MapIterator, MapStore};
use crate::mem;
use crate::types::{identical, TypeRef};
use std::ptr::NonNull;

/// Register-sized slot: a small value copied in, or the address of a
/// larger one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IWord {
    /// Value bytes copied into the low-address bytes of the word, the rest
    /// zero.
    Value(usize),
    /// Address of the value inside a live entry.
    Addr(NonNull<u8>),
}

impl IWord {
    /// Package the value of type `ty` at `src`.
    ///
    /// # Safety
    ///
    /// `src` must be readable for `ty.size()` bytes; for `Addr` results it
    /// must also stay valid as long as the word is used.
    pub unsafe fn load(ty: TypeRef, src: NonNull<u8>) -> Self {
        let size = ty.size();
        if size <= POINTER_SIZE {
            let mut word = 0usize;
            mem::copy_bytes((&mut word as *mut usize).cast(), src.as_ptr(), size);
            Self::Value(word)
        } else {
            Self::Addr(src)
        }
    }

    /// Flat representation for foreign callers.
    pub fn into_raw(self) -> usize {
        match self {
            Self::Value(word) => word,
            Self::Addr(addr) => addr.as_ptr() as usize,
        }
    }

    pub fn is_indirect(&self) -> bool {
        matches!(self, Self::Addr(_))
    }
}

fn check(ty: TypeRef, store: Option<&MapStore>) -> Result<()> {
    if ty.map_type().is_none() {
        return Err(Error::NotAMap {
            type_name: ty.string().to_string(),
        });
    }
    if let Some(store) = store {
        let actual = store.type_descriptor();
        if !identical(ty, actual)? {
            return Err(Error::TypeMismatch {
                expected: actual.string().to_string(),
                got: ty.string().to_string(),
            });
        }
    }
    Ok(())
}

/// Create an empty map of type `ty`.
pub fn makemap(ty: TypeRef) -> Result<MapStore> {
    MapStore::new(ty)
}

/// Live entry count; 0 for an absent map.
pub fn maplen(store: Option<&MapStore>) -> usize {
    crate::map::length(store)
}

/// Address of the value for `key`, `None` when absent.
///
/// # Safety
///
/// `key` must point to a valid value of the map's key type.
pub unsafe fn mapaccess(
    ty: TypeRef,
    store: Option<&MapStore>,
    key: *const u8,
) -> Result<Option<NonNull<u8>>> {
    check(ty, store)?;
    crate::map::lookup(store, key)
}

/// Insert-or-update with `Some(value)`, delete with `None`.
///
/// # Errors
///
/// [`Error::NilMap`] when inserting into an absent map.
///
/// # Safety
///
/// `key` must point to a valid key; `value`, when given, must be readable for
/// the element size.
pub unsafe fn mapassign(
    ty: TypeRef,
    store: Option<&mut MapStore>,
    key: *const u8,
    value: Option<*const u8>,
) -> Result<()> {
    check(ty, store.as_deref())?;
    match (store, value) {
        (Some(store), value) => store.assign(key, value),
        (None, Some(_)) => Err(Error::NilMap),
        (None, None) => Ok(()),
    }
}

/// Reflection iterator: a [`MapIterator`] plus the entry it currently sits
/// on.
#[derive(Debug, Clone)]
pub struct ReflectIter<'a> {
    inner: MapIterator<'a>,
    current: Option<EntryRef<'a>>,
}

/// Start iterating; the iterator is positioned on the first entry, if any.
pub fn mapiterinit<'a>(ty: TypeRef, store: Option<&'a MapStore>) -> Result<ReflectIter<'a>> {
    check(ty, store)?;
    let mut inner = MapIterator::new(ty, store)?;
    let current = inner.next_entry();
    Ok(ReflectIter { inner, current })
}

/// Current key, `None` once exhausted.
pub fn mapiterkey(it: &ReflectIter<'_>) -> Option<IWord> {
    let entry = it.current?;
    let map = it.inner.type_descriptor().map_type()?;
    let key = NonNull::new(entry.key_ptr())?;
    // SAFETY: key points into a live entry borrowed for the iterator's lifetime.
    Some(unsafe { IWord::load(map.key, key) })
}

/// Current value, `None` once exhausted.
pub fn mapiterelem(it: &ReflectIter<'_>) -> Option<IWord> {
    let entry = it.current?;
    let map = it.inner.type_descriptor().map_type()?;
    let value = NonNull::new(entry.value_ptr())?;
    // SAFETY: as for mapiterkey.
    Some(unsafe { IWord::load(map.elem, value) })
}

/// Move to the next entry.
pub fn mapiternext(it: &mut ReflectIter<'_>) {
    if it.current.is_some() {
        it.current = it.inner.next_entry();
    }
}

impl ReflectIter<'_> {
    /// Entry the iterator is positioned on.
    pub fn current(&self) -> Option<EntryRef<'_>> {
        self.current
    }

    pub fn is_exhausted(&self) -> bool {
        self.current.is_none()
    }
}

/// Copy the value at an [`IWord`] of type `ty` into `dst`.
///
/// # Safety
///
/// `dst` must be writable for `ty.size()` bytes; an `Addr` word must still
/// point to a live value.
pub unsafe fn store_iword(ty: TypeRef, word: IWord, dst: *mut u8) {
    match word {
        IWord::Value(w) => mem::copy_bytes(dst, (&w as *const usize).cast(), ty.size()),
        IWord::Addr(src) => mem::move_bytes(dst, src.as_ptr(), ty.size()),
    }
}
