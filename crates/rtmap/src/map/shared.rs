// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Externally serialized map.
//!
//! [`MapStore`] has no locking of its own; `SharedMap` puts one mutex around
//! it so several threads can use the same map. Value slots never escape the
//! lock: reads copy out, writes copy in.

use super::store::MapStore;
use crate::error::Result;
use crate::mem;
use crate::types::TypeRef;
use parking_lot::{Mutex, MutexGuard};

/// A [`MapStore`] behind a `parking_lot` mutex.
#[derive(Debug)]
pub struct SharedMap {
    inner: Mutex<MapStore>,
}

impl SharedMap {
    /// Create an empty shared map for the map descriptor `ty`.
    pub fn new(ty: TypeRef) -> Result<Self> {
        Ok(Self::from_store(MapStore::new(ty)?))
    }

    pub fn from_store(store: MapStore) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Exclusive access for multi-step operations (traversal, batches).
    pub fn lock(&self) -> MutexGuard<'_, MapStore> {
        self.inner.lock()
    }

    /// Copy the value for `key` into `out`. Returns false (leaving `out`
    /// untouched) when the key is absent.
    ///
    /// # Safety
    ///
    /// `key` must point to a valid key; `out` must be writable for the
    /// element size.
    pub unsafe fn get_into(&self, key: *const u8, out: *mut u8) -> Result<bool> {
        let store = self.inner.lock();
        match store.lookup(key)? {
            Some(slot) => {
                mem::copy_bytes(out, slot.as_ptr(), store.entry_layout().value_size);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Insert-or-update with `Some(value)`, delete with `None`.
    ///
    /// # Safety
    ///
    /// Same contract as [`MapStore::assign`].
    pub unsafe fn assign(&self, key: *const u8, value: Option<*const u8>) -> Result<()> {
        self.inner.lock().assign(key, value)
    }

    /// Remove `key`; false when absent.
    ///
    /// # Safety
    ///
    /// Same contract as [`MapStore::delete`].
    pub unsafe fn delete(&self, key: *const u8) -> Result<bool> {
        self.inner.lock().delete(key)
    }

    pub fn into_inner(self) -> MapStore {
        self.inner.into_inner()
    }
}
