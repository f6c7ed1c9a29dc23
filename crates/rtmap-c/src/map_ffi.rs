// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Map C FFI bindings.
//!
//! Two surfaces share one opaque [`RtmapMap`] handle:
//!
//! - direct access for generated code, which already knows the entry layout
//!   (`rtmap_maplookup`, `rtmap_mapdelete`, `rtmap_mapnext`, `rtmap_maplen`);
//! - introspection with a descriptor per call (`rtmap_mapaccess`,
//!   `rtmap_mapassign`, `rtmap_mapiter*`).
//!
//! A NULL map behaves as an empty map everywhere except insertion.

use std::os::raw::c_void;
use std::ptr::{self, NonNull};

use rtmap::reflect::{self, IWord, ReflectIter};
use rtmap::{map, Error, MapStore};

use crate::{report, type_ref, RtmapError, RtmapMap, RtmapMapIter, RtmapType};

/// Key or value handed out by the introspection iterator.
///
/// When `indirect` is false `word` holds the value bytes, otherwise it is the
/// address of the value inside the live entry.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RtmapIWord {
    pub word: usize,
    pub indirect: bool,
}

impl From<IWord> for RtmapIWord {
    fn from(w: IWord) -> Self {
        Self {
            indirect: w.is_indirect(),
            word: w.into_raw(),
        }
    }
}

unsafe fn store_ref<'a>(m: *const RtmapMap) -> Option<&'a MapStore> {
    m.cast::<MapStore>().as_ref()
}

unsafe fn store_mut<'a>(m: *mut RtmapMap) -> Option<&'a mut MapStore> {
    m.cast::<MapStore>().as_mut()
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Create an empty map for `map_type`.
///
/// Returns NULL when the descriptor is not a map or its key type is not
/// comparable.
///
/// # Safety
/// - `map_type` must be a descriptor handle.
/// - The returned map must be released with `rtmap_map_free`.
#[no_mangle]
pub unsafe extern "C" fn rtmap_makemap(map_type: *const RtmapType) -> *mut RtmapMap {
    let Some(ty) = type_ref(map_type) else {
        log::error!("rtmap_makemap: null descriptor");
        return ptr::null_mut();
    };
    match reflect::makemap(ty) {
        Ok(store) => Box::into_raw(Box::new(store)).cast::<RtmapMap>(),
        Err(e) => {
            report("rtmap_makemap", &e);
            ptr::null_mut()
        }
    }
}

/// Free a map and every entry it owns.
///
/// # Safety
/// - `m` must be NULL or returned by `rtmap_makemap`, and not used afterwards.
/// - Value slots and iterators obtained from `m` become dangling.
#[no_mangle]
pub unsafe extern "C" fn rtmap_map_free(m: *mut RtmapMap) {
    if !m.is_null() {
        drop(Box::from_raw(m.cast::<MapStore>()));
    }
}

/// Number of live entries, 0 for NULL.
///
/// # Safety
/// - `m` must be NULL or a valid map.
#[no_mangle]
pub unsafe extern "C" fn rtmap_maplen(m: *const RtmapMap) -> usize {
    map::length(store_ref(m))
}

// =============================================================================
// Direct access
// =============================================================================

/// Address of the value slot for `key`, written to `out_slot`.
///
/// On a miss with `insert` set, a zero-filled entry is appended and its slot
/// returned. A miss without insert yields `RTMAP_NOT_FOUND` and a NULL slot.
/// Comparison failures are reported as errors, never as a miss.
///
/// The slot stays valid until the map is next mutated.
///
/// # Safety
/// - `m` must be NULL or a valid map.
/// - `key` must point to a value of the map's key type.
/// - `out_slot` must be writable.
#[no_mangle]
pub unsafe extern "C" fn rtmap_maplookup(
    m: *mut RtmapMap,
    key: *const c_void,
    insert: bool,
    out_slot: *mut *mut c_void,
) -> RtmapError {
    if key.is_null() || out_slot.is_null() {
        return RtmapError::RtmapInvalidArgument;
    }
    *out_slot = ptr::null_mut();
    let key = key.cast::<u8>();
    let found = match store_mut(m) {
        Some(store) => store.lookup_or_insert(key, insert),
        None if insert => return report("rtmap_maplookup", &Error::NilMap),
        None => map::lookup(None, key),
    };
    match found {
        Ok(Some(slot)) => {
            *out_slot = slot.as_ptr().cast();
            RtmapError::RtmapOk
        }
        Ok(None) => RtmapError::RtmapNotFound,
        Err(e) => report("rtmap_maplookup", &e),
    }
}

/// Remove the entry for `key`. Absent keys and NULL maps are a no-op.
///
/// # Safety
/// - `m` must be NULL or a valid map.
/// - `key` must point to a value of the map's key type.
#[no_mangle]
pub unsafe extern "C" fn rtmap_mapdelete(m: *mut RtmapMap, key: *const c_void) -> RtmapError {
    if key.is_null() {
        return RtmapError::RtmapInvalidArgument;
    }
    match map::delete(store_mut(m), key.cast()) {
        Ok(true) => RtmapError::RtmapOk,
        Ok(false) => RtmapError::RtmapNotFound,
        Err(e) => report("rtmap_mapdelete", &e),
    }
}

/// One traversal step.
///
/// Pass 0 as `cursor` to start. On success the entry's key and value
/// addresses are written to `out_key` / `out_value` (either may be NULL) and
/// the cursor for the following call is returned. Returns 0 at the end, with
/// both outputs set to NULL.
///
/// # Safety
/// - `m` must be NULL or a valid map, not mutated during the traversal.
/// - Non-NULL outputs must be writable.
#[no_mangle]
pub unsafe extern "C" fn rtmap_mapnext(
    m: *const RtmapMap,
    cursor: usize,
    out_key: *mut *mut c_void,
    out_value: *mut *mut c_void,
) -> usize {
    let step = store_ref(m).and_then(|store| store.next_entry(cursor));
    let (next, key, value) = match step {
        Some((next, entry)) => (
            next,
            entry.key_ptr().cast::<c_void>(),
            entry.value_ptr().cast::<c_void>(),
        ),
        None => (0, ptr::null_mut(), ptr::null_mut()),
    };
    if !out_key.is_null() {
        *out_key = key;
    }
    if !out_value.is_null() {
        *out_value = value;
    }
    next
}

// =============================================================================
// Introspection
// =============================================================================

/// Look up `key`, checking `map_type` against the map.
///
/// Writes the value slot address (NULL on a miss) to `out_value`.
///
/// # Safety
/// - `map_type` must be a descriptor handle, `m` NULL or a valid map.
/// - `key` must point to a value of the key type. `out_value` must be writable.
#[no_mangle]
pub unsafe extern "C" fn rtmap_mapaccess(
    map_type: *const RtmapType,
    m: *const RtmapMap,
    key: *const c_void,
    out_value: *mut *mut c_void,
) -> RtmapError {
    if key.is_null() || out_value.is_null() {
        return RtmapError::RtmapInvalidArgument;
    }
    let Some(ty) = type_ref(map_type) else {
        return RtmapError::RtmapInvalidArgument;
    };
    match reflect::mapaccess(ty, store_ref(m), key.cast()) {
        Ok(Some(slot)) => {
            *out_value = slot.as_ptr().cast();
            RtmapError::RtmapOk
        }
        Ok(None) => {
            *out_value = ptr::null_mut();
            RtmapError::RtmapNotFound
        }
        Err(e) => report("rtmap_mapaccess", &e),
    }
}

/// Insert-or-update when `value` is non-NULL, delete otherwise.
///
/// Inserting into a NULL map fails with `RTMAP_NIL_MAP`.
///
/// # Safety
/// - `map_type` must be a descriptor handle, `m` NULL or a valid map.
/// - `key` must point to a key value; `value`, when non-NULL, must be
///   readable for the element size.
#[no_mangle]
pub unsafe extern "C" fn rtmap_mapassign(
    map_type: *const RtmapType,
    m: *mut RtmapMap,
    key: *const c_void,
    value: *const c_void,
) -> RtmapError {
    if key.is_null() {
        return RtmapError::RtmapInvalidArgument;
    }
    let Some(ty) = type_ref(map_type) else {
        return RtmapError::RtmapInvalidArgument;
    };
    let value = (!value.is_null()).then(|| value.cast::<u8>());
    match reflect::mapassign(ty, store_mut(m), key.cast(), value) {
        Ok(()) => RtmapError::RtmapOk,
        Err(e) => report("rtmap_mapassign", &e),
    }
}

/// Start iterating. The iterator is positioned on the first entry.
///
/// Returns NULL when `map_type` is not a map or does not match `m`.
///
/// # Safety
/// - `map_type` must be a descriptor handle, `m` NULL or a valid map.
/// - `m` must outlive the iterator and not be mutated while it is in use.
/// - The iterator must be released with `rtmap_mapiter_free`.
#[no_mangle]
pub unsafe extern "C" fn rtmap_mapiterinit(
    map_type: *const RtmapType,
    m: *const RtmapMap,
) -> *mut RtmapMapIter {
    let Some(ty) = type_ref(map_type) else {
        return ptr::null_mut();
    };
    // The caller keeps the map alive for the iterator's lifetime.
    let store: Option<&'static MapStore> = store_ref(m);
    match reflect::mapiterinit(ty, store) {
        Ok(it) => Box::into_raw(Box::new(it)).cast::<RtmapMapIter>(),
        Err(e) => {
            report("rtmap_mapiterinit", &e);
            ptr::null_mut()
        }
    }
}

unsafe fn iter_word(
    it: *const RtmapMapIter,
    out: *mut RtmapIWord,
    pick: fn(&ReflectIter<'static>) -> Option<IWord>,
) -> bool {
    let Some(it) = it.cast::<ReflectIter<'static>>().as_ref() else {
        return false;
    };
    let word = pick(it);
    if !out.is_null() {
        *out = word.map(RtmapIWord::from).unwrap_or_default();
    }
    word.is_some()
}

/// Current key. Returns false once the iterator is exhausted.
///
/// # Safety
/// - `it` must be NULL or a live iterator. `out` must be NULL or writable.
#[no_mangle]
pub unsafe extern "C" fn rtmap_mapiterkey(it: *const RtmapMapIter, out: *mut RtmapIWord) -> bool {
    iter_word(it, out, reflect::mapiterkey)
}

/// Current value. Returns false once the iterator is exhausted.
///
/// # Safety
/// - `it` must be NULL or a live iterator. `out` must be NULL or writable.
#[no_mangle]
pub unsafe extern "C" fn rtmap_mapiterelem(it: *const RtmapMapIter, out: *mut RtmapIWord) -> bool {
    iter_word(it, out, reflect::mapiterelem)
}

/// Advance to the next entry.
///
/// # Safety
/// - `it` must be NULL or a live iterator.
#[no_mangle]
pub unsafe extern "C" fn rtmap_mapiternext(it: *mut RtmapMapIter) {
    if let Some(it) = it.cast::<ReflectIter<'static>>().as_mut() {
        reflect::mapiternext(it);
    }
}

/// Release an iterator.
///
/// # Safety
/// - `it` must be NULL or returned by `rtmap_mapiterinit`, and not used
///   afterwards.
#[no_mangle]
pub unsafe extern "C" fn rtmap_mapiter_free(it: *mut RtmapMapIter) {
    if !it.is_null() {
        drop(Box::from_raw(it.cast::<ReflectIter<'static>>()));
    }
}

/// Copy an iterator word of type `ty` into `dst`.
///
/// # Safety
/// - `ty` must be a descriptor handle and `dst` writable for its size.
/// - An indirect word must still point into a live entry.
#[no_mangle]
pub unsafe extern "C" fn rtmap_iword_store(
    ty: *const RtmapType,
    word: RtmapIWord,
    dst: *mut c_void,
) -> RtmapError {
    if dst.is_null() {
        return RtmapError::RtmapInvalidArgument;
    }
    let Some(ty) = type_ref(ty) else {
        return RtmapError::RtmapInvalidArgument;
    };
    let word = if word.indirect {
        match NonNull::new(word.word as *mut u8) {
            Some(addr) => IWord::Addr(addr),
            None => return RtmapError::RtmapInvalidArgument,
        }
    } else {
        IWord::Value(word.word)
    };
    reflect::store_iword(ty, word, dst.cast());
    RtmapError::RtmapOk
}
