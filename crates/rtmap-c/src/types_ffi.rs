// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptor C FFI bindings.
//!
//! # Usage from C
//!
//! ```c
//! const RtmapType* i32 = rtmap_type_builtin(RTMAP_KIND_INT32);
//! const RtmapType* f64 = rtmap_type_builtin(RTMAP_KIND_FLOAT64);
//! const RtmapType* m = rtmap_type_map(i32, f64);
//!
//! RtmapEntryLayout layout;
//! rtmap_type_entry_layout(m, &layout);   // key at 0, value at 8
//!
//! RtmapStructBuilder* sb = rtmap_struct_builder_new();
//! rtmap_struct_builder_add_field(sb, "x", i32);
//! rtmap_struct_builder_add_field(sb, "y", f64);
//! const RtmapType* point = NULL;
//! rtmap_struct_builder_build(sb, &point);  // consumes sb
//! ```

use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr;

use rtmap::layout::EntryLayout;
use rtmap::types::{builtin, TypeBuilder};
use rtmap::Kind;

use crate::{report, type_handle, type_ref, RtmapError, RtmapStructBuilder, RtmapType};

// =============================================================================
// Kind ordinals for C
// =============================================================================

pub const RTMAP_KIND_BOOL: u8 = Kind::Bool as u8;
pub const RTMAP_KIND_INT: u8 = Kind::Int as u8;
pub const RTMAP_KIND_INT8: u8 = Kind::Int8 as u8;
pub const RTMAP_KIND_INT16: u8 = Kind::Int16 as u8;
pub const RTMAP_KIND_INT32: u8 = Kind::Int32 as u8;
pub const RTMAP_KIND_INT64: u8 = Kind::Int64 as u8;
pub const RTMAP_KIND_UINT: u8 = Kind::Uint as u8;
pub const RTMAP_KIND_UINT8: u8 = Kind::Uint8 as u8;
pub const RTMAP_KIND_UINT16: u8 = Kind::Uint16 as u8;
pub const RTMAP_KIND_UINT32: u8 = Kind::Uint32 as u8;
pub const RTMAP_KIND_UINT64: u8 = Kind::Uint64 as u8;
pub const RTMAP_KIND_UINTPTR: u8 = Kind::Uintptr as u8;
pub const RTMAP_KIND_FLOAT32: u8 = Kind::Float32 as u8;
pub const RTMAP_KIND_FLOAT64: u8 = Kind::Float64 as u8;
pub const RTMAP_KIND_COMPLEX64: u8 = Kind::Complex64 as u8;
pub const RTMAP_KIND_COMPLEX128: u8 = Kind::Complex128 as u8;
pub const RTMAP_KIND_STRING: u8 = Kind::String as u8;
pub const RTMAP_KIND_UNSAFE_POINTER: u8 = Kind::UnsafePointer as u8;

/// Entry placement handed to code generators.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RtmapEntryLayout {
    pub key_offset: usize,
    pub value_offset: usize,
    pub size: usize,
    pub align: usize,
}

impl From<EntryLayout> for RtmapEntryLayout {
    fn from(l: EntryLayout) -> Self {
        Self {
            key_offset: l.key_offset,
            value_offset: l.value_offset,
            size: l.size,
            align: l.align,
        }
    }
}

/// Internal wrapper for the builder (uses Option to support consuming methods).
struct StructBuilderWrapper {
    builder: Option<TypeBuilder>,
}

fn finish(context: &str, built: rtmap::Result<rtmap::TypeRef>) -> *const RtmapType {
    match built {
        Ok(ty) => type_handle(ty),
        Err(e) => {
            report(context, &e);
            ptr::null()
        }
    }
}

// =============================================================================
// Descriptors
// =============================================================================

/// Interned descriptor of a basic kind, NULL for non-basic ordinals.
///
/// # Safety
/// Safe for any input.
#[no_mangle]
pub unsafe extern "C" fn rtmap_type_builtin(kind: u8) -> *const RtmapType {
    Kind::try_from(kind)
        .ok()
        .and_then(builtin)
        .map_or(ptr::null(), type_handle)
}

/// `*elem`. Returns NULL on invalid input.
///
/// # Safety
/// - `elem` must be a descriptor handle.
#[no_mangle]
pub unsafe extern "C" fn rtmap_type_pointer(elem: *const RtmapType) -> *const RtmapType {
    let Some(elem) = type_ref(elem) else {
        return ptr::null();
    };
    type_handle(elem.ptr_to())
}

/// `[]elem`. Returns NULL on invalid input.
///
/// # Safety
/// - `elem` must be a descriptor handle.
#[no_mangle]
pub unsafe extern "C" fn rtmap_type_slice(elem: *const RtmapType) -> *const RtmapType {
    let Some(elem) = type_ref(elem) else {
        return ptr::null();
    };
    finish("rtmap_type_slice", TypeBuilder::slice(elem).build())
}

/// `[len]elem`. Returns NULL on invalid input or overflow.
///
/// # Safety
/// - `elem` must be a descriptor handle.
#[no_mangle]
pub unsafe extern "C" fn rtmap_type_array(elem: *const RtmapType, len: usize) -> *const RtmapType {
    let Some(elem) = type_ref(elem) else {
        return ptr::null();
    };
    finish("rtmap_type_array", TypeBuilder::array(elem, len).build())
}

/// `map[key]elem`. Returns NULL on invalid input.
///
/// # Safety
/// - `key` and `elem` must be descriptor handles.
#[no_mangle]
pub unsafe extern "C" fn rtmap_type_map(
    key: *const RtmapType,
    elem: *const RtmapType,
) -> *const RtmapType {
    let (Some(key), Some(elem)) = (type_ref(key), type_ref(elem)) else {
        return ptr::null();
    };
    finish("rtmap_type_map", TypeBuilder::map(key, elem).build())
}

/// Size in bytes, 0 for NULL.
///
/// # Safety
/// - `ty` must be NULL or a descriptor handle.
#[no_mangle]
pub unsafe extern "C" fn rtmap_type_size(ty: *const RtmapType) -> usize {
    type_ref(ty).map_or(0, |t| t.size())
}

/// Alignment in bytes, 0 for NULL.
///
/// # Safety
/// - `ty` must be NULL or a descriptor handle.
#[no_mangle]
pub unsafe extern "C" fn rtmap_type_align(ty: *const RtmapType) -> usize {
    type_ref(ty).map_or(0, |t| t.align())
}

/// Kind ordinal, 0 (invalid) for NULL.
///
/// # Safety
/// - `ty` must be NULL or a descriptor handle.
#[no_mangle]
pub unsafe extern "C" fn rtmap_type_kind(ty: *const RtmapType) -> u8 {
    type_ref(ty).map_or(Kind::Invalid as u8, |t| t.kind() as u8)
}

/// Byte offset of a named struct field.
///
/// # Safety
/// - `ty` must be a descriptor handle, `name` a null-terminated string and
///   `out_offset` writable.
#[no_mangle]
pub unsafe extern "C" fn rtmap_type_field_offset(
    ty: *const RtmapType,
    name: *const c_char,
    out_offset: *mut usize,
) -> RtmapError {
    if name.is_null() || out_offset.is_null() {
        return RtmapError::RtmapInvalidArgument;
    }
    let Some(ty) = type_ref(ty) else {
        return RtmapError::RtmapInvalidArgument;
    };
    let Ok(name) = CStr::from_ptr(name).to_str() else {
        return RtmapError::RtmapInvalidArgument;
    };
    match ty.field(name) {
        Some(field) => {
            *out_offset = field.offset;
            RtmapError::RtmapOk
        }
        None => RtmapError::RtmapNotFound,
    }
}

/// Entry layout of a map descriptor, the offsets generated code uses for
/// direct access.
///
/// # Safety
/// - `map_type` must be a descriptor handle and `out` writable.
#[no_mangle]
pub unsafe extern "C" fn rtmap_type_entry_layout(
    map_type: *const RtmapType,
    out: *mut RtmapEntryLayout,
) -> RtmapError {
    if out.is_null() {
        return RtmapError::RtmapInvalidArgument;
    }
    let Some(ty) = type_ref(map_type) else {
        return RtmapError::RtmapInvalidArgument;
    };
    let Some(map) = ty.map_type() else {
        return RtmapError::RtmapNotAMap;
    };
    match EntryLayout::new(
        (map.key.size(), map.key.align()),
        (map.elem.size(), map.elem.align()),
    ) {
        Ok(layout) => {
            *out = layout.into();
            RtmapError::RtmapOk
        }
        Err(e) => report("rtmap_type_entry_layout", &e),
    }
}

// =============================================================================
// Struct builder
// =============================================================================

/// Start an empty struct type.
///
/// # Safety
/// The handle must be released with `rtmap_struct_builder_build` or
/// `rtmap_struct_builder_destroy`.
#[no_mangle]
pub unsafe extern "C" fn rtmap_struct_builder_new() -> *mut RtmapStructBuilder {
    let wrapper = StructBuilderWrapper {
        builder: Some(TypeBuilder::structure()),
    };
    Box::into_raw(Box::new(wrapper)).cast::<RtmapStructBuilder>()
}

/// Append a field.
///
/// # Safety
/// - `builder` must be valid. `name` must be null-terminated. `ty` must be a
///   descriptor handle.
#[no_mangle]
pub unsafe extern "C" fn rtmap_struct_builder_add_field(
    builder: *mut RtmapStructBuilder,
    name: *const c_char,
    ty: *const RtmapType,
) -> RtmapError {
    if builder.is_null() || name.is_null() {
        return RtmapError::RtmapInvalidArgument;
    }
    let Some(ty) = type_ref(ty) else {
        return RtmapError::RtmapInvalidArgument;
    };
    let Ok(name_str) = CStr::from_ptr(name).to_str() else {
        return RtmapError::RtmapInvalidArgument;
    };
    let wrapper = &mut *builder.cast::<StructBuilderWrapper>();
    let Some(b) = wrapper.builder.take() else {
        return RtmapError::RtmapInvalidArgument;
    };
    wrapper.builder = Some(b.field(name_str, ty));
    RtmapError::RtmapOk
}

/// Lay out and validate the struct. Consumes `builder` in all cases.
///
/// # Safety
/// - `builder` must be valid and not used afterwards. `out` must be writable.
#[no_mangle]
pub unsafe extern "C" fn rtmap_struct_builder_build(
    builder: *mut RtmapStructBuilder,
    out: *mut *const RtmapType,
) -> RtmapError {
    if builder.is_null() || out.is_null() {
        return RtmapError::RtmapInvalidArgument;
    }
    let wrapper = Box::from_raw(builder.cast::<StructBuilderWrapper>());
    let Some(b) = wrapper.builder else {
        return RtmapError::RtmapInvalidArgument;
    };
    match b.build() {
        Ok(ty) => {
            *out = type_handle(ty);
            RtmapError::RtmapOk
        }
        Err(e) => {
            *out = ptr::null();
            report("rtmap_struct_builder_build", &e)
        }
    }
}

/// Discard a builder without building.
///
/// # Safety
/// - `builder` must be NULL or valid, and not used afterwards.
#[no_mangle]
pub unsafe extern "C" fn rtmap_struct_builder_destroy(builder: *mut RtmapStructBuilder) {
    if !builder.is_null() {
        drop(Box::from_raw(builder.cast::<StructBuilderWrapper>()));
    }
}
