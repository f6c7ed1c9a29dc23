// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # rtmap C FFI Bindings
//!
//! C-compatible entry points for generated code and foreign reflection
//! layers: descriptor construction, the direct-access map primitives
//! (`rtmap_maplookup`, `rtmap_mapdelete`, `rtmap_mapnext`, `rtmap_maplen`)
//! and the introspection primitives (`rtmap_makemap`, `rtmap_mapaccess`,
//! `rtmap_mapassign`, `rtmap_mapiter*`).
//!
//! The header `rtmap.h` is generated by `build.rs`.
//!
//! # Safety
//!
//! All public functions are `unsafe` and require the caller to uphold the
//! invariants documented in each function's safety comment.

mod logging;
mod map_ffi;
mod types_ffi;

pub use logging::*;
pub use map_ffi::*;
pub use types_ffi::*;

use rtmap::config::{self, TypeIdentity};
use rtmap::{Error, TypeDescriptor, TypeRef};

/// Opaque handle to a type descriptor. Descriptors live for the whole
/// process and are never freed.
#[repr(C)]
pub struct RtmapType {
    _private: [u8; 0],
}

/// Opaque handle to a map store.
#[repr(C)]
pub struct RtmapMap {
    _private: [u8; 0],
}

/// Opaque handle to a struct type builder.
#[repr(C)]
pub struct RtmapStructBuilder {
    _private: [u8; 0],
}

/// Opaque handle to a reflection iterator.
#[repr(C)]
pub struct RtmapMapIter {
    _private: [u8; 0],
}

/// Status codes returned by the C API.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtmapError {
    /// Operation completed successfully
    RtmapOk = 0,
    /// Null pointer or invalid value
    RtmapInvalidArgument = 1,
    /// Requested key or field not found
    RtmapNotFound = 2,
    /// Generic operation failure
    RtmapOperationFailed = 3,

    // === Descriptor errors (10-19) ===
    /// Descriptor is not a map type
    RtmapNotAMap = 10,
    /// Size or alignment disagree with the kind
    RtmapInvalidLayout = 11,
    /// Distinct composite descriptors compared in strict identity mode
    RtmapUnsupportedTypeIdentity = 12,

    // === Value errors (20-29) ===
    /// Key type has no equality
    RtmapIncomparable = 20,
    /// Descriptor does not describe the given map
    RtmapTypeMismatch = 21,
    /// Insert into a nil map
    RtmapNilMap = 22,

    // === Configuration errors (30-39) ===
    /// Invalid configuration value
    RtmapConfigError = 30,
}

impl From<&Error> for RtmapError {
    fn from(err: &Error) -> Self {
        match err {
            Error::NotAMap { .. } => Self::RtmapNotAMap,
            Error::InvalidLayout { .. } | Error::InvalidAlignment(_) => Self::RtmapInvalidLayout,
            Error::UnsupportedTypeIdentity { .. } => Self::RtmapUnsupportedTypeIdentity,
            Error::Incomparable { .. } => Self::RtmapIncomparable,
            Error::TypeMismatch { .. } => Self::RtmapTypeMismatch,
            Error::NilMap => Self::RtmapNilMap,
            Error::InvalidConfig(_) => Self::RtmapConfigError,
        }
    }
}

/// Log and convert a crate error.
pub(crate) fn report(context: &str, err: &Error) -> RtmapError {
    log::warn!("[ffi] {}: {}", context, err);
    RtmapError::from(err)
}

/// Borrow a descriptor handle.
///
/// # Safety
/// `ty` must be null or a handle returned by this library.
pub(crate) unsafe fn type_ref(ty: *const RtmapType) -> Option<TypeRef> {
    // Descriptors are leaked on creation, so any valid handle is 'static.
    ty.cast::<TypeDescriptor>().as_ref()
}

pub(crate) fn type_handle(ty: TypeRef) -> *const RtmapType {
    (ty as *const TypeDescriptor).cast::<RtmapType>()
}

/// Descriptor identity mode.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtmapTypeIdentity {
    RtmapIdentityStrict = 0,
    RtmapIdentityStructural = 1,
}

/// Select how distinct composite descriptors are compared (process-wide).
///
/// # Safety
/// Safe to call from any thread; affects comparisons started afterwards.
#[no_mangle]
pub unsafe extern "C" fn rtmap_config_set_type_identity(mode: RtmapTypeIdentity) -> RtmapError {
    let mode = match mode {
        RtmapTypeIdentity::RtmapIdentityStrict => TypeIdentity::Strict,
        RtmapTypeIdentity::RtmapIdentityStructural => TypeIdentity::Structural,
    };
    let current = config::global();
    config::install(current.as_ref().clone().with_type_identity(mode));
    RtmapError::RtmapOk
}

/// Set the initial entry capacity reserved by maps created afterwards.
///
/// # Safety
/// Safe to call from any thread.
#[no_mangle]
pub unsafe extern "C" fn rtmap_config_set_entry_capacity(capacity: usize) -> RtmapError {
    let current = config::global();
    config::install(current.as_ref().clone().with_entry_capacity(capacity));
    RtmapError::RtmapOk
}
