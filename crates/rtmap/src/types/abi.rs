// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory representation of built-in multi-word values.
//!
//! These are the byte layouts equality functions read when a key is a
//! string or an interface value.

use super::TypeDescriptor;
use std::ptr;

/// String header: data pointer then byte length.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawString {
    pub data: *const u8,
    pub len: usize,
}

impl RawString {
    /// Borrow a Rust string. The header is valid while `s` is alive.
    pub fn borrowed(s: &str) -> Self {
        Self {
            data: s.as_ptr(),
            len: s.len(),
        }
    }

    /// View the referenced bytes.
    ///
    /// # Safety
    ///
    /// `data` must be readable for `len` bytes (or `len` must be zero) for
    /// the returned lifetime.
    pub unsafe fn as_bytes<'a>(&self) -> &'a [u8] {
        if self.len == 0 {
            &[]
        } else {
            std::slice::from_raw_parts(self.data, self.len)
        }
    }
}

/// Slice header: data pointer, length, capacity.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSlice {
    pub data: *mut u8,
    pub len: usize,
    pub cap: usize,
}

/// Interface value: dynamic type descriptor, then a pointer to the value.
///
/// A null `ty` is the nil interface; `data` is then ignored.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInterface {
    pub ty: *const TypeDescriptor,
    pub data: *const u8,
}

impl RawInterface {
    /// The nil interface value.
    pub const NIL: Self = Self {
        ty: ptr::null(),
        data: ptr::null(),
    };

    /// Box `value` of dynamic type `ty`. The header is valid while `value`
    /// is alive.
    pub fn new(ty: &'static TypeDescriptor, value: *const u8) -> Self {
        Self { ty, data: value }
    }

    /// Dynamic type, `None` for the nil interface.
    pub fn dynamic_type(&self) -> Option<&'static TypeDescriptor> {
        // SAFETY: non-null type pointers always come from leaked 'static
        // descriptors.
        unsafe { self.ty.as_ref() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::POINTER_SIZE;
    use std::mem::size_of;

    #[test]
    fn test_header_sizes_match_kind_layout() {
        assert_eq!(size_of::<RawString>(), 2 * POINTER_SIZE);
        assert_eq!(size_of::<RawSlice>(), 3 * POINTER_SIZE);
        assert_eq!(size_of::<RawInterface>(), 2 * POINTER_SIZE);
    }

    #[test]
    fn test_raw_string_view() {
        let s = String::from("hello");
        let raw = RawString::borrowed(&s);
        // SAFETY: s outlives the view.
        assert_eq!(unsafe { raw.as_bytes() }, b"hello");
        let empty = RawString {
            data: ptr::null(),
            len: 0,
        };
        // SAFETY: zero length never dereferences.
        assert!(unsafe { empty.as_bytes() }.is_empty());
    }
}
