// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Leaf equality primitives.
//!
//! Every function has the shape `(size, a, b) -> bool` and reads exactly the
//! bytes of one value at `a` and one at `b`. Reads are unaligned-safe so
//! callers may pass keys that live in packed buffers.

use crate::types::abi::RawString;
use std::ptr;

/// Signature shared by all leaf equality functions.
pub type EqualFn = unsafe fn(size: usize, a: *const u8, b: *const u8) -> bool;

/// Bitwise equality over `size` bytes.
///
/// # Safety
///
/// `a` and `b` must be readable for `size` bytes.
pub unsafe fn mem_equal(size: usize, a: *const u8, b: *const u8) -> bool {
    if size == 0 || ptr::eq(a, b) {
        return true;
    }
    std::slice::from_raw_parts(a, size) == std::slice::from_raw_parts(b, size)
}

/// String equality: lengths first, then content.
///
/// # Safety
///
/// `a` and `b` must each point to a [`RawString`] whose data is readable for
/// its length.
pub unsafe fn str_equal(_size: usize, a: *const u8, b: *const u8) -> bool {
    let sa = ptr::read_unaligned(a.cast::<RawString>());
    let sb = ptr::read_unaligned(b.cast::<RawString>());
    if sa.len != sb.len {
        return false;
    }
    if ptr::eq(sa.data, sb.data) {
        return true;
    }
    sa.as_bytes() == sb.as_bytes()
}

/// IEEE equality for `float32`: NaN never equal, `+0 == -0`.
///
/// # Safety
///
/// `a` and `b` must be readable for 4 bytes.
pub unsafe fn f32_equal(_size: usize, a: *const u8, b: *const u8) -> bool {
    ptr::read_unaligned(a.cast::<f32>()) == ptr::read_unaligned(b.cast::<f32>())
}

/// IEEE equality for `float64`.
///
/// # Safety
///
/// `a` and `b` must be readable for 8 bytes.
pub unsafe fn f64_equal(_size: usize, a: *const u8, b: *const u8) -> bool {
    ptr::read_unaligned(a.cast::<f64>()) == ptr::read_unaligned(b.cast::<f64>())
}

/// `complex64`: real and imaginary `float32` parts compared independently.
///
/// # Safety
///
/// `a` and `b` must be readable for 8 bytes.
pub unsafe fn c64_equal(_size: usize, a: *const u8, b: *const u8) -> bool {
    f32_equal(4, a, b) && f32_equal(4, a.add(4), b.add(4))
}

/// `complex128`: real and imaginary `float64` parts compared independently.
///
/// # Safety
///
/// `a` and `b` must be readable for 16 bytes.
pub unsafe fn c128_equal(_size: usize, a: *const u8, b: *const u8) -> bool {
    f64_equal(8, a, b) && f64_equal(8, a.add(8), b.add(8))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes_of<T>(v: &T) -> *const u8 {
        (v as *const T).cast()
    }

    #[test]
    fn test_mem_equal() {
        let a = [1u8, 2, 3];
        let b = [1u8, 2, 4];
        // SAFETY: arrays are 3 bytes.
        unsafe {
            assert!(mem_equal(2, a.as_ptr(), b.as_ptr()));
            assert!(!mem_equal(3, a.as_ptr(), b.as_ptr()));
            assert!(mem_equal(0, a.as_ptr(), b.as_ptr()));
        }
    }

    #[test]
    fn test_float_semantics() {
        let nan = f64::NAN;
        let pz = 0.0f64;
        let nz = -0.0f64;
        // SAFETY: locals are 8 bytes.
        unsafe {
            assert!(!f64_equal(8, bytes_of(&nan), bytes_of(&nan)));
            assert!(f64_equal(8, bytes_of(&pz), bytes_of(&nz)));
            // Bitwise comparison would get both of these wrong.
            assert!(mem_equal(8, bytes_of(&nan), bytes_of(&nan)));
            assert!(!mem_equal(8, bytes_of(&pz), bytes_of(&nz)));
        }

        let c1 = [1.0f32, f32::NAN];
        let c2 = [1.0f32, 2.0];
        let c3 = [-0.0f32, 2.0];
        let c4 = [0.0f32, 2.0];
        // SAFETY: arrays are 8 bytes.
        unsafe {
            assert!(!c64_equal(8, bytes_of(&c1), bytes_of(&c1)));
            assert!(c64_equal(8, bytes_of(&c3), bytes_of(&c4)));
            assert!(!c64_equal(8, bytes_of(&c2), bytes_of(&c4)));
        }
    }

    #[test]
    fn test_string_compares_content() {
        let owned_a = String::from("key");
        let owned_b = String::from("key");
        let other = String::from("kez");
        let a = RawString::borrowed(&owned_a);
        let b = RawString::borrowed(&owned_b);
        let c = RawString::borrowed(&other);
        assert_ne!(a.data, b.data);
        // SAFETY: headers point at live strings.
        unsafe {
            assert!(str_equal(0, bytes_of(&a), bytes_of(&b)));
            assert!(!str_equal(0, bytes_of(&a), bytes_of(&c)));
        }
    }
}
