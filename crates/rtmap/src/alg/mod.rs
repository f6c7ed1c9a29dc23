// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-type algorithm tables.
//!
//! Each descriptor carries an [`AlgTable`] resolved once, when the descriptor
//! is assembled. Container code never looks at kinds: it calls [`equal`] and
//! the table decides.
//!
//! # Example
//!
//! ```rust
//! use rtmap::{alg, types, Kind};
//!
//! let f64_type = types::builtin(Kind::Float64).unwrap();
//! let (a, b) = (0.0f64, -0.0f64);
//! let same = unsafe {
//!     alg::equal(f64_type, (&a as *const f64).cast(), (&b as *const f64).cast())
//! };
//! assert_eq!(same, Ok(true));
//! ```

pub mod prims;

pub use prims::EqualFn;

use crate::error::{Error, Result};
use crate::types::abi::RawInterface;
use crate::types::{identical, Kind, KindDetail, TypeDescriptor};
use std::ptr;

/// Equality strategy for one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EqualAlg {
    /// Bitwise over the full size.
    Memory,
    /// Length, then content.
    String,
    Float32,
    Float64,
    Complex64,
    Complex128,
    /// Dynamic type identity, then the dynamic type's own equality.
    Interface,
    /// Element by element.
    Array,
    /// Field by field.
    Struct,
    /// Slices, maps, functions and aggregates containing them.
    Incomparable,
}

impl EqualAlg {
    /// Leaf function for algorithms that need nothing beyond the size.
    pub fn primitive(self) -> Option<EqualFn> {
        match self {
            Self::Memory => Some(prims::mem_equal),
            Self::String => Some(prims::str_equal),
            Self::Float32 => Some(prims::f32_equal),
            Self::Float64 => Some(prims::f64_equal),
            Self::Complex64 => Some(prims::c64_equal),
            Self::Complex128 => Some(prims::c128_equal),
            Self::Interface | Self::Array | Self::Struct | Self::Incomparable => None,
        }
    }
}

/// Algorithm table. Only equality is used: lookup is a linear scan, so no
/// hash slot exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlgTable {
    pub equal: EqualAlg,
}

impl AlgTable {
    /// Pick the table for a type from its kind and payload.
    ///
    /// Aggregates whose members are all bitwise-comparable and that contain
    /// no padding collapse to [`EqualAlg::Memory`].
    pub fn resolve(kind: Kind, detail: &KindDetail, size: usize) -> Self {
        let equal = match kind {
            Kind::Float32 => EqualAlg::Float32,
            Kind::Float64 => EqualAlg::Float64,
            Kind::Complex64 => EqualAlg::Complex64,
            Kind::Complex128 => EqualAlg::Complex128,
            Kind::String => EqualAlg::String,
            Kind::Interface => EqualAlg::Interface,
            Kind::Slice | Kind::Map | Kind::Func | Kind::Invalid => EqualAlg::Incomparable,
            Kind::Array => match detail {
                // Comparability follows the element even when len is 0.
                KindDetail::Array(a) => match a.elem.alg().equal {
                    EqualAlg::Incomparable => EqualAlg::Incomparable,
                    EqualAlg::Memory => EqualAlg::Memory,
                    _ if a.len == 0 => EqualAlg::Memory,
                    _ => EqualAlg::Array,
                },
                _ => EqualAlg::Incomparable,
            },
            Kind::Struct => match detail {
                KindDetail::Struct(s) => {
                    let algs = s.fields.iter().map(|f| f.typ.alg().equal);
                    if algs.clone().any(|a| a == EqualAlg::Incomparable) {
                        EqualAlg::Incomparable
                    } else if algs.clone().all(|a| a == EqualAlg::Memory)
                        && s.fields.iter().map(|f| f.typ.size()).sum::<usize>() == size
                    {
                        EqualAlg::Memory
                    } else {
                        EqualAlg::Struct
                    }
                }
                _ => EqualAlg::Incomparable,
            },
            _ => EqualAlg::Memory,
        };
        Self { equal }
    }

    /// Returns false when values of the type cannot be compared (and hence
    /// cannot be map keys).
    pub fn is_comparable(&self) -> bool {
        self.equal != EqualAlg::Incomparable
    }
}

/// Compare one value at `a` with one at `b`, both of type `ty`.
///
/// # Errors
///
/// [`Error::Incomparable`] when `ty` (or an interface's dynamic type) has no
/// equality; [`Error::UnsupportedTypeIdentity`] when two interface values
/// carry distinct dynamic type descriptors that the active identity mode
/// cannot decide.
///
/// # Safety
///
/// `a` and `b` must each be readable for `ty.size()` bytes and hold valid
/// values of `ty`; string and interface headers must point to live data.
pub unsafe fn equal(ty: &TypeDescriptor, a: *const u8, b: *const u8) -> Result<bool> {
    let alg = ty.alg().equal;
    if let Some(leaf) = alg.primitive() {
        return Ok(leaf(ty.size(), a, b));
    }
    match (alg, ty.detail()) {
        (EqualAlg::Interface, _) => interface_equal(a, b),
        (EqualAlg::Array, KindDetail::Array(arr)) => {
            let stride = arr.elem.size();
            for i in 0..arr.len {
                let off = i * stride;
                if !equal(arr.elem, a.add(off), b.add(off))? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        (EqualAlg::Struct, KindDetail::Struct(s)) => {
            for field in &s.fields {
                if !equal(field.typ, a.add(field.offset), b.add(field.offset))? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Err(Error::Incomparable {
            type_name: ty.string().to_string(),
        }),
    }
}

/// Check that the value at `v` can be compared, descending into interfaces
/// and the aggregates that hold them.
///
/// A statically comparable type can still hold an interface whose dynamic
/// type is a slice, map or func; such a value may not become a map key.
///
/// # Errors
///
/// [`Error::Incomparable`] naming the first incomparable dynamic type found.
///
/// # Safety
///
/// Same as [`equal`] for a single value.
pub unsafe fn check_comparable(ty: &TypeDescriptor, v: *const u8) -> Result<()> {
    match (ty.alg().equal, ty.detail()) {
        (EqualAlg::Incomparable, _) => Err(Error::Incomparable {
            type_name: ty.string().to_string(),
        }),
        (EqualAlg::Interface, _) => {
            let iface = ptr::read_unaligned(v.cast::<RawInterface>());
            match iface.dynamic_type() {
                Some(dynamic) => check_comparable(dynamic, iface.data),
                None => Ok(()),
            }
        }
        (EqualAlg::Array, KindDetail::Array(arr)) => {
            let stride = arr.elem.size();
            for i in 0..arr.len {
                check_comparable(arr.elem, v.add(i * stride))?;
            }
            Ok(())
        }
        (EqualAlg::Struct, KindDetail::Struct(s)) => {
            for field in &s.fields {
                check_comparable(field.typ, v.add(field.offset))?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Interface comparison: both nil, or identical dynamic types with equal
/// values.
unsafe fn interface_equal(a: *const u8, b: *const u8) -> Result<bool> {
    let ia = ptr::read_unaligned(a.cast::<RawInterface>());
    let ib = ptr::read_unaligned(b.cast::<RawInterface>());
    let (ta, tb) = match (ia.dynamic_type(), ib.dynamic_type()) {
        (None, None) => return Ok(true),
        (Some(ta), Some(tb)) => (ta, tb),
        _ => return Ok(false),
    };
    if !identical(ta, tb)? {
        return Ok(false);
    }
    if ptr::eq(ia.data, ib.data) && ta.alg().equal == EqualAlg::Memory {
        return Ok(true);
    }
    equal(ta, ia.data, ib.data)
}
