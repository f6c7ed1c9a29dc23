// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor identity.
//!
//! Generated code may emit the same unnamed composite type more than once,
//! so pointer equality alone can report two identical types as different.
//! Rather than guess, [`TypeIdentity::Strict`] refuses to decide those cases;
//! [`TypeIdentity::Structural`] compares them member by member.

use super::descriptor::{KindDetail, TypeDescriptor};
use crate::config::{self, TypeIdentity};
use crate::error::{Error, Result};
use std::ptr;

/// Are `a` and `b` the same type, under the process-wide identity mode?
pub fn identical(a: &TypeDescriptor, b: &TypeDescriptor) -> Result<bool> {
    identical_with(a, b, config::global().type_identity)
}

/// Are `a` and `b` the same type, under an explicit identity mode?
///
/// # Errors
///
/// [`Error::UnsupportedTypeIdentity`] in strict mode when two distinct
/// unnamed descriptors of a composite kind other than pointer are compared.
pub fn identical_with(a: &TypeDescriptor, b: &TypeDescriptor, mode: TypeIdentity) -> Result<bool> {
    if ptr::eq(a, b) {
        return Ok(true);
    }
    if a.kind() != b.kind() {
        return Ok(false);
    }
    // Named types are only ever identical to themselves.
    if a.is_named() || b.is_named() {
        return Ok(false);
    }
    if a.kind().is_basic() {
        return Ok(true);
    }
    if let (KindDetail::Ptr { elem: ea }, KindDetail::Ptr { elem: eb }) = (a.detail(), b.detail()) {
        return identical_with(ea, eb, mode);
    }
    match mode {
        TypeIdentity::Strict => Err(Error::UnsupportedTypeIdentity { kind: a.kind() }),
        TypeIdentity::Structural => structural(a.detail(), b.detail(), mode),
    }
}

fn all_identical(
    a: &[&'static TypeDescriptor],
    b: &[&'static TypeDescriptor],
    mode: TypeIdentity,
) -> Result<bool> {
    if a.len() != b.len() {
        return Ok(false);
    }
    for (x, y) in a.iter().zip(b) {
        if !identical_with(x, y, mode)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn structural(a: &KindDetail, b: &KindDetail, mode: TypeIdentity) -> Result<bool> {
    match (a, b) {
        (KindDetail::Array(x), KindDetail::Array(y)) => {
            Ok(x.len == y.len && identical_with(x.elem, y.elem, mode)?)
        }
        (KindDetail::Chan(x), KindDetail::Chan(y)) => {
            Ok(x.dir == y.dir && identical_with(x.elem, y.elem, mode)?)
        }
        (KindDetail::Func(x), KindDetail::Func(y)) => Ok(x.variadic == y.variadic
            && all_identical(&x.params, &y.params, mode)?
            && all_identical(&x.results, &y.results, mode)?),
        (KindDetail::Interface(x), KindDetail::Interface(y)) => {
            if x.methods.len() != y.methods.len() {
                return Ok(false);
            }
            for (m, n) in x.methods.iter().zip(&y.methods) {
                if m.name != n.name || m.pkg_path != n.pkg_path {
                    return Ok(false);
                }
                if !identical_with(m.typ, n.typ, mode)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        (KindDetail::Map(x), KindDetail::Map(y)) => {
            Ok(identical_with(x.key, y.key, mode)? && identical_with(x.elem, y.elem, mode)?)
        }
        (KindDetail::Slice { elem: x }, KindDetail::Slice { elem: y }) => {
            identical_with(x, y, mode)
        }
        (KindDetail::Struct(x), KindDetail::Struct(y)) => {
            if x.fields.len() != y.fields.len() {
                return Ok(false);
            }
            for (f, g) in x.fields.iter().zip(&y.fields) {
                if f.name != g.name
                    || f.pkg_path != g.pkg_path
                    || f.tag != g.tag
                    || f.is_embedded() != g.is_embedded()
                {
                    return Ok(false);
                }
                if !identical_with(f.typ, g.typ, mode)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}
