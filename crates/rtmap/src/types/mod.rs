// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type information.
//!
//! A [`TypeDescriptor`] carries everything the map runtime needs to store and
//! compare values of a type it has never seen at compile time: size,
//! alignment, kind, an algorithm table, and a kind-specific payload.
//!
//! # Architecture
//!
//! ```text
//! TypeBuilder --build()--> TypeDescriptor --leak()--> &'static TypeDescriptor
//!                                |
//!                                +-- AlgTable (resolved once)
//!                                +-- KindDetail (elem / key / fields / ...)
//!                                +-- ptr_to() cache (filled on demand)
//! ```
//!
//! # Example
//!
//! ```rust
//! use rtmap::types::{builtin, TypeBuilder};
//! use rtmap::Kind;
//!
//! let string = builtin(Kind::String).unwrap();
//! let int = builtin(Kind::Int).unwrap();
//! let counts = TypeBuilder::map(string, int).build().unwrap();
//! assert_eq!(counts.string(), "map[string]int");
//! ```

pub mod abi;
mod builder;
mod descriptor;
mod identity;
mod kind;


pub use builder::TypeBuilder;
pub use descriptor::{
    fixed_layout, ArrayType, ChanType, FnAddr, FuncType, GcData, IMethod, InterfaceType,
    KindDetail, MapType, Method, StructField, StructType, TypeDescriptor, TypeRef, UncommonType,
};
pub use identity::{identical, identical_with};
pub use kind::{ChanDir, Kind};

use std::sync::OnceLock;

static BUILTINS: OnceLock<Vec<Option<TypeRef>>> = OnceLock::new();

/// Interned descriptor of the unnamed basic type of `kind`.
///
/// Returns `None` for kinds that need a payload (array, map, struct, ...).
/// The same reference is returned on every call.
pub fn builtin(kind: Kind) -> Option<TypeRef> {
    let table = BUILTINS.get_or_init(|| {
        log::trace!("[types] interning builtin descriptors");
        let mut table = vec![None; Kind::ALL.len() + 1];
        for kind in Kind::ALL.into_iter().filter(|k| k.is_basic()) {
            if let Some((size, align)) = fixed_layout(kind) {
                let desc = TypeDescriptor::assemble(
                    kind,
                    size,
                    align,
                    kind.name().to_string(),
                    None,
                    GcData::default(),
                    KindDetail::Basic,
                );
                table[kind as usize] = Some(desc.leak());
            }
        }
        table
    });
    table.get(kind as usize).copied().flatten()
}
