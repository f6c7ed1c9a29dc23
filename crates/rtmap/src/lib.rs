// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # rtmap - type-erased map runtime
//!
//! Runtime support for the built-in map of an ahead-of-time compiled
//! language. The map is implemented once, against runtime type descriptors
//! that carry size, alignment and equality for any key and value type.
//!
//! ## Quick Start
//!
//! ```rust
//! use rtmap::types::{builtin, TypeBuilder};
//! use rtmap::{Kind, MapStore, Result};
//!
//! fn main() -> Result<()> {
//!     let ty = TypeBuilder::map(builtin(Kind::Int32).unwrap(), builtin(Kind::Float64).unwrap())
//!         .build()?;
//!     let mut store = MapStore::new(ty)?;
//!
//!     let (key, value) = (42i32, 0.5f64);
//!     unsafe {
//!         store.assign((&key as *const i32).cast(), Some((&value as *const f64).cast()))?;
//!     }
//!     assert_eq!(store.len(), 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  direct access (generated code)   |  introspection (reflection)     |
//! |  map::{length, lookup, delete},   |  reflect::{makemap, mapaccess,  |
//! |  MapStore::next_entry             |  mapassign, mapiter*}           |
//! +---------------------------------------------------------------------+
//! |  MapStore -> Vec<Entry>   MapIterator   SharedMap (external lock)    |
//! +---------------------------------------------------------------------+
//! |  layout (offsets)  |  alg (equality)  |  mem (raw blocks)            |
//! +---------------------------------------------------------------------+
//! |  types: TypeDescriptor, Kind, TypeBuilder, identity                 |
//! +---------------------------------------------------------------------+
//! ```
//!
//! Both access paths share [`layout::EntryLayout`], so an entry written by
//! one is read correctly by the other.
//!
//! ## Modules Overview
//!
//! - [`types`] - descriptors, builder, identity
//! - [`alg`] - per-type equality
//! - [`layout`] - offset calculator
//! - [`mem`] - allocation and byte copies
//! - [`map`] - the store and its iterator
//! - [`reflect`] - descriptor-per-call access
//! - [`config`] - constants and runtime tunables

/// Per-type algorithm tables and equality dispatch.
pub mod alg;
/// Compile-time constants and runtime configuration.
pub mod config;
mod error;
/// Offset calculator for struct fields and map entries.
pub mod layout;
/// Type-erased map store, entries and iteration.
pub mod map;
/// Raw memory primitives.
pub mod mem;
/// Introspection access with an explicit descriptor per call.
pub mod reflect;
/// Runtime type descriptors.
pub mod types;

pub use config::{RuntimeConfig, TypeIdentity, POINTER_SIZE};
pub use error::{Error, Result};
pub use map::{EntryRef, MapIterator, MapStore, SharedMap};
pub use reflect::IWord;
pub use types::{Kind, TypeBuilder, TypeDescriptor, TypeRef};
