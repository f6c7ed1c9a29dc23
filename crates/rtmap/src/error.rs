// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Errors returned by runtime map and descriptor operations.
//!
//! Allocation failure is deliberately absent: it aborts the process through
//! [`std::alloc::handle_alloc_error`] and never reaches a caller.

use crate::types::Kind;

/// Errors returned by rtmap operations.
///
/// # Example
///
/// ```rust
/// use rtmap::{types, Error, Kind, MapStore};
///
/// let not_a_map = types::builtin(Kind::Int32).unwrap();
/// match MapStore::new(not_a_map) {
///     Err(Error::NotAMap { type_name }) => assert_eq!(type_name, "int32"),
///     other => panic!("unexpected: {:?}", other.map(|_| ())),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ========================================================================
    // Descriptor Errors
    // ========================================================================
    /// A map operation received a descriptor whose kind is not `map`.
    NotAMap { type_name: String },
    /// Size or alignment disagree with the kind's layout rule.
    InvalidLayout { type_name: String, reason: String },
    /// Alignment is zero or not a power of two.
    InvalidAlignment(usize),
    /// Two descriptors of this kind cannot be compared under the active
    /// identity mode.
    UnsupportedTypeIdentity { kind: Kind },

    // ========================================================================
    // Value Errors
    // ========================================================================
    /// Values of this type have no equality (slice, map, func, or an
    /// aggregate containing one).
    Incomparable { type_name: String },
    /// The descriptor passed to an introspection call does not describe the
    /// store it was given.
    TypeMismatch { expected: String, got: String },
    /// Insert through an absent (never created) store.
    NilMap,

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Unparseable configuration value.
    InvalidConfig(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAMap { type_name } => write!(f, "Not a map type: {}", type_name),
            Self::InvalidLayout { type_name, reason } => {
                write!(f, "Invalid layout for {}: {}", type_name, reason)
            }
            Self::InvalidAlignment(align) => {
                write!(f, "Alignment must be a non-zero power of two, got {}", align)
            }
            Self::UnsupportedTypeIdentity { kind } => write!(
                f,
                "Type identity for distinct {} descriptors is not supported in strict mode",
                kind
            ),
            Self::Incomparable { type_name } => {
                write!(f, "Comparing uncomparable type {}", type_name)
            }
            Self::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, got)
            }
            Self::NilMap => write!(f, "Assignment to entry in nil map"),
            Self::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Result type alias for rtmap operations.
pub type Result<T> = std::result::Result<T, Error>;
