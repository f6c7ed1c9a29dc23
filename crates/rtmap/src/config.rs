// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime configuration.
//!
//! - **Level 1 (Static)**: layout constants shared by generated code and the
//!   runtime. Changing them breaks the entry layout contract.
//! - **Level 2 (Dynamic)**: [`RuntimeConfig`], loaded once from the
//!   environment and swappable atomically via [`install`].
//!
//! # Example
//!
//! ```rust
//! use rtmap::config::{self, RuntimeConfig, TypeIdentity};
//!
//! let previous = config::global();
//! config::install(RuntimeConfig::new().with_type_identity(TypeIdentity::Structural));
//! assert_eq!(config::global().type_identity, TypeIdentity::Structural);
//!
//! config::install(previous.as_ref().clone());
//! ```

use crate::error::{Error, Result};
use arc_swap::ArcSwap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

// =======================================================================
// Layout constants
// =======================================================================

/// Native pointer width in bytes.
///
/// Keys and values no larger than this travel by value on the
/// introspection path.
pub const POINTER_SIZE: usize = std::mem::size_of::<usize>();

/// Bytes reserved at the start of every entry before the key.
///
/// Entries live in an array, so there is no intrusive link header.
pub const ENTRY_HEADER_SIZE: usize = 0;

/// Initial capacity of a store's entry array when nothing else is configured.
pub const DEFAULT_ENTRY_CAPACITY: usize = 0;

/// Environment variable selecting the [`TypeIdentity`] mode.
pub const ENV_TYPE_IDENTITY: &str = "RTMAP_TYPE_IDENTITY";

/// Environment variable overriding the initial entry-array capacity.
pub const ENV_ENTRY_CAPACITY: &str = "RTMAP_ENTRY_CAPACITY";

// =======================================================================
// Runtime configuration
// =======================================================================

/// How two distinct descriptors of a composite kind are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeIdentity {
    /// Only identity, pointer recursion and basic kinds are decided; any
    /// other composite comparison fails with
    /// [`Error::UnsupportedTypeIdentity`].
    #[default]
    Strict,
    /// Composite kinds are compared structurally.
    Structural,
}

impl FromStr for TypeIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "structural" => Ok(Self::Structural),
            other => Err(Error::InvalidConfig(format!(
                "{}: expected 'strict' or 'structural', got '{}'",
                ENV_TYPE_IDENTITY, other
            ))),
        }
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Structural => write!(f, "structural"),
        }
    }
}

/// Process-wide tunables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Descriptor identity mode used by interface-key equality.
    pub type_identity: TypeIdentity,
    /// Initial capacity reserved for each new store's entry array.
    pub entry_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeConfig {
    /// Defaults: strict identity, no pre-reserved entries.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            type_identity: TypeIdentity::Strict,
            entry_capacity: DEFAULT_ENTRY_CAPACITY,
        }
    }

    /// Set the identity mode.
    #[must_use]
    pub fn with_type_identity(mut self, mode: TypeIdentity) -> Self {
        self.type_identity = mode;
        self
    }

    /// Set the initial entry-array capacity.
    #[must_use]
    pub fn with_entry_capacity(mut self, capacity: usize) -> Self {
        self.entry_capacity = capacity;
        self
    }

    /// Load from the process environment.
    ///
    /// Invalid values are logged and ignored; unset values keep defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup, falling back to defaults on bad
    /// input.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match Self::try_from_lookup(lookup) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("[config] {}; using defaults", e);
                Self::new()
            }
        }
    }

    /// Strict variant of [`RuntimeConfig::from_lookup`].
    pub fn try_from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();
        if let Some(value) = lookup(ENV_TYPE_IDENTITY) {
            config.type_identity = value.parse()?;
        }
        if let Some(value) = lookup(ENV_ENTRY_CAPACITY) {
            config.entry_capacity = value.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!(
                    "{}: expected an unsigned integer, got '{}'",
                    ENV_ENTRY_CAPACITY, value
                ))
            })?;
        }
        Ok(config)
    }
}

static GLOBAL_CONFIG: OnceLock<ArcSwap<RuntimeConfig>> = OnceLock::new();

fn slot() -> &'static ArcSwap<RuntimeConfig> {
    GLOBAL_CONFIG.get_or_init(|| {
        let config = RuntimeConfig::from_env();
        log::debug!(
            "[config] type_identity={} entry_capacity={}",
            config.type_identity,
            config.entry_capacity
        );
        ArcSwap::from_pointee(config)
    })
}

/// Current process-wide configuration (atomic load).
#[must_use]
pub fn global() -> Arc<RuntimeConfig> {
    slot().load_full()
}

/// Replace the process-wide configuration (atomic swap).
///
/// Stores created earlier keep the capacity they were created with.
pub fn install(config: RuntimeConfig) {
    log::debug!(
        "[config] install type_identity={} entry_capacity={}",
        config.type_identity,
        config.entry_capacity
    );
    slot().store(Arc::new(config));
}
