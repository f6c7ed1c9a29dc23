// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Logging initialization for the rtmap C FFI.
//!
//! The runtime logs through the `log` facade under the `rtmap` target with
//! `[map]`, `[types]`, `[config]`, `[mem]` and `[ffi]` prefixes. A host
//! process that has no Rust logger of its own installs one here. Other
//! crates linked into the same library stay at `warn`.

use std::ffi::CStr;
use std::os::raw::c_char;

use super::RtmapError;

const RTMAP_LOG_ENV: &str = "RTMAP_LOG";

const RUNTIME_TARGETS: [&str; 2] = ["rtmap", "rtmap_c"];

/// Log level for rtmap logging
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtmapLogLevel {
    RtmapLogOff = 0,
    RtmapLogError = 1,
    RtmapLogWarn = 2,
    RtmapLogInfo = 3,
    RtmapLogDebug = 4,
    RtmapLogTrace = 5,
}

impl From<RtmapLogLevel> for log::LevelFilter {
    fn from(level: RtmapLogLevel) -> Self {
        match level {
            RtmapLogLevel::RtmapLogOff => log::LevelFilter::Off,
            RtmapLogLevel::RtmapLogError => log::LevelFilter::Error,
            RtmapLogLevel::RtmapLogWarn => log::LevelFilter::Warn,
            RtmapLogLevel::RtmapLogInfo => log::LevelFilter::Info,
            RtmapLogLevel::RtmapLogDebug => log::LevelFilter::Debug,
            RtmapLogLevel::RtmapLogTrace => log::LevelFilter::Trace,
        }
    }
}

/// Filter string that sets the runtime targets to `level` and everything
/// else to `warn`, e.g. `"warn,rtmap=debug,rtmap_c=debug"`.
pub(crate) fn runtime_filter(level: log::LevelFilter) -> String {
    let mut filter = String::from("warn");
    for target in RUNTIME_TARGETS {
        filter.push_str(&format!(",{}={}", target, level.to_string().to_lowercase()));
    }
    filter
}

fn install(mut builder: env_logger::Builder, description: &str) -> RtmapError {
    match builder.format_timestamp_millis().try_init() {
        Ok(()) => {
            log::debug!("[ffi] logging initialized ({})", description);
            RtmapError::RtmapOk
        }
        // A logger is already installed in this process.
        Err(_) => RtmapError::RtmapOperationFailed,
    }
}

/// Initialize logging to stderr, with the runtime at `level`.
///
/// # Safety
/// Must be called from a single thread during initialization.
///
/// # Returns
/// `RtmapOk` on success, `RtmapOperationFailed` if a logger is already
/// installed.
///
/// # Example (C)
/// ```c
/// rtmap_logging_init(RTMAP_LOG_DEBUG);
/// ```
#[no_mangle]
pub unsafe extern "C" fn rtmap_logging_init(level: RtmapLogLevel) -> RtmapError {
    let filter = runtime_filter(level.into());
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(&filter);
    install(builder, &filter)
}

/// Initialize logging from `RTMAP_LOG`, falling back to the runtime at
/// `default_level` when it is unset.
///
/// # Safety
/// Must be called from a single thread during initialization.
#[no_mangle]
pub unsafe extern "C" fn rtmap_logging_init_env(default_level: RtmapLogLevel) -> RtmapError {
    let fallback = runtime_filter(default_level.into());
    let env = env_logger::Env::new().filter_or(RTMAP_LOG_ENV, fallback.as_str());
    install(env_logger::Builder::from_env(env), RTMAP_LOG_ENV)
}

/// Initialize logging with a filter string such as `"rtmap=trace,warn"`.
///
/// # Safety
/// - `filter` must be a valid null-terminated C string or NULL.
#[no_mangle]
pub unsafe extern "C" fn rtmap_logging_init_with_filter(filter: *const c_char) -> RtmapError {
    if filter.is_null() {
        return RtmapError::RtmapInvalidArgument;
    }

    let Ok(filter_str) = CStr::from_ptr(filter).to_str() else {
        return RtmapError::RtmapInvalidArgument;
    };

    let mut builder = env_logger::Builder::new();
    builder.parse_filters(filter_str);
    install(builder, filter_str)
}
