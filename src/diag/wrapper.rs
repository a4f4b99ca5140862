// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Component-tagged wrappers around the `log` macros.
//!
//! The macros reach `log` through this crate, so callers need no `log`
//! dependency of their own.

/// Log an error message with a component tag.
#[macro_export]
macro_rules! error_fmt {
    ($context:expr, $($arg:tt)+) => {
        $crate::diag::log::error!("[{}] {}", $context, format_args!($($arg)+))
    };
}

/// Log a warning message with a component tag.
#[macro_export]
macro_rules! warn_fmt {
    ($context:expr, $($arg:tt)+) => {
        $crate::diag::log::warn!("[{}] {}", $context, format_args!($($arg)+))
    };
}

/// Log an info message with a component tag.
#[macro_export]
macro_rules! info_fmt {
    ($context:expr, $($arg:tt)+) => {
        $crate::diag::log::info!("[{}] {}", $context, format_args!($($arg)+))
    };
}

/// Log a debug message with a component tag.
#[macro_export]
macro_rules! debug_fmt {
    ($context:expr, $($arg:tt)+) => {
        $crate::diag::log::debug!("[{}] {}", $context, format_args!($($arg)+))
    };
}
