// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Process-wide default logger and the free functions delegating to it.
//!
//! The default instance is built from the environment on first use and
//! lives for the rest of the process.

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::context::{ContextFields, Stakeholder};
use crate::logger::SorrirLogger;
use crate::record::LogLevel;

static DEFAULT_LOGGER: Lazy<SorrirLogger> = Lazy::new(SorrirLogger::from_env);

/// The default instance, e.g. for subscribing listeners.
pub fn sorrir_logger() -> &'static SorrirLogger {
    &DEFAULT_LOGGER
}

/// A new logger built from the current environment, with its own registry.
pub fn get_logger() -> SorrirLogger {
    SorrirLogger::from_env()
}

/// See [`SorrirLogger::log`].
#[track_caller]
pub fn log(
    level: LogLevel,
    message: impl Into<String>,
    data: Value,
    fields: impl Into<ContextFields>,
) -> &'static SorrirLogger {
    sorrir_logger().log(level, message, data, fields)
}

/// See [`SorrirLogger::log_compact`].
#[track_caller]
pub fn log_compact(
    level: LogLevel,
    stakeholder: Stakeholder,
    message: impl Into<String>,
    data: Value,
) -> &'static SorrirLogger {
    sorrir_logger().log_compact(level, stakeholder, message, data)
}

/// See [`SorrirLogger::log_default`].
pub fn log_default(level: LogLevel, message: impl Into<String>) -> &'static SorrirLogger {
    sorrir_logger().log_default(level, message)
}

/// Register `fields` for the caller's file on the default instance.
#[track_caller]
pub fn config_logger(fields: impl Into<ContextFields>) -> &'static SorrirLogger {
    sorrir_logger().configure(fields)
}

#[track_caller]
pub fn debug(
    stakeholder: Stakeholder,
    message: impl Into<String>,
    data: Value,
    fields: Option<ContextFields>,
) -> &'static SorrirLogger {
    sorrir_logger().debug(stakeholder, message, data, fields)
}

#[track_caller]
pub fn info(
    stakeholder: Stakeholder,
    message: impl Into<String>,
    data: Value,
    fields: Option<ContextFields>,
) -> &'static SorrirLogger {
    sorrir_logger().info(stakeholder, message, data, fields)
}

#[track_caller]
pub fn warn(
    stakeholder: Stakeholder,
    message: impl Into<String>,
    data: Value,
    fields: Option<ContextFields>,
) -> &'static SorrirLogger {
    sorrir_logger().warn(stakeholder, message, data, fields)
}

#[track_caller]
pub fn error(
    stakeholder: Stakeholder,
    message: impl Into<String>,
    data: Value,
    fields: Option<ContextFields>,
) -> &'static SorrirLogger {
    sorrir_logger().error(stakeholder, message, data, fields)
}
