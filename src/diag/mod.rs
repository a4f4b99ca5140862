// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Diagnostic logging for the facade itself.
//!
//! Messages about the facade's own operation (sink selection, fallbacks,
//! unresolvable call sites) go through the standard `log` facade, tagged with
//! the component that produced them. They are never shipped to the selected
//! sink.

pub mod wrapper;

#[doc(hidden)]
pub use ::log;

use ::log::{LevelFilter, info};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize diagnostic logging with the specified level.
///
/// `RUST_LOG` still takes precedence. Only the first call has an effect.
pub fn init(level: Option<LevelFilter>) {
    INIT.call_once(|| {
        let env = env_logger::Env::default().filter_or(
            "RUST_LOG",
            level.map_or("warn", |l| match l {
                LevelFilter::Trace => "trace",
                LevelFilter::Debug => "debug",
                LevelFilter::Info => "info",
                LevelFilter::Warn => "warn",
                LevelFilter::Error => "error",
                LevelFilter::Off => "off",
            }),
        );

        // A host application may already own the global logger.
        let _ = env_logger::Builder::from_env(env)
            .format_timestamp_millis()
            .format_target(true)
            .try_init();

        info!("Diagnostic logging initialized at level: {}", ::log::max_level());
    });
}
