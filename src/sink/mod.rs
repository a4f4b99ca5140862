// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sinks and sink selection.
//!
//! A logger owns exactly one [`Sink`], chosen once when it is built:
//!
//! - [`ConsoleSink`] writes one JSON object per record (slog + slog-json).
//! - [`RemoteSink`] ships records to an Elasticsearch index after reshaping
//!   them with [`transform`].
//!
//! [`SinkSelection::from_config`] applies the selection rule: the remote sink
//! is used only outside `production` and only when the endpoint URL, user and
//! password are all set.

mod console;
mod remote;
pub mod transform;


pub use console::{ConsoleSink, SharedBuffer};
pub use remote::{DEFAULT_REQUEST_TIMEOUT, IndexPolicy, RemoteConfig, RemoteSink};
pub use transform::{LogData, transform};

use std::fmt::Debug;
use std::sync::{Arc, Once};
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::record::FormattedRecord;
use crate::{info_fmt, warn_fmt};

pub const RUNTIME_ENV_KEY: &str = "env";
pub const PRODUCTION: &str = "production";
pub const ES_URL_KEY: &str = "es.url";
pub const ES_USER_KEY: &str = "es.user";
pub const ES_PASSWORD_KEY: &str = "es.password";
pub const ES_INDEX_KEY: &str = "es.index";
pub const ES_INDEX_PREFIX_KEY: &str = "es.index.prefix";
pub const ES_DEBUG_KEY: &str = "es.debug";
pub const DEFAULT_INDEX_PREFIX: &str = "filebeat-debug";

static INDEX_PRECEDENCE_NOTICE: Once = Once::new();

/// Log that the explicit index shadows the prefix. Only the first call in a
/// process logs; returns whether this call did.
fn warn_index_precedence_once(index: &str, prefix: &str) -> bool {
    let mut logged = false;
    INDEX_PRECEDENCE_NOTICE.call_once(|| {
        warn_fmt!(
            "SinkSelector",
            "Both index '{}' and index prefix '{}' are configured; using the index",
            index,
            prefix
        );
        logged = true;
    });
    logged
}

/// Errors raised by sinks. Emission never returns them to the caller; they
/// are reported through a [`WarningHandler`].
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to set up remote sink: {0}")]
    Setup(String),

    #[error("delivery to index '{index}' failed: {message}")]
    Delivery { index: String, message: String },

    #[error("remote sink shipper is no longer running")]
    Closed,
}

/// Callback receiving sink warnings.
pub type WarningHandler = Arc<dyn Fn(&SinkError) + Send + Sync>;

/// Writes `Warning: <error>` to stderr.
pub fn stderr_warning_handler() -> WarningHandler {
    Arc::new(|err: &SinkError| eprintln!("Warning: {err}"))
}

/// Destination of formatted records.
pub trait Sink: Debug + Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    /// Hand a record to the destination. Must not block on remote I/O.
    fn write(&self, record: &FormattedRecord) -> Result<(), SinkError>;
}

/// Which sink a logger should be built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkSelection {
    Console,
    Remote(RemoteConfig),
}

impl SinkSelection {
    /// Select from `NODE_ENV` and the `SORRIR_ES_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_config(&Config::from_env())
    }

    /// Select from layered configuration (see [`crate::config`] for the keys).
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let production = config
            .get_non_empty(RUNTIME_ENV_KEY)?
            .is_some_and(|env| env == PRODUCTION);
        if production {
            return Ok(SinkSelection::Console);
        }

        let (Some(url), Some(user), Some(password)) = (
            config.get_non_empty(ES_URL_KEY)?,
            config.get_non_empty(ES_USER_KEY)?,
            config.get_non_empty(ES_PASSWORD_KEY)?,
        ) else {
            return Ok(SinkSelection::Console);
        };

        let index = match (
            config.get_non_empty(ES_INDEX_KEY)?,
            config.get_non_empty(ES_INDEX_PREFIX_KEY)?,
        ) {
            (Some(index), Some(prefix)) => {
                warn_index_precedence_once(&index, &prefix);
                IndexPolicy::Explicit(index)
            }
            (Some(index), None) => IndexPolicy::Explicit(index),
            (None, prefix) => {
                IndexPolicy::Prefix(prefix.unwrap_or_else(|| DEFAULT_INDEX_PREFIX.to_string()))
            }
        };

        let remote = RemoteConfig::new(&url, user, password)?
            .with_index(index)
            .with_debug_tag(config.get_non_empty(ES_DEBUG_KEY)?);

        Ok(SinkSelection::Remote(remote))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, SinkSelection::Remote(_))
    }

    /// Build the selected sink.
    pub fn build(self, warnings: WarningHandler) -> Result<Box<dyn Sink>, SinkError> {
        match self {
            SinkSelection::Console => Ok(Box::new(ConsoleSink::stdout())),
            SinkSelection::Remote(remote) => {
                info_fmt!(
                    "SinkSelector",
                    "Shipping records to {} ({})",
                    remote.url(),
                    remote.index()
                );
                Ok(Box::new(RemoteSink::new(remote, warnings)?))
            }
        }
    }
}
