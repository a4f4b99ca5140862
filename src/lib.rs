// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SORRIR logging - a structured-logging facade for distributed applications
//!
//! Every entry carries a consistent envelope saying who it is for (the
//! stakeholder) and where it came from (the context), and is forwarded either
//! to the console or to an Elasticsearch index.
//!
//! # Stakeholders and Contexts
//!
//! - **USER** entries are application facing and carry an
//!   [`ApplicationContext`] (`unit`, `component`, `degradationMode`).
//! - **SYSTEM** entries are internal and carry a [`SystemContext`]: the
//!   caller-supplied [`Area`] completed with the file and function of the
//!   code that made the call.
//!
//! # Emission
//!
//! - **Full**: [`log`] with explicit context fields.
//! - **Compact**: [`log_compact`] after registering a context for the calling
//!   file with [`config_logger`].
//! - **Per level**: [`debug`], [`info`], [`warn`], [`error`].
//! - **Passthrough**: [`log_default`], message only.
//!
//! The free functions use a process-wide default instance; [`SorrirLogger`]
//! can also be built explicitly with an injected sink and registry.
//!
//! ```rust,no_run
//! use serde_json::json;
//! use sorrir_logging::{ApplicationContext, Area, LogLevel, Stakeholder};
//!
//! sorrir_logging::config_logger(ApplicationContext::new("pod1", "DSB", "Manual"));
//! sorrir_logging::log_compact(LogLevel::Info, Stakeholder::User, "ping", json!({"k": 1}));
//!
//! sorrir_logging::log(LogLevel::Warn, "queue stalled", json!(null), Area::Execution);
//! ```
//!
//! # Sink Selection
//!
//! The remote sink is used when the runtime is not `production` and
//! `SORRIR_ES_URL`, `SORRIR_ES_USER` and `SORRIR_ES_PASSWORD` are all set;
//! see [`config`] for every key.

pub mod config;
pub mod context;
pub mod diag;
mod global;
pub mod logger;
pub mod record;
pub mod registry;
pub mod resolver;
pub mod sink;

pub use config::{Config, ConfigError, ConfigProvider, ConfigProviderExt, EnvConfigProvider};
pub use context::{
    ApplicationContext, Area, Context, ContextFields, LogEntry, Stakeholder, SystemContext,
    SystemContextStripped,
};
pub use global::{
    config_logger, debug, error, get_logger, info, log, log_compact, log_default, sorrir_logger,
    warn,
};
pub use logger::{ListenerId, LoggerError, SorrirLogger, SorrirLoggerBuilder};
pub use record::{FormattedRecord, LogLevel};
pub use registry::ContextRegistry;
pub use resolver::CallSite;
pub use sink::{
    ConsoleSink, IndexPolicy, RemoteConfig, RemoteSink, Sink, SinkError, SinkSelection,
    WarningHandler,
};
