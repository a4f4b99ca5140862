// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The logger instance and its emission API.
//!
//! A [`SorrirLogger`] assembles the `{context, host, data}` envelope for every
//! call, stamps and formats the record, notifies listeners and hands it to
//! its sink. Emission never fails from the caller's point of view; sink
//! problems go to the warning handler.
//!
//! ```no_run
//! use serde_json::json;
//! use sorrir_logging::{ApplicationContext, Area, LogLevel, SorrirLogger, Stakeholder};
//!
//! let logger = SorrirLogger::from_env();
//!
//! logger
//!     .log(
//!         LogLevel::Info,
//!         "ping",
//!         json!({"k": 1}),
//!         ApplicationContext::new("pod1", "DSB", "Manual"),
//!     )
//!     .configure(Area::Resilience)
//!     .log_compact(LogLevel::Warn, Stakeholder::System, "degraded", json!(null));
//! ```


use serde_json::Value;
use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::context::{Context, ContextFields, LogEntry, Stakeholder, UNKNOWN};
use crate::record::{FormattedRecord, LogLevel};
use crate::registry::ContextRegistry;
use crate::resolver::{CallSite, CallerResolver};
use crate::sink::{
    ConsoleSink, Sink, SinkError, SinkSelection, WarningHandler, stderr_warning_handler,
};
use crate::{debug_fmt, warn_fmt};

/// Errors that can occur while building a logger.
#[derive(Error, Debug)]
pub enum LoggerError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Sink error
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Handle returned by [`SorrirLogger::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&FormattedRecord) + Send + Sync>;

/// The machine hostname, or `"unknown"`.
pub fn local_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Structured logger bound to one sink and one context registry.
pub struct SorrirLogger {
    sink: Box<dyn Sink>,
    registry: Arc<ContextRegistry>,
    listeners: RwLock<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
    host: String,
    resolver: CallerResolver,
    warnings: WarningHandler,
}

impl fmt::Debug for SorrirLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SorrirLogger")
            .field("sink", &self.sink)
            .field("registry", &self.registry)
            .field("host", &self.host)
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl SorrirLogger {
    pub fn builder() -> SorrirLoggerBuilder {
        SorrirLoggerBuilder::new()
    }

    /// Build a logger from `NODE_ENV` and the `SORRIR_ES_*` variables.
    ///
    /// Falls back to the console sink when the remote sink cannot be set up.
    pub fn from_env() -> Self {
        Self::from_config(&Config::from_env())
    }

    /// Build a logger from layered configuration, with the same console fallback
    /// as [`SorrirLogger::from_env`].
    pub fn from_config(config: &Config) -> Self {
        let warnings = stderr_warning_handler();

        let sink = SinkSelection::from_config(config)
            .map_err(LoggerError::from)
            .and_then(|selection| selection.build(warnings.clone()).map_err(LoggerError::from))
            .unwrap_or_else(|err| {
                warn_fmt!("SorrirLogger", "{}; falling back to the console sink", err);
                Box::new(ConsoleSink::stdout()) as Box<dyn Sink>
            });

        Self::assemble(
            sink,
            Arc::new(ContextRegistry::new()),
            local_hostname(),
            CallerResolver::default(),
            warnings,
        )
    }

    fn assemble(
        sink: Box<dyn Sink>,
        registry: Arc<ContextRegistry>,
        host: String,
        resolver: CallerResolver,
        warnings: WarningHandler,
    ) -> Self {
        debug_fmt!("SorrirLogger", "Logger for host '{}' writes to the {} sink", host, sink.name());
        Self {
            sink,
            registry,
            listeners: RwLock::new(Vec::new()),
            next_listener: AtomicU64::new(0),
            host,
            resolver,
            warnings,
        }
    }

    pub fn registry(&self) -> &Arc<ContextRegistry> {
        &self.registry
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    /// Call `listener` synchronously for every formatted record.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&FormattedRecord) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Message-only record: no context, host or data.
    pub fn log_default(&self, level: LogLevel, message: impl Into<String>) -> &Self {
        self.dispatch(FormattedRecord::new(level, message, None))
    }

    /// Full record with caller-supplied context fields.
    ///
    /// The variant of `fields` selects the stakeholder. System contexts are
    /// completed with the caller's file and function.
    #[track_caller]
    pub fn log(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        data: Value,
        fields: impl Into<ContextFields>,
    ) -> &Self {
        let fields = fields.into();
        let site = self.call_site(fields.stakeholder(), Location::caller());
        self.emit(level, message.into(), data, fields, &site)
    }

    /// [`SorrirLogger::log`] with an explicit call site.
    pub fn log_at(
        &self,
        site: &CallSite,
        level: LogLevel,
        message: impl Into<String>,
        data: Value,
        fields: impl Into<ContextFields>,
    ) -> &Self {
        self.emit(level, message.into(), data, fields.into(), site)
    }

    /// Record using the context registered for the caller's file.
    #[track_caller]
    pub fn log_compact(
        &self,
        level: LogLevel,
        stakeholder: Stakeholder,
        message: impl Into<String>,
        data: Value,
    ) -> &Self {
        let site = self.call_site(stakeholder, Location::caller());
        self.emit_compact(level, stakeholder, message.into(), data, &site)
    }

    /// [`SorrirLogger::log_compact`] with an explicit call site.
    pub fn log_compact_at(
        &self,
        site: &CallSite,
        level: LogLevel,
        stakeholder: Stakeholder,
        message: impl Into<String>,
        data: Value,
    ) -> &Self {
        self.emit_compact(level, stakeholder, message.into(), data, site)
    }

    /// Register `fields` for the caller's file.
    #[track_caller]
    pub fn configure(&self, fields: impl Into<ContextFields>) -> &Self {
        self.registry.register(Location::caller().file(), fields.into());
        self
    }

    /// [`SorrirLogger::configure`] for the file of an explicit call site.
    pub fn configure_at(&self, site: &CallSite, fields: impl Into<ContextFields>) -> &Self {
        self.registry.register(&site.file, fields.into());
        self
    }

    #[track_caller]
    pub fn debug(
        &self,
        stakeholder: Stakeholder,
        message: impl Into<String>,
        data: Value,
        fields: Option<ContextFields>,
    ) -> &Self {
        self.at_level(LogLevel::Debug, stakeholder, message.into(), data, fields, Location::caller())
    }

    #[track_caller]
    pub fn info(
        &self,
        stakeholder: Stakeholder,
        message: impl Into<String>,
        data: Value,
        fields: Option<ContextFields>,
    ) -> &Self {
        self.at_level(LogLevel::Info, stakeholder, message.into(), data, fields, Location::caller())
    }

    #[track_caller]
    pub fn warn(
        &self,
        stakeholder: Stakeholder,
        message: impl Into<String>,
        data: Value,
        fields: Option<ContextFields>,
    ) -> &Self {
        self.at_level(LogLevel::Warn, stakeholder, message.into(), data, fields, Location::caller())
    }

    #[track_caller]
    pub fn error(
        &self,
        stakeholder: Stakeholder,
        message: impl Into<String>,
        data: Value,
        fields: Option<ContextFields>,
    ) -> &Self {
        self.at_level(LogLevel::Error, stakeholder, message.into(), data, fields, Location::caller())
    }

    // Supplied fields win over `stakeholder`.
    fn at_level(
        &self,
        level: LogLevel,
        stakeholder: Stakeholder,
        message: String,
        data: Value,
        fields: Option<ContextFields>,
        location: &Location<'_>,
    ) -> &Self {
        match fields {
            Some(fields) => {
                let site = self.call_site(fields.stakeholder(), location);
                self.emit(level, message, data, fields, &site)
            }
            None => {
                let site = self.call_site(stakeholder, location);
                self.emit_compact(level, stakeholder, message, data, &site)
            }
        }
    }

    // Only system contexts need the function name.
    fn call_site(&self, stakeholder: Stakeholder, location: &Location<'_>) -> CallSite {
        match stakeholder {
            Stakeholder::System => self.resolver.resolve(location),
            Stakeholder::User => CallSite::unresolved(location),
        }
    }

    fn emit_compact(
        &self,
        level: LogLevel,
        stakeholder: Stakeholder,
        message: String,
        data: Value,
        site: &CallSite,
    ) -> &Self {
        let fields = self.registry.lookup(&site.file, stakeholder);
        self.emit(level, message, data, fields, site)
    }

    fn emit(
        &self,
        level: LogLevel,
        message: String,
        data: Value,
        fields: ContextFields,
        site: &CallSite,
    ) -> &Self {
        let context = match fields {
            ContextFields::Application(ctx) => Context::User(ctx),
            ContextFields::System(ctx) => {
                // Entries name the file only; the registry keys on the full path.
                Context::System(ctx.with_location(site.file_name(), site.function.as_str()))
            }
        };
        let entry = LogEntry {
            context,
            host: self.host.clone(),
            data,
        };
        self.dispatch(FormattedRecord::new(level, message, Some(entry)))
    }

    fn dispatch(&self, record: FormattedRecord) -> &Self {
        // Listeners may subscribe from inside a callback, so call them unlocked.
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&record);
        }

        if let Err(err) = self.sink.write(&record) {
            (self.warnings)(&err);
        }
        self
    }
}

/// Builder for [`SorrirLogger`].
#[derive(Default)]
pub struct SorrirLoggerBuilder {
    sink: Option<Box<dyn Sink>>,
    selection: Option<SinkSelection>,
    host: Option<String>,
    registry: Option<Arc<ContextRegistry>>,
    warnings: Option<WarningHandler>,
    capture_function_names: Option<bool>,
}

impl fmt::Debug for SorrirLoggerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SorrirLoggerBuilder")
            .field("sink", &self.sink)
            .field("selection", &self.selection)
            .field("host", &self.host)
            .field("registry", &self.registry)
            .field("capture_function_names", &self.capture_function_names)
            .finish()
    }
}

impl SorrirLoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this sink. Takes precedence over [`SorrirLoggerBuilder::selection`].
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Build the sink from a selection. Defaults to the console sink.
    pub fn selection(mut self, selection: SinkSelection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Override the hostname attached to every entry.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Share a context registry with other loggers.
    pub fn registry(mut self, registry: Arc<ContextRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Receive sink warnings instead of having them printed to stderr.
    pub fn warning_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&SinkError) + Send + Sync + 'static,
    {
        self.warnings = Some(Arc::new(handler));
        self
    }

    /// Whether system entries resolve the caller's function name (default: true).
    pub fn capture_function_names(mut self, enabled: bool) -> Self {
        self.capture_function_names = Some(enabled);
        self
    }

    pub fn build(self) -> Result<SorrirLogger, LoggerError> {
        let warnings = self.warnings.unwrap_or_else(stderr_warning_handler);

        let sink = match self.sink {
            Some(sink) => sink,
            None => self
                .selection
                .unwrap_or(SinkSelection::Console)
                .build(warnings.clone())?,
        };

        let resolver = self
            .capture_function_names
            .map(CallerResolver::new)
            .unwrap_or_default();

        Ok(SorrirLogger::assemble(
            sink,
            self.registry.unwrap_or_default(),
            self.host.unwrap_or_else(local_hostname),
            resolver,
            warnings,
        ))
    }
}
