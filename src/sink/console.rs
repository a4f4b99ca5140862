// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Console sink: one JSON object per record.
//!
//! Output shape: `{"level": .., "message": .., "timestamp": .., "metadata": {..}}`,
//! `metadata` being absent for passthrough records.

use slog::{Drain, FnValue, Level, Logger, PushFnValue, Record, o};
use slog_async::{Async, AsyncGuard, OverflowStrategy};
use slog_json::Json;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use super::{Sink, SinkError};
use crate::record::{FormattedRecord, LogLevel};

// Capacity of the async channel; writers block once it is full.
const ASYNC_CHANNEL_SIZE: usize = 1024;

// slog builds a static record per call site, so the level has to be a constant.
macro_rules! write_record {
    ($logger:expr, $level:expr, $record:expr) => {
        match &$record.metadata {
            Some(entry) => slog::log!(
                $logger,
                $level,
                "",
                "{}",
                $record.message;
                "timestamp" => $record.timestamp_string(),
                "metadata" => slog::Serde(entry.clone())
            ),
            None => slog::log!(
                $logger,
                $level,
                "",
                "{}",
                $record.message;
                "timestamp" => $record.timestamp_string()
            ),
        }
    };
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::Critical => "critical",
        Level::Error => "error",
        Level::Warning => "warn",
        Level::Info => "info",
        Level::Debug => "debug",
        Level::Trace => "trace",
    }
}

fn json_drain<W: io::Write>(writer: W) -> Json<W> {
    Json::new(writer)
        .set_newlines(true)
        .add_key_value(o!(
            "level" => FnValue(|record: &Record| level_name(record.level())),
            "message" => PushFnValue(|record: &Record, ser| ser.emit(record.msg())),
        ))
        .build()
}

/// Writes formatted records as JSON lines.
pub struct ConsoleSink {
    logger: Logger,
    // Dropped after `logger` so pending records are flushed first.
    _guard: Option<AsyncGuard>,
}

impl ConsoleSink {
    /// JSON lines on stdout, written from a background thread.
    pub fn stdout() -> Self {
        Self::with_async_writer(io::stdout())
    }

    /// JSON lines written to `writer` from a background thread.
    ///
    /// Nothing is dropped: callers block while the channel is full. Dropping
    /// the sink waits for every queued record to be written.
    pub fn with_async_writer<W: io::Write + Send + 'static>(writer: W) -> Self {
        let drain = json_drain(writer).ignore_res();
        let (drain, guard) = Async::new(drain)
            .chan_size(ASYNC_CHANNEL_SIZE)
            .overflow_strategy(OverflowStrategy::Block)
            .thread_name("sorrir-console".to_string())
            .build_with_guard();

        Self {
            logger: Logger::root(drain.ignore_res(), o!()),
            _guard: Some(guard),
        }
    }

    /// JSON lines written synchronously to `writer`.
    pub fn with_writer<W: io::Write + Send + 'static>(writer: W) -> Self {
        let drain = Mutex::new(json_drain(writer)).ignore_res();

        Self {
            logger: Logger::root(drain, o!()),
            _guard: None,
        }
    }
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("async", &self._guard.is_some())
            .finish()
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn write(&self, record: &FormattedRecord) -> Result<(), SinkError> {
        match record.level {
            LogLevel::Debug => write_record!(self.logger, Level::Debug, record),
            LogLevel::Info => write_record!(self.logger, Level::Info, record),
            LogLevel::Warn => write_record!(self.logger, Level::Warning, record),
            LogLevel::Error => write_record!(self.logger, Level::Error, record),
        }
        Ok(())
    }
}

/// In-memory writer for capturing console output.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let bytes = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Every complete line that parses as JSON.
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.contents()
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
