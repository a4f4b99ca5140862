// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Caller-location resolution.
//!
//! Public entry points of the facade are `#[track_caller]`, so the caller's
//! file and line are always exact. The enclosing function name is recovered
//! from a captured backtrace: the frames are parsed with regular expressions
//! and the one located at the caller's file and line names the function.
//!
//! Resolution is total. Stripped binaries, missing debug info or an
//! unexpected backtrace layout produce [`ResolveError::Unresolvable`]
//! internally, which [`CallerResolver::resolve`] turns into `"unknown"`.
//!
//! Callers that want to avoid backtrace capture altogether can build a
//! [`CallSite`] with [`call_site!`](crate::call_site) and use the `*_at`
//! entry points.


use once_cell::sync::Lazy;
use regex::Regex;
use std::backtrace::Backtrace;
use std::panic::Location;
use std::path::Path;
use thiserror::Error;

use crate::context::UNKNOWN;
use crate::debug_fmt;

static SYMBOL_LINE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\s*\d+:\s+(?P<symbol>\S.*?)\s*$").ok());

static LOCATION_LINE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\s+at\s+(?P<file>.+):(?P<line>\d+):(?P<column>\d+)\s*$").ok());

static SYMBOL_HASH: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"::h[0-9a-f]{16}$").ok());

/// Errors raised while resolving a function name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No frame of the backtrace points at the call site.
    #[error("no stack frame matches {file}:{line}")]
    Unresolvable { file: String, line: u32 },

    /// The frame patterns could not be compiled.
    #[error("stack frame patterns unavailable")]
    PatternUnavailable,
}

/// Logical origin of a logging call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub file: String,
    pub line: u32,
    pub function: String,
}

impl CallSite {
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into(),
        }
    }

    /// A call site whose function could not be determined.
    pub fn unresolved(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line(), UNKNOWN)
    }

    /// Last component of [`CallSite::file`], e.g. `controller.rs`.
    pub fn file_name(&self) -> &str {
        Path::new(&self.file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.file)
    }
}

/// Builds a [`CallSite`] for the current position without capturing a backtrace.
///
/// ```
/// fn handler() -> sorrir_logging::CallSite {
///     sorrir_logging::call_site!()
/// }
///
/// let site = handler();
/// assert!(site.function.ends_with("handler"));
/// ```
#[macro_export]
macro_rules! call_site {
    () => {{
        fn __sorrir_here() {}
        fn __sorrir_type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __sorrir_type_name_of(__sorrir_here);
        $crate::CallSite::new(
            file!(),
            line!(),
            name.strip_suffix("::__sorrir_here").unwrap_or(name),
        )
    }};
}

/// One symbol of a parsed backtrace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub symbol: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

/// Parses the textual form of [`std::backtrace::Backtrace`] into frames.
pub fn parse_frames(trace: &str) -> Result<Vec<Frame>, ResolveError> {
    let (Some(symbol_line), Some(location_line)) = (SYMBOL_LINE.as_ref(), LOCATION_LINE.as_ref())
    else {
        return Err(ResolveError::PatternUnavailable);
    };

    let mut frames: Vec<Frame> = Vec::new();
    for line in trace.lines() {
        if let Some(caps) = location_line.captures(line) {
            // A location belongs to the symbol printed right above it.
            if let Some(frame) = frames.last_mut() {
                if frame.file.is_none() {
                    frame.file = Some(caps["file"].to_string());
                    frame.line = caps["line"].parse().ok();
                }
            }
        } else if let Some(caps) = symbol_line.captures(line) {
            frames.push(Frame {
                symbol: strip_hash(&caps["symbol"]),
                file: None,
                line: None,
            });
        }
    }
    Ok(frames)
}

fn strip_hash(symbol: &str) -> String {
    match SYMBOL_HASH.as_ref() {
        Some(hash) => hash.replace(symbol, "").into_owned(),
        None => symbol.to_string(),
    }
}

/// Picks the function whose frame sits at `file:line`.
///
/// Inlining can shift the recorded line, so the frame with the closest line
/// in the same file is accepted when there is no exact match.
pub fn select_caller(frames: &[Frame], file: &str, line: u32) -> Result<String, ResolveError> {
    let target = Path::new(file);
    frames
        .iter()
        .filter_map(|frame| {
            let frame_file = frame.file.as_deref()?;
            let frame_line = frame.line?;
            Path::new(frame_file)
                .ends_with(target)
                .then(|| (frame_line.abs_diff(line), frame))
        })
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, frame)| frame.symbol.clone())
        .ok_or_else(|| ResolveError::Unresolvable {
            file: file.to_string(),
            line,
        })
}

/// Resolves call sites, optionally recovering function names from backtraces.
#[derive(Debug, Clone, Copy)]
pub struct CallerResolver {
    capture_function_names: bool,
}

impl Default for CallerResolver {
    fn default() -> Self {
        Self {
            capture_function_names: true,
        }
    }
}

impl CallerResolver {
    pub fn new(capture_function_names: bool) -> Self {
        Self {
            capture_function_names,
        }
    }

    pub fn captures_function_names(&self) -> bool {
        self.capture_function_names
    }

    /// Resolve the call site at `location`. Never fails.
    pub fn resolve(&self, location: &Location<'_>) -> CallSite {
        if !self.capture_function_names {
            return CallSite::unresolved(location);
        }

        match self.function_name(location) {
            Ok(function) => CallSite::new(location.file(), location.line(), function),
            Err(err) => {
                debug_fmt!("CallerResolver", "{}; using '{}'", err, UNKNOWN);
                CallSite::unresolved(location)
            }
        }
    }

    /// Capture a backtrace and look up the function enclosing `location`.
    pub fn function_name(&self, location: &Location<'_>) -> Result<String, ResolveError> {
        let trace = Backtrace::force_capture().to_string();
        let frames = parse_frames(&trace)?;
        select_caller(&frames, location.file(), location.line())
    }
}
