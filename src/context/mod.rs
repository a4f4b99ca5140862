// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Context model for log entries.
//!
//! Every entry emitted through the facade is addressed to a [`Stakeholder`]:
//! application-facing entries carry an [`ApplicationContext`], internal ones a
//! [`SystemContext`]. Callers hand in [`ContextFields`], an explicit tagged
//! variant; the system variant is *stripped* because the file and function
//! are filled in by the caller-location resolver.

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder used for every context field that could not be determined.
pub const UNKNOWN: &str = "unknown";

/// Audience of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stakeholder {
    /// Application/business facing.
    User,
    /// Internal/operational.
    System,
}

impl Stakeholder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stakeholder::User => "USER",
            Stakeholder::System => "SYSTEM",
        }
    }
}

impl fmt::Display for Stakeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stakeholder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(Stakeholder::User),
            "SYSTEM" => Ok(Stakeholder::System),
            _ => Err(format!("unknown stakeholder '{s}' (expected USER or SYSTEM)")),
        }
    }
}

/// Which functional unit/component emitted an application-facing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationContext {
    pub unit: String,
    pub component: String,
    #[serde(rename = "degradationMode")]
    pub degradation_mode: String,
}

impl ApplicationContext {
    pub fn new(
        unit: impl Into<String>,
        component: impl Into<String>,
        degradation_mode: impl Into<String>,
    ) -> Self {
        Self {
            unit: unit.into(),
            component: component.into(),
            degradation_mode: degradation_mode.into(),
        }
    }
}

impl Default for ApplicationContext {
    fn default() -> Self {
        Self::new(UNKNOWN, UNKNOWN, UNKNOWN)
    }
}

/// Architectural layer a system entry originates from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Execution,
    Operation,
    Orchestration,
    Resilience,
    #[default]
    Unknown,
}

impl Area {
    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Execution => "execution",
            Area::Operation => "operation",
            Area::Orchestration => "orchestration",
            Area::Resilience => "resilience",
            Area::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Area {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "execution" => Ok(Area::Execution),
            "operation" => Ok(Area::Operation),
            "orchestration" => Ok(Area::Orchestration),
            "resilience" => Ok(Area::Resilience),
            "unknown" => Ok(Area::Unknown),
            _ => Err(format!("unknown area '{s}'")),
        }
    }
}

/// System context as supplied by a caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemContextStripped {
    pub area: Area,
}

impl SystemContextStripped {
    pub fn new(area: Area) -> Self {
        Self { area }
    }

    /// Completes the context with the resolved call site.
    pub fn with_location(self, file: impl Into<String>, function: impl Into<String>) -> SystemContext {
        SystemContext {
            file: file.into(),
            area: self.area,
            function: function.into(),
        }
    }
}

impl From<Area> for SystemContextStripped {
    fn from(area: Area) -> Self {
        Self::new(area)
    }
}

/// System context as attached to an emitted entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemContext {
    pub file: String,
    pub area: Area,
    pub function: String,
}

/// Context fields handed to the emission API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextFields {
    Application(ApplicationContext),
    System(SystemContextStripped),
}

impl ContextFields {
    pub fn stakeholder(&self) -> Stakeholder {
        match self {
            ContextFields::Application(_) => Stakeholder::User,
            ContextFields::System(_) => Stakeholder::System,
        }
    }

    /// The context used when nothing was registered for a stakeholder.
    pub fn default_for(stakeholder: Stakeholder) -> Self {
        match stakeholder {
            Stakeholder::User => ContextFields::Application(ApplicationContext::default()),
            Stakeholder::System => ContextFields::System(SystemContextStripped::default()),
        }
    }
}

impl From<ApplicationContext> for ContextFields {
    fn from(ctx: ApplicationContext) -> Self {
        ContextFields::Application(ctx)
    }
}

impl From<SystemContextStripped> for ContextFields {
    fn from(ctx: SystemContextStripped) -> Self {
        ContextFields::System(ctx)
    }
}

impl From<Area> for ContextFields {
    fn from(area: Area) -> Self {
        ContextFields::System(SystemContextStripped::new(area))
    }
}

/// The `context` block of an entry: stakeholder tag plus its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stakeholder", content = "contextFields", rename_all = "UPPERCASE")]
pub enum Context {
    User(ApplicationContext),
    System(SystemContext),
}

impl Context {
    pub fn stakeholder(&self) -> Stakeholder {
        match self {
            Context::User(_) => Stakeholder::User,
            Context::System(_) => Stakeholder::System,
        }
    }
}

/// The envelope nested under `metadata` in every formatted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub context: Context,
    pub host: String,
    pub data: Value,
}
