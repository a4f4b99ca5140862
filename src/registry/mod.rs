// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-file context registry.
//!
//! A source file registers its context once and later compact calls from the
//! same file pick it up. Entries are keyed by the caller's file path, live as
//! long as the registry and are overwritten by a new registration.

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::context::{ApplicationContext, ContextFields, Stakeholder, SystemContextStripped};

/// Registered contexts, one map per stakeholder.
#[derive(Debug, Default)]
pub struct ContextRegistry {
    application: RwLock<HashMap<String, ApplicationContext>>,
    system: RwLock<HashMap<String, SystemContextStripped>>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `fields` for `file`, replacing any earlier entry of the same kind.
    pub fn register(&self, file: &str, fields: ContextFields) {
        match fields {
            ContextFields::Application(ctx) => {
                self.application
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(file.to_string(), ctx);
            }
            ContextFields::System(ctx) => {
                self.system
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(file.to_string(), ctx);
            }
        }
    }

    /// The application context registered for `file`, or the all-`unknown` default.
    pub fn application(&self, file: &str) -> ApplicationContext {
        self.application
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(file)
            .cloned()
            .unwrap_or_default()
    }

    /// The system context registered for `file`, or `{area: unknown}`.
    pub fn system(&self, file: &str) -> SystemContextStripped {
        self.system
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(file)
            .copied()
            .unwrap_or_default()
    }

    pub fn lookup(&self, file: &str, stakeholder: Stakeholder) -> ContextFields {
        match stakeholder {
            Stakeholder::User => ContextFields::Application(self.application(file)),
            Stakeholder::System => ContextFields::System(self.system(file)),
        }
    }

    pub fn contains(&self, file: &str, stakeholder: Stakeholder) -> bool {
        match stakeholder {
            Stakeholder::User => self
                .application
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(file),
            Stakeholder::System => self
                .system
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(file),
        }
    }

    /// Total number of registered entries across both stakeholders.
    pub fn len(&self) -> usize {
        let application = self
            .application
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        let system = self.system.read().unwrap_or_else(PoisonError::into_inner).len();
        application + system
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every registration.
    pub fn clear(&self) {
        self.application
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.system
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
