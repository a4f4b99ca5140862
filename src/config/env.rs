// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Environment variable-based configuration provider.

use serde_json::Value;
use std::collections::HashMap;
use std::env;

use super::ConfigError;
use super::ConfigProvider;

/// Configuration provider backed by prefixed environment variables.
///
/// `SORRIR_ES_INDEX_PREFIX` seen through the prefix `SORRIR_` is exposed as
/// the key `es.index.prefix`. Values stay strings so credentials such as
/// `007` or `1.50` survive untouched. Typed reads parse JSON objects and
/// arrays; [`ConfigProvider::get_raw_string`] returns the variable verbatim.
#[derive(Debug)]
pub struct EnvConfigProvider {
    prefix: String,
    cache: HashMap<String, String>,
}

impl EnvConfigProvider {
    /// Create a provider for the given prefix and load the matching variables.
    pub fn new(prefix: &str) -> Self {
        let mut provider = Self {
            prefix: prefix.to_string(),
            cache: HashMap::new(),
        };
        provider.refresh_cache();
        provider
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Reload the matching environment variables.
    pub fn refresh_cache(&mut self) {
        self.cache.clear();

        for (key, value) in env::vars() {
            if let Some(rest) = key.strip_prefix(&self.prefix) {
                if rest.is_empty() {
                    continue;
                }
                let config_key = rest.to_lowercase().replace('_', ".");
                self.cache.insert(config_key, value);
            }
        }
    }

    fn parse_value_to_json(value: &str) -> Value {
        let trimmed = value.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(json_value) = serde_json::from_str(value) {
                return json_value;
            }
        }
        Value::String(value.to_string())
    }
}

impl Default for EnvConfigProvider {
    fn default() -> Self {
        Self::new("SORRIR_")
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn has(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    fn provider_name(&self) -> &str {
        "env"
    }

    fn get_raw(&self, key: &str) -> Result<Option<Value>, ConfigError> {
        Ok(self
            .cache
            .get(key)
            .map(|value| Self::parse_value_to_json(value)))
    }

    fn get_raw_string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.cache.get(key).cloned())
    }
}
