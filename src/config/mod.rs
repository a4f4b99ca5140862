// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration lookup for sink selection.
//!
//! A [`Config`] is an ordered list of [`ConfigProvider`]s; later providers
//! override earlier ones. The environment-driven default stacks two
//! [`EnvConfigProvider`]s:
//!
//! 1. `EnvConfigProvider::new("SORRIR_")` – `SORRIR_ES_URL` becomes `es.url`
//! 2. `EnvConfigProvider::new("NODE_")`   – `NODE_ENV` becomes `env`
//!
//! | key | env variable | description |
//! |-----|--------------|-------------|
//! | `env`              | `NODE_ENV`               | `production` forces the console sink |
//! | `es.url`           | `SORRIR_ES_URL`          | Elasticsearch endpoint |
//! | `es.user`          | `SORRIR_ES_USER`         | basic-auth user |
//! | `es.password`      | `SORRIR_ES_PASSWORD`     | basic-auth password |
//! | `es.index`         | `SORRIR_ES_INDEX`        | explicit index, wins over the prefix |
//! | `es.index.prefix`  | `SORRIR_ES_INDEX_PREFIX` | index prefix, default `filebeat-debug` |
//! | `es.debug`         | `SORRIR_ES_DEBUG`        | tag added to every shipped record |

mod env;
pub mod error;


pub use env::EnvConfigProvider;
pub use error::ConfigError;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// Source of configuration values.
pub trait ConfigProvider: Debug + Send + Sync {
    /// Check if the configuration provider has a value for the given key.
    fn has(&self, key: &str) -> bool;

    /// Get the name of the configuration provider for debugging purposes.
    fn provider_name(&self) -> &str;

    /// Get a raw configuration value by key.
    fn get_raw(&self, key: &str) -> Result<Option<Value>, ConfigError>;

    /// Get a value as the text it was configured with.
    ///
    /// Strings come back unchanged; any other value is rendered as JSON.
    fn get_raw_string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.get_raw(key)?.map(|value| match value {
            Value::String(text) => text,
            other => other.to_string(),
        }))
    }
}

/// Typed access on top of [`ConfigProvider`].
pub trait ConfigProviderExt: ConfigProvider {
    /// Get a configuration value by key and deserialize it to the specified type.
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.get_raw(key)? {
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                ConfigError::ParseError(format!("failed to deserialize '{key}': {e}"))
            }),
            None => Ok(None),
        }
    }
}

impl<T: ConfigProvider> ConfigProviderExt for T {}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    providers: Vec<Arc<dyn ConfigProvider>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a configuration provider. It overrides every provider added before it.
    pub fn with_provider<P: ConfigProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    pub fn build(self) -> Config {
        Config {
            providers: self.providers,
        }
    }
}

/// Layered configuration.
#[derive(Debug, Clone)]
pub struct Config {
    providers: Vec<Arc<dyn ConfigProvider>>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// The environment-driven configuration used by `SorrirLogger::from_env`.
    pub fn from_env() -> Self {
        Self::builder()
            .with_provider(EnvConfigProvider::new("SORRIR_"))
            .with_provider(EnvConfigProvider::new("NODE_"))
            .build()
    }

    fn get_raw(&self, key: &str) -> Result<Option<Value>, ConfigError> {
        for provider in self.providers.iter().rev() {
            if provider.has(key) {
                return provider.get_raw(key);
            }
        }
        Ok(None)
    }

    /// Get a configuration value by key from the highest-priority provider that has it.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.get_raw(key)? {
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                ConfigError::ParseError(format!("failed to deserialize '{key}': {e}"))
            }),
            None => Ok(None),
        }
    }

    /// Get a configuration value by key with a default fallback value.
    pub fn get_or_default<T: DeserializeOwned>(
        &self,
        key: &str,
        default: T,
    ) -> Result<T, ConfigError> {
        match self.get(key)? {
            Some(value) => Ok(value),
            None => Ok(default),
        }
    }

    /// Get a value as configured text, without interpreting JSON.
    pub fn get_string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        for provider in self.providers.iter().rev() {
            if provider.has(key) {
                return provider.get_raw_string(key);
            }
        }
        Ok(None)
    }

    /// Get a configured string, treating an empty string as unset.
    pub fn get_non_empty(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.get_string(key)?.filter(|value| !value.is_empty()))
    }
}
