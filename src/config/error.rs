// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the configuration module.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while reading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A value could not be parsed or deserialized.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A value was present but not usable.
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// An error related to a specific configuration provider.
    #[error("provider error: {provider}: {message}")]
    ProviderError { provider: String, message: String },
}

impl ConfigError {
    pub fn provider_error<P: fmt::Display, M: fmt::Display>(provider: P, message: M) -> Self {
        Self::ProviderError {
            provider: provider.to_string(),
            message: message.to_string(),
        }
    }

    pub fn invalid_value<K: fmt::Display, M: fmt::Display>(key: K, message: M) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let error = ConfigError::ParseError("invalid JSON".to_string());
        assert_eq!(
            error.to_string(),
            "failed to parse configuration: invalid JSON"
        );
    }

    #[test]
    fn test_invalid_value_constructor() {
        let error = ConfigError::invalid_value("es.url", "relative URL without a base");

        match &error {
            ConfigError::InvalidValue { key, message } => {
                assert_eq!(key, "es.url");
                assert_eq!(message, "relative URL without a base");
            }
            _ => panic!("Expected InvalidValue variant"),
        }

        assert_eq!(
            error.to_string(),
            "invalid value for 'es.url': relative URL without a base"
        );
    }

    #[test]
    fn test_provider_error_constructor() {
        let error = ConfigError::provider_error("env", "variable not readable");
        assert_eq!(error.to_string(), "provider error: env: variable not readable");
    }

    #[test]
    fn test_is_error_trait() {
        let error = ConfigError::ParseError("x".to_string());
        let _: &dyn std::error::Error = &error;
    }
}
