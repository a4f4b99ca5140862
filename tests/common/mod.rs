// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Common test utilities and helpers for sorrir-logging tests.

use serde_json::Value;
use sorrir_logging::{ConfigError, ConfigProvider, FormattedRecord, Sink, SinkError};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Sink keeping every record in memory.
#[allow(dead_code)]
#[derive(Debug, Clone, Default)]
pub struct CaptureSink {
    records: Arc<Mutex<Vec<FormattedRecord>>>,
}

#[allow(dead_code)]
impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<FormattedRecord> {
        self.records.lock().unwrap().clone()
    }

    /// The formatted records as JSON, the way sinks see them.
    pub fn json(&self) -> Vec<Value> {
        self.records()
            .iter()
            .map(|record| serde_json::to_value(record).unwrap())
            .collect()
    }
}

impl Sink for CaptureSink {
    fn name(&self) -> &str {
        "capture"
    }

    fn write(&self, record: &FormattedRecord) -> Result<(), SinkError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Test configuration provider backed by a map of string values.
#[allow(dead_code)]
#[derive(Debug, Clone, Default)]
pub struct TestConfigProvider {
    values: HashMap<String, Value>,
}

#[allow(dead_code)]
impl TestConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }
}

impl ConfigProvider for TestConfigProvider {
    fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn provider_name(&self) -> &str {
        "test"
    }

    fn get_raw(&self, key: &str) -> Result<Option<Value>, ConfigError> {
        Ok(self.values.get(key).cloned())
    }
}

/// Poll `check` until it yields a value or `timeout` elapses.
#[allow(dead_code)]
pub async fn eventually<T, F, Fut>(timeout: Duration, mut check: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(value) = check().await {
            return Some(value);
        }
        if tokio::time::Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
