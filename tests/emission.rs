// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end emission through explicit loggers and the default instance.

mod common;

use common::{CaptureSink, TestConfigProvider};
use serde_json::{Value, json};
use serial_test::serial;
use sorrir_logging::{
    ApplicationContext, Area, Config, ContextFields, FormattedRecord, LogLevel, SorrirLogger,
    Stakeholder,
};
use std::sync::{Arc, Mutex};

fn capture_logger(host: &str) -> (SorrirLogger, CaptureSink) {
    let sink = CaptureSink::new();
    let logger = SorrirLogger::builder()
        .sink(sink.clone())
        .host(host)
        .build()
        .unwrap();
    (logger, sink)
}

#[test]
fn test_user_entry_envelope() {
    let (logger, sink) = capture_logger("edge-01");

    logger.log(
        LogLevel::Info,
        "ping",
        json!({"k": 1}),
        ApplicationContext::new("pod1", "DSB", "Manual"),
    );

    let records = sink.json();
    assert_eq!(records.len(), 1);
    let record = &records[0];

    assert_eq!(record["level"], "info");
    assert_eq!(record["message"], "ping");
    assert!(record["timestamp"].as_str().unwrap().ends_with('Z'));
    assert_eq!(
        record["metadata"],
        json!({
            "context": {
                "stakeholder": "USER",
                "contextFields": {"unit": "pod1", "component": "DSB", "degradationMode": "Manual"}
            },
            "host": "edge-01",
            "data": {"k": 1}
        })
    );
}

#[test]
fn test_system_entry_envelope_names_this_file() {
    let (logger, sink) = capture_logger("edge-01");

    logger.log(LogLevel::Error, "watchdog fired", json!(null), Area::Resilience);

    let record = &sink.json()[0];
    let fields = &record["metadata"]["context"]["contextFields"];
    assert_eq!(record["metadata"]["context"]["stakeholder"], "SYSTEM");
    assert_eq!(fields["area"], "resilience");
    assert_eq!(fields["file"], "emission.rs");
    assert!(
        fields["function"]
            .as_str()
            .unwrap()
            .ends_with("test_system_entry_envelope_names_this_file")
    );
}

#[test]
fn test_compact_from_unconfigured_file() {
    let (logger, sink) = capture_logger("edge-01");

    logger.log_compact(LogLevel::Debug, Stakeholder::User, "hello", json!([1, 2]));

    let record = &sink.json()[0];
    assert_eq!(
        record["metadata"]["context"]["contextFields"],
        json!({"unit": "unknown", "component": "unknown", "degradationMode": "unknown"})
    );
    assert_eq!(record["metadata"]["data"], json!([1, 2]));
}

#[test]
fn test_log_default_has_no_envelope() {
    let (logger, sink) = capture_logger("edge-01");

    logger.log_default(LogLevel::Info, "plain");

    let record = sink.json().remove(0);
    let object = record.as_object().unwrap();
    assert_eq!(object.len(), 3);
    assert!(!object.contains_key("metadata"));
}

#[test]
fn test_invalid_remote_configuration_falls_back_to_console() {
    let config = Config::builder()
        .with_provider(
            TestConfigProvider::new()
                .with("es.url", "::not-a-url::")
                .with("es.user", "elastic")
                .with("es.password", "secret"),
        )
        .build();

    let logger = SorrirLogger::from_config(&config);
    assert_eq!(logger.sink_name(), "console");
}

#[test]
fn test_production_configuration_uses_console() {
    let config = Config::builder()
        .with_provider(
            TestConfigProvider::new()
                .with("env", "production")
                .with("es.url", "http://localhost:9200")
                .with("es.user", "elastic")
                .with("es.password", "secret"),
        )
        .build();

    assert_eq!(SorrirLogger::from_config(&config).sink_name(), "console");
}

fn collect_default(marker: &'static str) -> (Arc<Mutex<Vec<Value>>>, sorrir_logging::ListenerId) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let id = sorrir_logging::sorrir_logger().subscribe(move |record: &FormattedRecord| {
        if record.message.starts_with(marker) {
            sink.lock().unwrap().push(serde_json::to_value(record).unwrap());
        }
    });
    (seen, id)
}

#[test]
#[serial]
fn test_default_instance_compact_after_config_logger() {
    let (seen, id) = collect_default("global-compact");

    sorrir_logging::config_logger(ApplicationContext::new("pod9", "Gateway", "Full"));
    sorrir_logging::log_compact(LogLevel::Warn, Stakeholder::User, "global-compact", json!({"n": 1}));
    sorrir_logging::info(Stakeholder::User, "global-compact per level", json!(null), None);

    assert!(sorrir_logging::sorrir_logger().unsubscribe(id));
    sorrir_logging::sorrir_logger().registry().clear();

    let records = seen.lock().unwrap();
    assert_eq!(records.len(), 2);
    for record in records.iter() {
        assert_eq!(record["metadata"]["context"]["contextFields"]["unit"], "pod9");
    }
    assert_eq!(records[0]["level"], "warn");
    assert_eq!(records[1]["level"], "info");
}

#[test]
#[serial]
fn test_default_instance_free_functions() {
    let (seen, id) = collect_default("global-free");

    sorrir_logging::log_default(LogLevel::Debug, "global-free default");
    sorrir_logging::debug(
        Stakeholder::User,
        "global-free system",
        json!(null),
        Some(ContextFields::from(Area::Operation)),
    );
    sorrir_logging::error(Stakeholder::System, "global-free compact", json!(null), None);
    sorrir_logging::warn(
        Stakeholder::User,
        "global-free user",
        json!(null),
        Some(ApplicationContext::default().into()),
    );

    sorrir_logging::sorrir_logger().unsubscribe(id);

    let records = seen.lock().unwrap();
    assert_eq!(records.len(), 4);
    assert!(records[0].get("metadata").is_none());
    assert_eq!(records[1]["metadata"]["context"]["stakeholder"], "SYSTEM");
    assert_eq!(
        records[1]["metadata"]["context"]["contextFields"]["file"],
        "emission.rs"
    );
    assert_eq!(records[2]["metadata"]["context"]["contextFields"]["area"], "unknown");
    assert_eq!(records[3]["metadata"]["context"]["stakeholder"], "USER");
}

#[test]
fn test_get_logger_has_its_own_registry() {
    let logger = sorrir_logging::get_logger();
    logger.configure(Area::Execution);

    assert_eq!(logger.registry().len(), 1);
    assert!(
        !sorrir_logging::sorrir_logger()
            .registry()
            .contains(file!(), Stakeholder::System)
    );
}
