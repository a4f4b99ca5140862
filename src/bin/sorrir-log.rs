// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Emit a single compact record through an environment-configured logger.
//!
//!  Build it with `cargo build --release --bin sorrir-log`
//!  Usage: `sorrir-log <level> <USER|SYSTEM> <message> [json-data]`
//!  The sink is chosen from NODE_ENV and the SORRIR_ES_* variables.

use serde_json::Value;
use sorrir_logging::{LogLevel, Stakeholder, diag, get_logger, info_fmt};
use std::env;
use std::error::Error;
use std::process::ExitCode;

const USAGE: &str = "usage: sorrir-log <debug|info|warn|error> <USER|SYSTEM> <message> [json-data]";

struct Invocation {
    level: LogLevel,
    stakeholder: Stakeholder,
    message: String,
    data: Value,
}

fn parse_args(args: &[String]) -> Result<Invocation, Box<dyn Error>> {
    let [level, stakeholder, message, rest @ ..] = args else {
        return Err(USAGE.into());
    };
    if rest.len() > 1 {
        return Err(USAGE.into());
    }

    let data = match rest.first() {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| format!("json-data is not valid JSON: {e}"))?,
        None => Value::Null,
    };

    Ok(Invocation {
        level: level.parse()?,
        stakeholder: stakeholder.parse()?,
        message: message.clone(),
        data,
    })
}

fn main() -> ExitCode {
    diag::init(None);

    let args: Vec<String> = env::args().skip(1).collect();
    if matches!(args.first().map(String::as_str), Some("-h" | "--help")) {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let logger = get_logger();
    info_fmt!("sorrir-log", "Writing to the {} sink", logger.sink_name());
    logger.log_compact(
        invocation.level,
        invocation.stakeholder,
        invocation.message,
        invocation.data,
    );

    // Dropping the logger flushes the console drain and waits for the shipper.
    drop(logger);
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_full_invocation() {
        let invocation = parse_args(&args(&["warn", "system", "disk low", r#"{"free": 3}"#])).unwrap();

        assert_eq!(invocation.level, LogLevel::Warn);
        assert_eq!(invocation.stakeholder, Stakeholder::System);
        assert_eq!(invocation.message, "disk low");
        assert_eq!(invocation.data, json!({"free": 3}));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_args(&args(&["info", "USER"])).is_err());
        assert!(parse_args(&args(&["loud", "USER", "m"])).is_err());
        assert!(parse_args(&args(&["info", "ADMIN", "m"])).is_err());
        assert!(parse_args(&args(&["info", "USER", "m", "{not json"])).is_err());
        assert!(parse_args(&args(&["info", "USER", "m", "{}", "extra"])).is_err());
    }
}
