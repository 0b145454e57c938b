//! Wire shapes for the host bridge.
//!
//! Outbound: `{"id": 7, "call": "get_code", "args": {"script_id": 3}}`
//! Inbound reply: `{"id": 7, "ok": true, "result": "..."}`
//! Inbound event: `{"event": "stdout_data", "payload": {...LogRecord}}`

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::LogRecord;

/// Event name carrying one host log line.
pub const STDOUT_EVENT: &str = "stdout_data";

/// Timestamp applied to log records the host sent without one.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

#[derive(Debug, Serialize)]
pub struct Request<'a> {
    pub id: u64,
    pub call: &'a str,
    pub args: Value,
}

#[derive(Debug, Deserialize)]
pub struct Reply {
    pub id: u64,
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Event {
    pub event: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Inbound {
    Reply(Reply),
    Event(Event),
}

/// `None` for blank lines and anything that is neither a reply nor an event.
pub fn parse_line(line: &str) -> Option<Inbound> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    serde_json::from_str(line).ok()
}

/// Decodes a `stdout_data` payload, stamping it if the host left the time empty.
pub fn log_record(payload: Value) -> Result<LogRecord, serde_json::Error> {
    let mut record: LogRecord = serde_json::from_value(payload)?;
    if record.time_stamp.is_empty() {
        record.time_stamp = chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string();
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_reply_and_event() {
        match parse_line(r#"{"id": 4, "ok": false, "error": "no such script"}"#) {
            Some(Inbound::Reply(reply)) => {
                assert_eq!(reply.id, 4);
                assert!(!reply.ok);
                assert_eq!(reply.error.as_deref(), Some("no such script"));
                assert!(reply.result.is_null());
            }
            other => panic!("expected reply, got {other:?}"),
        }

        match parse_line(r#"{"event": "stdout_data", "payload": {"message": "hi"}}"#) {
            Some(Inbound::Event(event)) => assert_eq!(event.event, STDOUT_EVENT),
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_lines() {
        assert!(parse_line("").is_none());
        assert!(parse_line("not json").is_none());
        assert!(parse_line(r#"{"something": "else"}"#).is_none());
        assert!(parse_line("[1, 2]").is_none());
    }

    #[test]
    fn test_log_record_stamping() {
        let stamped = log_record(json!({"level": "INFO", "target": "bot", "message": "x"})).unwrap();
        assert_eq!(stamped.time_stamp.len(), "2024-01-01T00:00:00.000Z".len());
        assert!(stamped.time_stamp.ends_with('Z'));

        let kept = log_record(json!({"time_stamp": "t0", "message": "x"})).unwrap();
        assert_eq!(kept.time_stamp, "t0");

        assert!(log_record(json!({"level": "INFO"})).is_err());
        assert!(log_record(json!("just a string")).is_err());
    }

    #[test]
    fn test_request_shape() {
        let request = Request {
            id: 9,
            call: "delete_script",
            args: json!({"id": 3}),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({"id": 9, "call": "delete_script", "args": {"id": 3}}));
    }
}
