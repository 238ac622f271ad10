use axum::http::StatusCode;
use serde_json::Value;

/// Assert status code matches expected
pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(
        actual, expected,
        "{context}: expected status {expected}, got {actual}"
    );
}

/// Assert the body carries a well-formed correlation id and return it
pub fn assert_request_id(body: &Value) -> String {
    let id = body
        .get("requestId")
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| panic!("expected requestId in {body}"));
    let parsed = uuid::Uuid::parse_str(id).expect("requestId is a UUID");
    assert_eq!(parsed.get_version_num(), 4, "requestId is a v4 UUID");
    id.to_string()
}

/// Assert the body carries an ISO-8601 timestamp
pub fn assert_timestamp(body: &Value) {
    let ts = body
        .get("timestamp")
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| panic!("expected timestamp in {body}"));
    assert!(
        chrono::DateTime::parse_from_rfc3339(ts).is_ok(),
        "timestamp {ts} is not ISO-8601"
    );
}

/// Remove fields that legitimately differ between two calls
pub fn without_volatile_fields(mut body: Value) -> Value {
    if let Some(object) = body.as_object_mut() {
        for key in ["timestamp", "uptime", "requestId"] {
            object.remove(key);
        }
        if let Some(memory) = object.get_mut("memory_usage").and_then(|m| m.as_object_mut()) {
            for value in memory.values_mut() {
                *value = Value::Null;
            }
        }
    }
    body
}
