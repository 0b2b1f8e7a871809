use thiserror::Error;

/// Outcome taxonomy of a schema load.
///
/// Cancellation is not a failure: it is suppressed silently by consumers
/// (no message, no state transition) when a load is superseded or its view
/// went away. `Query` carries the one composed, user-facing message; loads
/// are never retried automatically.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("schema load cancelled")]
    Cancelled,

    #[error("{0}")]
    Query(String),
}

impl LoadError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled)
    }
}

/// Composes the single user-facing failure message: base text, an
/// ` (HTTP <status>)` suffix when a status is known, and a detail line
/// extracted from the response body.
pub(crate) fn compose_query_error(
    base: &str,
    status: Option<u16>,
    body: Option<&serde_json::Value>,
) -> String {
    let mut message = base.to_string();

    if let Some(status) = status {
        message.push_str(&format!(" (HTTP {status})"));
    }

    if let Some(detail) = body.and_then(body_detail) {
        message.push('\n');
        message.push_str(&detail);
    }

    message
}

/// A body with a `message` field contributes that field; any other
/// non-null body is pretty-printed as-is.
fn body_detail(body: &serde_json::Value) -> Option<String> {
    if body.is_null() {
        return None;
    }

    if let Some(message) = body.get("message").and_then(|v| v.as_str()) {
        return Some(message.to_string());
    }

    serde_json::to_string_pretty(body).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_field_wins_over_pretty_print() {
        let body = serde_json::json!({"message": "Table system.unknown does not exist"});
        let composed = compose_query_error("Failed to load database schema", Some(404), Some(&body));

        assert_eq!(
            composed,
            "Failed to load database schema (HTTP 404)\nTable system.unknown does not exist"
        );
    }

    #[test]
    fn test_non_object_body_is_pretty_printed() {
        let body = serde_json::json!(["unexpected"]);
        let composed = compose_query_error("Failed to load database schema", Some(500), Some(&body));

        assert!(composed.starts_with("Failed to load database schema (HTTP 500)\n"));
        assert!(composed.contains("unexpected"));
    }

    #[test]
    fn test_no_status_no_body() {
        assert_eq!(
            compose_query_error("Failed to load database schema", None, None),
            "Failed to load database schema"
        );
    }

    #[test]
    fn test_null_body_contributes_nothing() {
        let composed = compose_query_error(
            "Failed to load database schema",
            Some(502),
            Some(&serde_json::Value::Null),
        );
        assert_eq!(composed, "Failed to load database schema (HTTP 502)");
    }

    #[test]
    fn test_is_cancelled() {
        assert!(LoadError::Cancelled.is_cancelled());
        assert!(!LoadError::Query("boom".into()).is_cancelled());
    }
}
