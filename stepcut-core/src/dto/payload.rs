//! Best-effort response payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of an acknowledgement response
///
/// Parsed as JSON when possible, otherwise kept as the raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            return Payload::Json(Value::Null);
        }

        match serde_json::from_str(&text) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(text),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_body() {
        let payload = Payload::from_text(r#"{"ok":true}"#);
        assert_eq!(payload.as_json(), Some(&json!({ "ok": true })));
    }

    #[test]
    fn test_degrades_to_text() {
        let payload = Payload::from_text("<html>bad gateway</html>");
        assert_eq!(payload, Payload::Text("<html>bad gateway</html>".to_string()));
        assert!(payload.as_json().is_none());
    }

    #[test]
    fn test_empty_body_is_null() {
        assert_eq!(Payload::from_text("  "), Payload::Json(Value::Null));
    }

    #[test]
    fn test_untagged_serialization() {
        let json = Payload::from_text(r#"{"status":"UPLOADED"}"#);
        assert_eq!(serde_json::to_value(&json).unwrap(), json!({ "status": "UPLOADED" }));

        let text = Payload::from_text("accepted");
        assert_eq!(serde_json::to_value(&text).unwrap(), json!("accepted"));
    }
}
