//! Vendor DTOs

use serde::Serialize;
use serde_json::Value;

use super::payload::Payload;

/// A test vendor created by the service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeededVendor {
    pub vendor_id: String,
    /// Body the service answered with, as received
    pub response: Payload,
}

impl SeededVendor {
    /// Reads the vendor id out of a seed response
    ///
    /// Returns `None` when the body is not JSON or carries no usable id.
    pub fn from_payload(response: Payload) -> Option<Self> {
        let vendor_id = extract_vendor_id(response.as_json()?)?;
        Some(Self {
            vendor_id,
            response,
        })
    }
}

/// Extracts the vendor id from a seed-vendor response
///
/// Deployments disagree on the shape, so `vendor_id`, `id` and `vendor.id`
/// are tried in that order. Numeric ids are rendered as strings.
pub fn extract_vendor_id(body: &Value) -> Option<String> {
    [
        body.get("vendor_id"),
        body.get("id"),
        body.get("vendor").and_then(|v| v.get("id")),
    ]
    .into_iter()
    .flatten()
    .find_map(id_to_string)
}

fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vendor_id_shapes() {
        assert_eq!(
            extract_vendor_id(&json!({ "vendor_id": "v_1" })),
            Some("v_1".to_string())
        );
        assert_eq!(extract_vendor_id(&json!({ "id": 42 })), Some("42".to_string()));
        assert_eq!(
            extract_vendor_id(&json!({ "vendor": { "id": "v_9", "name": "Seed" } })),
            Some("v_9".to_string())
        );
    }

    #[test]
    fn test_vendor_id_precedence() {
        let body = json!({ "vendor_id": "first", "id": "second" });
        assert_eq!(extract_vendor_id(&body), Some("first".to_string()));

        let body = json!({ "vendor_id": null, "id": "second" });
        assert_eq!(extract_vendor_id(&body), Some("second".to_string()));
    }

    #[test]
    fn test_seeded_vendor_keeps_response() {
        let response = Payload::Json(json!({ "vendor": { "id": 7, "name": "Seed" } }));
        let seeded = SeededVendor::from_payload(response.clone()).unwrap();
        assert_eq!(seeded.vendor_id, "7");
        assert_eq!(seeded.response, response);

        assert!(SeededVendor::from_payload(Payload::Text("created".to_string())).is_none());
        assert!(SeededVendor::from_payload(Payload::Json(json!({ "ok": true }))).is_none());
    }

    #[test]
    fn test_vendor_id_missing() {
        assert_eq!(extract_vendor_id(&json!({ "ok": true })), None);
        assert_eq!(extract_vendor_id(&json!({ "vendor_id": "" })), None);
        assert_eq!(extract_vendor_id(&json!("v_1")), None);
    }
}
