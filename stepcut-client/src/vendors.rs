//! Vendor-related API endpoints

use crate::ServiceClient;
use crate::error::{ClientError, Result};
use stepcut_core::dto::payload::Payload;
use stepcut_core::dto::vendor::SeededVendor;
use tracing::debug;

impl ServiceClient {
    /// Create a throwaway vendor for testing dispatch
    ///
    /// # Returns
    /// The id of the seeded vendor along with the raw response
    pub async fn seed_vendor(&self) -> Result<SeededVendor> {
        let url = self.endpoint(&["v1", "vendors", "seed"])?;
        let response = self.client.post(url).send().await?;

        let payload = self.handle_payload(response).await?;
        debug!("Seed vendor response: {:?}", payload);

        seeded_vendor(payload)
    }
}

fn seeded_vendor(payload: Payload) -> Result<SeededVendor> {
    let body = match &payload {
        Payload::Json(body) => body.to_string(),
        Payload::Text(text) => text.clone(),
    };

    SeededVendor::from_payload(payload).ok_or_else(|| {
        ClientError::ParseError(format!("vendor id not found in response: {}", body))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seeded_vendor() {
        let seeded = seeded_vendor(Payload::Json(json!({ "vendor_id": "v_1" }))).unwrap();
        assert_eq!(seeded.vendor_id, "v_1");
        assert_eq!(seeded.response.as_json().unwrap()["vendor_id"], "v_1");
    }

    #[test]
    fn test_missing_vendor_id_is_parse_error() {
        let err = seeded_vendor(Payload::Text("seeded".to_string())).unwrap_err();
        match err {
            ClientError::ParseError(message) => assert!(message.ends_with("seeded")),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }
}
