//! Activity log
//!
//! Records every call made during a session together with the response the
//! service returned, so a whole run can be dumped as JSON afterwards.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// One recorded call
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub at: DateTime<Utc>,
    pub title: String,
    pub data: Value,
}

/// Ordered record of the calls made in one session
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ActivityLog {
    entries: Vec<ActivityEntry>,
}

impl ActivityLog {
    /// Appends an entry; data that fails to serialize is stored as its error
    pub fn push(&mut self, title: impl Into<String>, data: &impl Serialize) {
        let data = serde_json::to_value(data)
            .unwrap_or_else(|e| Value::String(format!("<unserializable: {}>", e)));

        self.entries.push(ActivityEntry {
            at: Utc::now(),
            title: title.into(),
            data,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entries_keep_order() {
        let mut log = ActivityLog::default();
        log.push("createJob", &json!({ "id": "j1", "status": "CREATED" }));
        log.push("quote", &json!({ "ok": true }));

        let titles: Vec<&str> = log.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["createJob", "quote"]);
        assert!(log.entries[0].at <= log.entries[1].at);
        assert_eq!(log.entries[0].data["id"], json!("j1"));
    }

    #[test]
    fn test_serializes_as_array() {
        let mut log = ActivityLog::default();
        log.push("seedVendor", &"v_1");

        let value = serde_json::to_value(&log).unwrap();
        assert_eq!(value[0]["title"], json!("seedVendor"));
        assert_eq!(value[0]["data"], json!("v_1"));
        assert_eq!(log.len(), 1);
        assert!(!log.is_empty());
    }
}
