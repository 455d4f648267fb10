//! Job domain types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Snapshot of a conversion job as reported by the service
///
/// The service owns the job; the client only caches the latest snapshot it
/// fetched. Fields the client does not model are kept in `extra` so the
/// snapshot can be re-serialized without losing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
    /// Quote as reported by older deployments of the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<Quote>,
    /// Failure description, only present when `status` is `FAILED`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Job {
    /// Creates a bare snapshot with only an id and a status
    pub fn new(id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            status,
            material: None,
            thickness_mm: None,
            qty: None,
            quote: None,
            estimate: None,
            error: None,
            extra: Map::new(),
        }
    }

    /// The quote to show for this job
    ///
    /// Each amount is taken from `quote` and falls back to `estimate` on its
    /// own. `None` when neither carries any amount.
    pub fn effective_quote(&self) -> Option<Quote> {
        let pick = |field: fn(&Quote) -> Option<f64>| {
            self.quote
                .as_ref()
                .and_then(field)
                .or_else(|| self.estimate.as_ref().and_then(field))
        };

        let merged = Quote {
            unit_price: pick(|q| q.unit_price),
            total_price: pick(|q| q.total_price),
        };

        (merged.unit_price.is_some() || merged.total_price.is_some()).then_some(merged)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Job lifecycle status
///
/// Transitions are driven by the service and only move forward:
/// `CREATED -> UPLOADED -> QUOTED -> PROCESSING -> DONE | FAILED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Created,
    Uploaded,
    Quoted,
    Processing,
    Done,
    Failed,
}

impl JobStatus {
    /// Position of this status in the forward-only lifecycle
    ///
    /// `DONE` and `FAILED` share the last rank.
    pub fn rank(self) -> u8 {
        match self {
            JobStatus::Created => 0,
            JobStatus::Uploaded => 1,
            JobStatus::Quoted => 2,
            JobStatus::Processing => 3,
            JobStatus::Done | JobStatus::Failed => 4,
        }
    }

    /// Whether no further transitions can happen
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Created => "CREATED",
            JobStatus::Uploaded => "UPLOADED",
            JobStatus::Quoted => "QUOTED",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Done => "DONE",
            JobStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price quote for a job
///
/// The service reports amounts either as `unit_price`/`total_price` or as
/// `unit_won`/`total_won`; both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default, alias = "unit_won", skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(default, alias = "total_won", skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_names() {
        let status: JobStatus = serde_json::from_value(json!("PROCESSING")).unwrap();
        assert_eq!(status, JobStatus::Processing);
        assert_eq!(serde_json::to_value(JobStatus::Done).unwrap(), json!("DONE"));
        assert!(serde_json::from_value::<JobStatus>(json!("processing")).is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(JobStatus::Done.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(!JobStatus::Created.is_terminal());
    }

    #[test]
    fn test_rank_is_forward_only() {
        let order = [
            JobStatus::Created,
            JobStatus::Uploaded,
            JobStatus::Quoted,
            JobStatus::Processing,
            JobStatus::Done,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
        }
        assert_eq!(JobStatus::Done.rank(), JobStatus::Failed.rank());
    }

    #[test]
    fn test_job_snapshot_parsing() {
        let job: Job = serde_json::from_value(json!({
            "id": "job_1",
            "status": "QUOTED",
            "material": "steel",
            "thickness_mm": 1.5,
            "qty": 3,
            "quote": { "unit_price": 4000, "total_price": 12000 },
            "files": { "step": "part.step" }
        }))
        .unwrap();

        assert_eq!(job.id, "job_1");
        assert_eq!(job.status, JobStatus::Quoted);
        assert_eq!(job.qty, Some(3));
        assert_eq!(job.effective_quote().unwrap().total_price, Some(12000.0));
        assert_eq!(job.extra["files"]["step"], json!("part.step"));
    }

    #[test]
    fn test_quote_won_aliases_and_estimate_fallback() {
        let job: Job = serde_json::from_value(json!({
            "id": "job_2",
            "status": "QUOTED",
            "estimate": { "unit_won": 1500, "total_won": 3000 }
        }))
        .unwrap();

        assert!(job.quote.is_none());
        let quote = job.effective_quote().unwrap();
        assert_eq!(quote.unit_price, Some(1500.0));
        assert_eq!(quote.total_price, Some(3000.0));
    }

    #[test]
    fn test_quote_falls_back_per_amount() {
        let job: Job = serde_json::from_value(json!({
            "id": "job_4",
            "status": "QUOTED",
            "quote": { "unit_won": 2000 },
            "estimate": { "unit_won": 1800, "total_won": 9000 }
        }))
        .unwrap();

        let quote = job.effective_quote().unwrap();
        assert_eq!(quote.unit_price, Some(2000.0));
        assert_eq!(quote.total_price, Some(9000.0));

        let mut empty = Job::new("job_5", JobStatus::Quoted);
        empty.quote = Some(Quote::default());
        assert!(empty.effective_quote().is_none());
    }

    #[test]
    fn test_failed_job_carries_error() {
        let job: Job = serde_json::from_value(json!({
            "id": "job_3",
            "status": "FAILED",
            "error": "no planar faces found"
        }))
        .unwrap();

        assert!(job.is_terminal());
        assert_eq!(job.error.as_deref(), Some("no planar faces found"));
    }
}
