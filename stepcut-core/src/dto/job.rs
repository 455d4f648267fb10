//! Job DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::JobStatus;
use crate::domain::material::Material;

/// Request to create a new job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateJob {
    pub material: Material,
    /// Sheet thickness in millimetres, `0` lets the service detect it
    pub thickness_mm: f64,
    pub qty: u32,
}

impl CreateJob {
    /// Checks the parameters before they are sent
    pub fn validate(&self) -> Result<(), String> {
        if !self.thickness_mm.is_finite() || self.thickness_mm < 0.0 {
            return Err(format!(
                "thickness_mm must be 0 (auto) or a positive number, got {}",
                self.thickness_mm
            ));
        }

        if self.qty == 0 {
            return Err("qty must be at least 1".to_string());
        }

        Ok(())
    }
}

impl Default for CreateJob {
    fn default() -> Self {
        Self {
            material: Material::default(),
            thickness_mm: 0.0,
            qty: 1,
        }
    }
}

/// Response to a job creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedJob {
    pub id: String,
    pub status: JobStatus,
}

/// Request to hand a job over to a vendor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub vendor_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_job_body() {
        let req = CreateJob {
            material: Material::Aluminum,
            thickness_mm: 2.0,
            qty: 5,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "material": "aluminum", "thickness_mm": 2.0, "qty": 5 })
        );
    }

    #[test]
    fn test_create_job_validation() {
        assert!(CreateJob::default().validate().is_ok());
        assert_eq!(CreateJob::default().thickness_mm, 0.0);

        let zero_qty = CreateJob {
            qty: 0,
            ..CreateJob::default()
        };
        assert!(zero_qty.validate().is_err());

        let negative = CreateJob {
            thickness_mm: -1.0,
            ..CreateJob::default()
        };
        assert!(negative.validate().is_err());

        let nan = CreateJob {
            thickness_mm: f64::NAN,
            ..CreateJob::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_created_job_parsing() {
        let created: CreatedJob =
            serde_json::from_value(json!({ "id": "abc", "status": "CREATED" })).unwrap();
        assert_eq!(created.id, "abc");
        assert_eq!(created.status, JobStatus::Created);
    }
}
