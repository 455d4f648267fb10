//! Job-related API endpoints

use crate::ServiceClient;
use crate::error::{ClientError, Result};
use reqwest::Url;
use reqwest::multipart::{Form, Part};
use std::path::Path;
use stepcut_core::domain::job::Job;
use stepcut_core::dto::job::{CreateJob, CreatedJob, DispatchRequest};
use stepcut_core::dto::payload::Payload;
use tracing::debug;

/// Multipart field the service reads the geometry from
const STEP_FIELD: &str = "step";

/// File extensions accepted as STEP geometry
const STEP_EXTENSIONS: [&str; 2] = ["step", "stp"];

impl ServiceClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Create a new job
    ///
    /// # Arguments
    /// * `req` - Material, thickness (`0` for automatic) and quantity
    ///
    /// # Returns
    /// The id and initial status assigned by the service
    ///
    /// # Example
    /// ```no_run
    /// # use stepcut_client::ServiceClient;
    /// # use stepcut_core::domain::material::Material;
    /// # use stepcut_core::dto::job::CreateJob;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = ServiceClient::new("http://localhost:8787");
    /// let created = client.create_job(&CreateJob {
    ///     material: Material::Stainless,
    ///     thickness_mm: 1.2,
    ///     qty: 10,
    /// }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_job(&self, req: &CreateJob) -> Result<CreatedJob> {
        req.validate().map_err(ClientError::InvalidRequest)?;

        let url = self.endpoint(&["v1", "jobs"])?;
        debug!("Creating job: {:?}", req);
        let response = self.client.post(url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Get the current snapshot of a job
    ///
    /// # Arguments
    /// * `job_id` - The job id
    pub async fn get_job(&self, job_id: &str) -> Result<Job> {
        let url = self.job_url(job_id, &[])?;
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Upload STEP geometry from a file on disk
    ///
    /// Only `.step` and `.stp` files are accepted.
    ///
    /// # Arguments
    /// * `job_id` - The job to attach the geometry to
    /// * `path` - Path of the STEP file
    pub async fn upload_step(&self, job_id: &str, path: impl AsRef<Path>) -> Result<Payload> {
        let path = path.as_ref();

        let is_step = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                STEP_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });
        if !is_step {
            return Err(ClientError::InvalidRequest(format!(
                "{} is not a STEP file (expected .step or .stp)",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model.step".to_string());
        let data = tokio::fs::read(path).await?;

        self.upload_step_bytes(job_id, file_name, data).await
    }

    /// Upload STEP geometry held in memory
    ///
    /// # Arguments
    /// * `job_id` - The job to attach the geometry to
    /// * `file_name` - Name reported to the service
    /// * `data` - File contents
    pub async fn upload_step_bytes(
        &self,
        job_id: &str,
        file_name: impl Into<String>,
        data: Vec<u8>,
    ) -> Result<Payload> {
        if data.is_empty() {
            return Err(ClientError::InvalidRequest(
                "STEP file is empty".to_string(),
            ));
        }

        let url = self.job_url(job_id, &["upload"])?;
        let file_name = file_name.into();
        debug!("Uploading {} ({} bytes) to job {}", file_name, data.len(), job_id);

        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = Form::new().part(STEP_FIELD, part);

        let response = self.client.post(url).multipart(form).send().await?;

        self.handle_payload(response).await
    }

    /// Ask the service to price a job
    pub async fn request_quote(&self, job_id: &str) -> Result<Payload> {
        let url = self.job_url(job_id, &["quote"])?;
        let response = self.client.post(url).send().await?;

        self.handle_payload(response).await
    }

    /// Start the STEP to DXF conversion
    ///
    /// The service only acknowledges the request; follow progress with
    /// [`get_job`](Self::get_job) or a [`JobPoller`](crate::JobPoller).
    pub async fn start_job(&self, job_id: &str) -> Result<Payload> {
        let url = self.job_url(job_id, &["start"])?;
        let response = self.client.post(url).send().await?;

        self.handle_payload(response).await
    }

    /// Hand a job over to a vendor
    ///
    /// # Arguments
    /// * `job_id` - The job to dispatch
    /// * `vendor_id` - Target vendor, see [`seed_vendor`](Self::seed_vendor)
    pub async fn dispatch(&self, job_id: &str, vendor_id: &str) -> Result<Payload> {
        if vendor_id.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "vendor id cannot be empty".to_string(),
            ));
        }

        let url = self.job_url(job_id, &["dispatch"])?;
        let response = self
            .client
            .post(url)
            .json(&DispatchRequest {
                vendor_id: vendor_id.to_string(),
            })
            .send()
            .await?;

        self.handle_payload(response).await
    }

    // =============================================================================
    // Job Documents
    // =============================================================================

    /// Link to the SVG preview, suitable for opening in a browser
    pub fn preview_svg_url(&self, job_id: &str) -> Result<Url> {
        self.job_url(job_id, &["preview.svg"])
    }

    /// Link to the DXF result, suitable for opening in a browser
    pub fn download_dxf_url(&self, job_id: &str) -> Result<Url> {
        self.job_url(job_id, &["download", "dxf"])
    }

    /// Fetch the SVG preview document
    pub async fn preview_svg(&self, job_id: &str) -> Result<Vec<u8>> {
        let url = self.preview_svg_url(job_id)?;
        let response = self.client.get(url).send().await?;

        self.handle_bytes(response).await
    }

    /// Fetch the converted DXF document
    pub async fn download_dxf(&self, job_id: &str) -> Result<Vec<u8>> {
        let url = self.download_dxf_url(job_id)?;
        let response = self.client.get(url).send().await?;

        self.handle_bytes(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepcut_core::domain::material::Material;

    fn client() -> ServiceClient {
        ServiceClient::new("http://localhost:8787")
    }

    #[test]
    fn test_document_urls() {
        let client = client();
        assert_eq!(
            client.preview_svg_url("job_1").unwrap().as_str(),
            "http://localhost:8787/v1/jobs/job_1/preview.svg"
        );
        assert_eq!(
            client.download_dxf_url("job_1").unwrap().as_str(),
            "http://localhost:8787/v1/jobs/job_1/download/dxf"
        );
    }

    #[tokio::test]
    async fn test_create_job_validates_before_sending() {
        let req = CreateJob {
            material: Material::Steel,
            thickness_mm: 1.0,
            qty: 0,
        };
        let err = client().create_job(&req).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_upload_rejects_non_step_files() {
        let err = client().upload_step("job_1", "drawing.dxf").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));

        let err = client().upload_step("job_1", "no_extension").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_upload_missing_file_is_io_error() {
        let err = client()
            .upload_step("job_1", "/nonexistent/dir/part.STP")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_data() {
        let err = client()
            .upload_step_bytes("job_1", "part.step", Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_dispatch_requires_vendor() {
        let err = client().dispatch("job_1", "").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_empty_job_id_is_rejected() {
        let err = client().get_job("").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }
}
