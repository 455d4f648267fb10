//! End-to-end run
//!
//! Drives a STEP file through the whole service flow: create a job, upload
//! the geometry, quote, convert, wait for the result and optionally dispatch
//! it to a vendor. Every call is recorded in an [`ActivityLog`].

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use serde::Serialize;
use std::path::PathBuf;
use stepcut_client::{PollOutcome, ServiceClient};
use stepcut_core::JobTracker;
use stepcut_core::domain::job::{Job, JobStatus};
use stepcut_core::domain::material::Material;
use stepcut_core::dto::job::CreateJob;
use tracing::warn;

use super::job::{Watched, print_job_details, report_outcome, watch_job};
use crate::activity::ActivityLog;
use crate::config::Config;

/// Arguments for `stepcut run`
#[derive(Args)]
pub struct RunArgs {
    /// Path to a .step or .stp file
    file: PathBuf,

    /// Sheet material (steel, stainless, aluminum, acrylic)
    #[arg(short, long, default_value = "steel")]
    material: Material,

    /// Thickness in mm, 0 to detect automatically
    #[arg(short, long, default_value_t = 0.0)]
    thickness: f64,

    /// Number of parts
    #[arg(short, long, default_value_t = 1)]
    qty: u32,

    /// Dispatch the finished job to a vendor
    #[arg(long)]
    dispatch: bool,

    /// Vendor to dispatch to; a test vendor is seeded when omitted
    #[arg(long, requires = "dispatch")]
    vendor: Option<String>,

    /// Print the final job and the activity log as JSON
    #[arg(long)]
    json: bool,
}

/// What a run has produced so far
#[derive(Default, Serialize)]
struct RunReport {
    #[serde(rename = "job")]
    tracker: JobTracker,
    log: ActivityLog,
}

impl RunReport {
    /// Record a snapshot unless it is older than the one already held
    fn observe(&mut self, job: Job) {
        let status = job.status;
        if !self.tracker.observe(job) {
            warn!(
                "Keeping {:?} over stale snapshot with status {}",
                self.tracker.status(),
                status
            );
        }
    }
}

/// Handle `stepcut run`
pub async fn handle_run(args: RunArgs, config: &Config) -> Result<()> {
    let client = config.client()?;
    let mut report = RunReport::default();

    let result = run_flow(&client, config, &args, &mut report).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !report.log.is_empty() {
        println!(
            "{}",
            format!("{} call(s) recorded", report.log.len()).dimmed()
        );
    }

    let (id, watched) = result?;
    report_outcome(&id, &watched)
}

async fn run_flow(
    client: &ServiceClient,
    config: &Config,
    args: &RunArgs,
    report: &mut RunReport,
) -> Result<(String, Watched)> {
    let req = CreateJob {
        material: args.material,
        thickness_mm: args.thickness,
        qty: args.qty,
    };

    let created = client
        .create_job(&req)
        .await
        .context("Failed to create job")?;
    report.log.push("createJob", &created);
    println!("{} Created job {}", "1.".bold(), created.id.cyan());
    report.tracker = JobTracker::with_snapshot(Job::new(created.id.clone(), created.status));
    let id = created.id;

    let payload = client
        .upload_step(&id, &args.file)
        .await
        .with_context(|| format!("Failed to upload {}", args.file.display()))?;
    report.log.push("uploadStep", &payload);
    println!("{} Uploaded {}", "2.".bold(), args.file.display());

    let payload = client
        .request_quote(&id)
        .await
        .context("Failed to request quote")?;
    report.log.push("quote", &payload);
    let quoted = refresh(client, &id, report).await?;
    println!("{} Quoted", "3.".bold());
    print_job_details(&quoted);

    let payload = client
        .start_job(&id)
        .await
        .context("Failed to start conversion")?;
    report.log.push("start", &payload);
    println!("{} Conversion started", "4.".bold());

    let known = report.tracker.current().cloned();
    let watched = watch_job(client, config, &id, known).await?;
    if let Some(job) = &watched.last {
        report.observe(job.clone());
    }

    if args.dispatch && watched.outcome == PollOutcome::Terminal(JobStatus::Done) {
        let vendor_id = match &args.vendor {
            Some(vendor_id) => vendor_id.clone(),
            None => {
                let seeded = client
                    .seed_vendor()
                    .await
                    .context("Failed to seed vendor")?;
                report.log.push("seedVendor", &seeded.response);
                seeded.vendor_id
            }
        };

        let payload = client
            .dispatch(&id, &vendor_id)
            .await
            .context("Failed to dispatch job")?;
        report.log.push("dispatch", &payload);
        println!("{} Dispatched to vendor {}", "5.".bold(), vendor_id.cyan());
        refresh(client, &id, report).await?;
    }

    Ok((id, watched))
}

/// Fetch the job and return the newest snapshot known to the report
async fn refresh(client: &ServiceClient, id: &str, report: &mut RunReport) -> Result<Job> {
    let job = client.get_job(id).await.context("Failed to refresh job")?;
    report.log.push("getJob", &job);
    report.observe(job);

    report
        .tracker
        .current()
        .cloned()
        .context("No snapshot of the job is known")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_shape() {
        let mut report = RunReport::default();
        assert_eq!(serde_json::to_value(&report).unwrap()["job"], json!(null));

        report.log.push("createJob", &json!({ "id": "j1", "status": "CREATED" }));
        report.observe(Job::new("j1", JobStatus::Created));

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["job"]["status"], json!("CREATED"));
        assert_eq!(value["log"][0]["title"], json!("createJob"));
    }

    #[test]
    fn test_report_never_moves_backwards() {
        let mut report = RunReport::default();
        report.observe(Job::new("j1", JobStatus::Quoted));
        report.observe(Job::new("j1", JobStatus::Uploaded));
        assert_eq!(report.tracker.status(), Some(JobStatus::Quoted));

        report.observe(Job::new("j1", JobStatus::Done));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["job"]["status"], json!("DONE"));
    }
}
