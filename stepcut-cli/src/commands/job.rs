//! Job command handlers
//!
//! Handles the one-shot job calls (create, upload, quote, start, dispatch),
//! document downloads, and following a job with the status poller.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stepcut_client::{JobPoller, Payload, PollOutcome, ServiceClient};
use stepcut_core::domain::job::{Job, JobStatus};
use stepcut_core::domain::material::Material;
use stepcut_core::dto::job::CreateJob;
use tokio::sync::watch;

use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Create a new job
    Create {
        /// Sheet material (steel, stainless, aluminum, acrylic)
        #[arg(short, long, default_value = "steel")]
        material: Material,

        /// Thickness in mm, 0 to detect automatically
        #[arg(short, long, default_value_t = 0.0)]
        thickness: f64,

        /// Number of parts
        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Upload a STEP file to a job
    Upload {
        /// Job ID
        id: String,

        /// Path to a .step or .stp file
        file: PathBuf,
    },
    /// Request a price quote
    Quote {
        /// Job ID
        id: String,
    },
    /// Start the DXF conversion
    Start {
        /// Job ID
        id: String,

        /// Keep polling until the job finishes
        #[arg(short, long)]
        watch: bool,
    },
    /// Get job details
    Get {
        /// Job ID
        id: String,

        /// Print the raw snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Poll a job until it is done or failed
    Watch {
        /// Job ID
        id: String,
    },
    /// Save the SVG preview
    Preview {
        /// Job ID
        id: String,

        /// Output file (defaults to <id>.svg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Save the converted DXF
    Download {
        /// Job ID
        id: String,

        /// Output file (defaults to <id>.dxf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the preview and download links
    Links {
        /// Job ID
        id: String,
    },
    /// Send a job to a vendor
    Dispatch {
        /// Job ID
        id: String,

        /// Vendor ID (see `stepcut vendor seed`)
        #[arg(short, long)]
        vendor: String,
    },
}

/// Handle job commands
///
/// # Arguments
/// * `command` - The job command to execute
/// * `config` - The CLI configuration
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = config.client()?;

    match command {
        JobCommands::Create {
            material,
            thickness,
            qty,
        } => {
            let req = CreateJob {
                material,
                thickness_mm: thickness,
                qty,
            };
            create_job(&client, &req).await.map(|_| ())
        }
        JobCommands::Upload { id, file } => upload(&client, &id, &file).await,
        JobCommands::Quote { id } => quote(&client, &id).await,
        JobCommands::Start { id, watch } => {
            start(&client, &id).await?;
            if watch {
                let watched = watch_job(&client, config, &id, None).await?;
                report_outcome(&id, &watched)?;
            }
            Ok(())
        }
        JobCommands::Get { id, json } => get_job(&client, &id, json).await,
        JobCommands::Watch { id } => {
            let watched = watch_job(&client, config, &id, None).await?;
            report_outcome(&id, &watched)
        }
        JobCommands::Preview { id, output } => {
            let bytes = client
                .preview_svg(&id)
                .await
                .context("Failed to fetch SVG preview")?;
            let path = output.unwrap_or_else(|| default_output(&id, "svg"));
            save_document(&path, &bytes).await
        }
        JobCommands::Download { id, output } => {
            let bytes = client
                .download_dxf(&id)
                .await
                .context("Failed to download DXF")?;
            let path = output.unwrap_or_else(|| default_output(&id, "dxf"));
            save_document(&path, &bytes).await
        }
        JobCommands::Links { id } => {
            println!("  Preview:  {}", client.preview_svg_url(&id)?.as_str().cyan());
            println!("  Download: {}", client.download_dxf_url(&id)?.as_str().cyan());
            Ok(())
        }
        JobCommands::Dispatch { id, vendor } => dispatch(&client, &id, &vendor).await,
    }
}

// =============================================================================
// One-shot calls
// =============================================================================

/// Create a job and show its first snapshot
pub(crate) async fn create_job(client: &ServiceClient, req: &CreateJob) -> Result<Job> {
    let created = client
        .create_job(req)
        .await
        .context("Failed to create job")?;

    println!(
        "{} Created job {} ({})",
        "✓".green(),
        created.id.cyan(),
        created.status
    );

    let job = client
        .get_job(&created.id)
        .await
        .context("Failed to fetch created job")?;
    print_job_details(&job);

    Ok(job)
}

async fn upload(client: &ServiceClient, id: &str, file: &Path) -> Result<()> {
    let payload = client
        .upload_step(id, file)
        .await
        .with_context(|| format!("Failed to upload {}", file.display()))?;

    println!("{} Uploaded {}", "✓".green(), file.display());
    print_payload(&payload);
    refresh(client, id).await
}

async fn quote(client: &ServiceClient, id: &str) -> Result<()> {
    let payload = client
        .request_quote(id)
        .await
        .context("Failed to request quote")?;

    println!("{} Quote requested", "✓".green());
    print_payload(&payload);
    refresh(client, id).await
}

async fn start(client: &ServiceClient, id: &str) -> Result<()> {
    let payload = client
        .start_job(id)
        .await
        .context("Failed to start conversion")?;

    println!("{} Conversion started for job {}", "✓".green(), id.cyan());
    print_payload(&payload);
    Ok(())
}

async fn dispatch(client: &ServiceClient, id: &str, vendor: &str) -> Result<()> {
    let payload = client
        .dispatch(id, vendor)
        .await
        .context("Failed to dispatch job")?;

    println!("{} Dispatched job {} to vendor {}", "✓".green(), id.cyan(), vendor);
    print_payload(&payload);
    refresh(client, id).await
}

async fn get_job(client: &ServiceClient, id: &str, json: bool) -> Result<()> {
    let job = client.get_job(id).await.context("Failed to fetch job")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&job)?);
    } else {
        print_job_details(&job);
    }

    Ok(())
}

/// Re-fetch a job after a transition and show where it landed
async fn refresh(client: &ServiceClient, id: &str) -> Result<()> {
    let job = client.get_job(id).await.context("Failed to refresh job")?;
    println!();
    print_job_details(&job);
    Ok(())
}

async fn save_document(path: &Path, bytes: &[u8]) -> Result<()> {
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "{} Saved {} ({} bytes)",
        "✓".green(),
        path.display(),
        bytes.len()
    );
    Ok(())
}

/// `<id>.<ext>` with anything unsafe for a file name replaced
fn default_output(id: &str, ext: &str) -> PathBuf {
    let stem: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    PathBuf::from(format!("{}.{}", stem, ext))
}

// =============================================================================
// Watching
// =============================================================================

/// Result of following a job with the poller
pub(crate) struct Watched {
    pub outcome: PollOutcome,
    pub last: Option<Job>,
}

/// Poll a job until it finishes, printing every snapshot
///
/// When `known` is given, snapshots older than it are never shown. Ctrl-C
/// stops the poller and returns [`PollOutcome::Stopped`].
pub(crate) async fn watch_job(
    client: &ServiceClient,
    config: &Config,
    id: &str,
    known: Option<Job>,
) -> Result<Watched> {
    let (tx, rx) = watch::channel::<Option<Job>>(None);

    let mut poller =
        JobPoller::new(Arc::new(client.clone())).with_failure_limit(config.max_poll_failures);

    println!(
        "{}",
        format!(
            "Watching job {} every {:?} (Ctrl-C to stop)",
            id, config.poll_interval
        )
        .dimmed()
    );

    let on_update = move |job: &Job| {
        print_status_line(job);
        tx.send_replace(Some(job.clone()));
    };

    match known {
        Some(job) => poller.start_from(job, on_update, config.poll_interval)?,
        None => poller.start(id, on_update, config.poll_interval)?,
    }

    let interrupt = poller.stopper().map(|stopper| {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() && stopper.is_active() {
                println!("{}", "Interrupted, stopping poller".yellow());
                stopper.stop();
            }
        })
    });

    let outcome = poller.wait().await;

    if let Some(interrupt) = interrupt {
        interrupt.abort();
    }

    let last = rx.borrow().clone();
    Ok(Watched {
        outcome: outcome.unwrap_or(PollOutcome::Stopped),
        last,
    })
}

/// Print how a watch ended; failed and abandoned jobs are errors
pub(crate) fn report_outcome(id: &str, watched: &Watched) -> Result<()> {
    match &watched.outcome {
        PollOutcome::Terminal(JobStatus::Done) => {
            println!("{} Job {} is done", "✓".green(), id.cyan());
            if let Some(job) = &watched.last {
                println!();
                print_job_details(job);
            }
            Ok(())
        }
        PollOutcome::Terminal(status) => {
            let reason = watched
                .last
                .as_ref()
                .and_then(|job| job.error.clone())
                .unwrap_or_else(|| "no error reported".to_string());
            println!("{} Job {} {}: {}", "✗".red(), id, status, reason.red());
            anyhow::bail!("job {} ended with status {}", id, status)
        }
        PollOutcome::Stopped => {
            println!("{}", format!("Stopped watching job {}", id).yellow());
            Ok(())
        }
        PollOutcome::GaveUp {
            failures,
            last_error,
        } => {
            anyhow::bail!(
                "gave up on job {} after {} failed polls: {}",
                id,
                failures,
                last_error
            )
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// Print a one-line status update
fn print_status_line(job: &Job) {
    let total = job
        .effective_quote()
        .and_then(|quote| quote.total_price)
        .map(|total| format!("  total {}", format_won(total)))
        .unwrap_or_default();

    println!(
        "{} {}{}",
        chrono::Local::now().format("%H:%M:%S").to_string().dimmed(),
        colorize_status(&job.status),
        total
    );
}

/// Print detailed job information
pub(crate) fn print_job_details(job: &Job) {
    println!("{}", "Job Details:".bold());
    println!("  ID:         {}", job.id.cyan());
    println!("  Status:     {}", colorize_status(&job.status));

    if let Some(material) = &job.material {
        let label = material
            .parse::<Material>()
            .map(|m| m.label().to_string())
            .unwrap_or_else(|_| material.clone());
        println!("  Material:   {}", label);
    }

    if let Some(thickness) = job.thickness_mm {
        if thickness == 0.0 {
            println!("  Thickness:  {}", "auto".dimmed());
        } else {
            println!("  Thickness:  {} mm", thickness);
        }
    }

    if let Some(qty) = job.qty {
        println!("  Quantity:   {}", qty);
    }

    if let Some(quote) = job.effective_quote() {
        println!("\n{}", "Quote:".bold());
        println!(
            "  Unit:       {}",
            quote.unit_price.map(format_won).unwrap_or_else(|| "-".into())
        );
        println!(
            "  Total:      {}",
            quote
                .total_price
                .map(|total| format_won(total).bold().to_string())
                .unwrap_or_else(|| "-".into())
        );
    }

    if let Some(error) = &job.error {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }
}

/// Print an acknowledgement body
fn print_payload(payload: &Payload) {
    let rendered = match payload {
        Payload::Json(serde_json::Value::Null) => return,
        Payload::Json(value) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        Payload::Text(text) => text.clone(),
    };
    println!("{}", rendered.dimmed());
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> colored::ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Created => status_str.dimmed(),
        JobStatus::Uploaded | JobStatus::Quoted => status_str.yellow(),
        JobStatus::Processing => status_str.cyan(),
        JobStatus::Done => status_str.green(),
        JobStatus::Failed => status_str.red(),
    }
}

/// Whole won with thousands separators, e.g. `125,000 KRW`
pub(crate) fn format_won(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}{} KRW", sign, grouped)
}
