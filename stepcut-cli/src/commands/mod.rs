//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod run;
mod vendor;

pub use job::JobCommands;
pub use run::RunArgs;
pub use vendor::VendorCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Job management
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Vendor management
    Vendor {
        #[command(subcommand)]
        command: VendorCommands,
    },
    /// Create, upload, quote and convert a STEP file in one go
    Run(RunArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Vendor { command } => vendor::handle_vendor_command(command, config).await,
        Commands::Run(args) => run::handle_run(args, config).await,
    }
}
