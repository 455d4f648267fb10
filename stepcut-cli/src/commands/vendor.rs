//! Vendor command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;

use crate::config::Config;

/// Vendor subcommands
#[derive(Subcommand)]
pub enum VendorCommands {
    /// Create a test vendor to dispatch jobs to
    Seed,
}

/// Handle vendor commands
pub async fn handle_vendor_command(command: VendorCommands, config: &Config) -> Result<()> {
    let client = config.client()?;

    match command {
        VendorCommands::Seed => {
            let seeded = client
                .seed_vendor()
                .await
                .context("Failed to seed vendor")?;
            println!("{} Seeded vendor {}", "✓".green(), seeded.vendor_id.cyan());
            Ok(())
        }
    }
}
