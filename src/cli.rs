///
/// This module implements the CLI interface for bricklink-backup: argument
/// parsing and the `run` entrypoint that wires config, client and pipeline.
///
/// All pipeline logic (flattening, joins, serialization) lives in the
/// [`bricklink-backup-core`] crate; this module is glue only.
///
/// [`bricklink-backup-core`]: ../../bricklink-backup-core/
use anyhow::{Context, Result};
use bricklink_backup_core::backup::{backup, BackupConfig, OutputFormat};
use clap::Parser;
use std::path::PathBuf;

use crate::client::BricklinkClient;
use crate::load_config::load_config;

/// A simple tool to back up BrickLink store inventories.
#[derive(Debug, Parser)]
#[clap(name = "bricklink-backup", version)]
pub struct Cli {
    /// Path to the TOML config file
    #[clap(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output file type: csv or xml (anything else means xml)
    #[clap(short, long, default_value = "xml")]
    pub file: String,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.config)?;
    let format = OutputFormat::from(cli.file.as_str());
    tracing::info!(?format, config = %cli.config.display(), "Starting backup");

    let client = BricklinkClient::new(config.credentials, &config.base_url, config.timeout)
        .context("Failed to construct HTTP client")?;
    let backup_config = BackupConfig {
        output_dir: config.output_dir,
        format,
        inventory_ids: config.inventory_ids,
    };

    println!("Backup starting...");
    let started_at = chrono::Local::now().naive_local();
    match backup(&backup_config, &client, started_at).await {
        Ok(report) => {
            println!("{}", "#".repeat(25));
            for file in &report.files {
                println!("File saved: {} ({} records)", file.path.display(), file.records);
            }
            tracing::info!(files = report.files.len(), "Backup complete");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Backup failed");
            Err(anyhow::Error::new(e).context("Backup failed"))
        }
    }
}
