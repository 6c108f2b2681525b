//! High-level pipeline: fetch → join → serialize for a store's inventory.
//!
//! This module provides the orchestration for one backup run. It:
//!   - Fetches inventories and the category list through an [`InventoryApi`]
//!   - Joins category names onto each inventory ([`join_categories`])
//!   - Serializes the enriched records as CSV or XML into the output directory
//!   - Returns a report of every file written
//!
//! # Responsibilities
//! - Fail-fast: the first fetch or export error ends the run
//! - Sequential: each request and write finishes before the next starts
//! - Stateless: nothing is persisted besides the output files
//!
//! # Navigation
//! - Main entrypoint: [`backup`]
//! - Supporting types: [`BackupConfig`], [`OutputFormat`], [`BackupReport`]

use chrono::NaiveDateTime;
use indexmap::IndexSet;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::category::{join_categories, Category};
use crate::contract::InventoryApi;
use crate::csv_export::write_csv;
use crate::error::{BackupError, ExportError};
use crate::xml_export::write_xml;

/// Timestamp layout used at the front of every backup file name.
pub const TIMESTAMP_FORMAT: &str = "%m-%d-%Y-%H-%M-%S";

/// Serialization used for the backup file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Csv,
    #[default]
    Xml,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Xml => "xml",
        }
    }
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("csv") {
            OutputFormat::Csv
        } else {
            if !s.eq_ignore_ascii_case("xml") {
                warn!(format = s, "Unknown output format, defaulting to xml");
            }
            OutputFormat::Xml
        }
    }
}

/// Everything one run needs besides the API client.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    /// When non-empty, each listed inventory is backed up to its own file
    /// instead of writing one file for the whole store. Repeated ids are
    /// backed up once.
    pub inventory_ids: Vec<i64>,
}

#[derive(Debug)]
pub struct BackupReport {
    pub files: Vec<WrittenFile>,
}

#[derive(Debug)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub records: usize,
    pub format: OutputFormat,
}

/// `<timestamp> - Bricklink Backup`, before sanitization.
pub fn store_backup_name(started_at: NaiveDateTime) -> String {
    format!("{} - Bricklink Backup", started_at.format(TIMESTAMP_FORMAT))
}

/// `<timestamp> - ID <id>`, before sanitization.
pub fn inventory_backup_name(started_at: NaiveDateTime, inventory_id: i64) -> String {
    format!("{} - ID {inventory_id}", started_at.format(TIMESTAMP_FORMAT))
}

/// `ids` without repeats, in first-seen order.
fn unique_ids(ids: &[i64]) -> IndexSet<i64> {
    let mut unique = IndexSet::with_capacity(ids.len());
    for &id in ids {
        if !unique.insert(id) {
            warn!(inventory_id = id, "Inventory listed more than once, backing it up once");
        }
    }
    unique
}

/// Writes `records` in `format`. Categories have already been joined.
pub fn export(
    format: OutputFormat,
    records: &[Value],
    dir: &Path,
    name: &str,
) -> Result<PathBuf, ExportError> {
    match format {
        OutputFormat::Csv => write_csv(records, dir, name),
        OutputFormat::Xml => write_xml(records, dir, name, &[]),
    }
}

/// Runs one backup against `api`. `started_at` stamps the file names.
pub async fn backup<A>(
    config: &BackupConfig,
    api: &A,
    started_at: NaiveDateTime,
) -> Result<BackupReport, BackupError>
where
    A: InventoryApi + ?Sized,
{
    info!(
        output_dir = %config.output_dir.display(),
        format = ?config.format,
        inventories = config.inventory_ids.len(),
        "[BACKUP] Starting backup"
    );

    let categories: Vec<Category> = api.fetch_categories().await.map_err(|e| {
        error!(error = %e, "[BACKUP][ERROR] Fetching categories failed");
        e
    })?;
    info!(count = categories.len(), "[BACKUP] Fetched categories");

    let mut files = Vec::new();

    if config.inventory_ids.is_empty() {
        let inventories = api.fetch_inventories().await.map_err(|e| {
            error!(error = %e, "[BACKUP][ERROR] Fetching inventories failed");
            e
        })?;
        info!(count = inventories.len(), "[BACKUP] Fetched inventories");
        let enriched = join_categories(inventories, &categories);
        let path = export(
            config.format,
            &enriched,
            &config.output_dir,
            &store_backup_name(started_at),
        )?;
        files.push(WrittenFile {
            path,
            records: enriched.len(),
            format: config.format,
        });
    } else {
        for inventory_id in unique_ids(&config.inventory_ids) {
            let inventory = api.fetch_inventory(inventory_id).await.map_err(|e| {
                error!(inventory_id, error = %e, "[BACKUP][ERROR] Fetching inventory failed");
                e
            })?;
            info!(inventory_id, "[BACKUP] Fetched inventory");
            let enriched = join_categories(vec![inventory], &categories);
            let path = export(
                config.format,
                &enriched,
                &config.output_dir,
                &inventory_backup_name(started_at, inventory_id),
            )?;
            files.push(WrittenFile {
                path,
                records: enriched.len(),
                format: config.format,
            });
        }
    }

    info!(files = files.len(), "[BACKUP] Backup complete");
    Ok(BackupReport { files })
}
