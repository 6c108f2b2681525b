//! Tabular export: one row per record, one column per flattened key.

use indexmap::IndexSet;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::error::ExportError;
use crate::flatten::{flatten, scalar_text, FlatRecord};
use crate::output::prepare_destination;

/// Union of the keys of all rows, in first-seen order.
///
/// Rows are scanned in order and each row's keys in its own order, so the
/// same input always yields the same columns.
pub fn column_union(rows: &[FlatRecord]) -> IndexSet<String> {
    let mut columns = IndexSet::new();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(key) {
                columns.insert(key.clone());
            }
        }
    }
    columns
}

/// Flattens `records` and writes them as `<dir>/<slug(name)>.csv`.
///
/// Missing directories are created and an existing file is overwritten. A
/// record lacking some column gets an empty cell. With no records the file is
/// empty, and so is a batch whose records have no leaf values at all
/// (`[{"a": {}}, {"b": []}]`): there is no column to put a row under.
/// Returns the path written.
pub fn write_csv(records: &[Value], dir: &Path, name: &str) -> Result<PathBuf, ExportError> {
    info!(records = records.len(), "Writing data into .csv file");
    let path = prepare_destination(dir, name, "csv")?;

    let rows: Vec<FlatRecord> = records.iter().map(flatten).collect();
    let columns = column_union(&rows);

    let csv_err = |e: csv::Error| {
        error!(error = ?e, path = %path.display(), "Failed to write CSV");
        ExportError::Csv {
            path: path.clone(),
            source: e,
        }
    };

    if columns.is_empty() && !rows.is_empty() {
        warn!(
            records = rows.len(),
            path = %path.display(),
            "Records have no leaf values, CSV will be empty"
        );
    }

    let mut writer = csv::Writer::from_path(&path).map_err(csv_err)?;
    if !columns.is_empty() {
        writer.write_record(&columns).map_err(csv_err)?;
        for row in &rows {
            let cells = columns
                .iter()
                .map(|column| row.get(column).map(scalar_text).unwrap_or_default());
            writer.write_record(cells).map_err(csv_err)?;
        }
    }
    writer.flush().map_err(|e| {
        error!(error = ?e, path = %path.display(), "Failed to flush CSV");
        ExportError::Io {
            path: path.clone(),
            source: e,
        }
    })?;

    info!(
        path = %path.display(),
        rows = rows.len(),
        columns = columns.len(),
        "CSV backup written"
    );
    Ok(path)
}
