//! Error types for fetching and exporting.
//!
//! Each pipeline stage has its own error so the CLI can tell a broken
//! connection from a record that cannot be written. [`BackupError`] wraps
//! both for the orchestration in [`crate::backup`].

use std::path::PathBuf;
use thiserror::Error;

/// Failure retrieving a resource collection from the remote API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-success HTTP status.
    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },

    /// HTTP succeeded but the API envelope reported an error.
    #[error("{url} returned API error {code}: {message}")]
    Api { url: String, code: i64, message: String },

    /// The body could not be interpreted as the expected envelope.
    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },
}

/// Failure writing a backup file.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A field required by the XML schema is absent from a record.
    #[error("missing field `{field}` on inventory item {item}")]
    MissingField { field: &'static str, item: String },

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The XML writer rejected an event.
    #[error("failed to render XML: {0}")]
    Xml(String),

    #[error("failed to write CSV {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Any failure of a backup run.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
