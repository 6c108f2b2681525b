use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::error::ExportError;
use crate::slugify::slugify;

/// Resolves `<dir>/<slugified name>.<extension>`, creating `dir` if needed.
pub fn prepare_destination(
    dir: &Path,
    name: &str,
    extension: &str,
) -> Result<PathBuf, ExportError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            error!(error = ?e, path = %dir.display(), "Failed to create output directory");
            ExportError::Io {
                path: dir.to_path_buf(),
                source: e,
            }
        })?;
        debug!(path = %dir.display(), "Created output directory");
    }
    Ok(dir.join(format!("{}.{extension}", slugify(name, false))))
}
