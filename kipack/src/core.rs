//! Export orchestration shared by library consumers and the CLI.
//! Ties collection and archive writing together; no UI dependencies.

use std::path::{Path, PathBuf};

use crate::archive::{ExportError, ZipExporter};
use crate::collector::ProjectCollector;

#[derive(Debug, thiserror::Error)]
pub enum KipackError {
    #[error("No files found to export")]
    NoFiles,
    #[error("{0}")]
    Export(#[from] ExportError),
}

/// Summary of a completed export.
///
/// Collection warnings ride along so callers can surface them after a
/// successful export; they never abort the export itself.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExportReport {
    pub zip_path: PathBuf,
    /// Number of entries written into the archive.
    pub file_count: usize,
    /// Number of external libraries bundled under `external_libs/`.
    pub external_count: usize,
    pub warnings: Vec<String>,
}

impl ExportReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Collect the project that owns `board_path` and write everything
/// found into a zip archive at `output_path`.
///
/// Collection is best-effort: missing or unreadable referenced files
/// become warnings on the returned report. Only an empty collection
/// result or a failure while writing the archive is an error.
pub fn export_project(board_path: &Path, output_path: &Path) -> Result<ExportReport, KipackError> {
    let mut collector = ProjectCollector::new(board_path);
    collector.collect_all();

    let files = collector.files_for_archive();
    if files.is_empty() {
        return Err(KipackError::NoFiles);
    }

    let file_count = ZipExporter::create_zip(output_path, &files)?;
    tracing::debug!("Exported {} files to {}", file_count, output_path.display());

    Ok(ExportReport {
        zip_path: output_path.to_path_buf(),
        file_count,
        external_count: collector.external_files().len(),
        warnings: collector.warnings().to_vec(),
    })
}
