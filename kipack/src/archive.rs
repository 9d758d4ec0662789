//! Zip archive writing.
//!
//! Thin packaging layer: given the finalized source to destination
//! mapping produced by the collector, write a compressed zip. Writing
//! is all-or-nothing; any I/O or zip failure surfaces as an error,
//! unlike collection which only warns.

use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Writes project files into a zip archive.
pub struct ZipExporter;

impl ZipExporter {
    /// Create a zip at `output_path` containing every mapping entry,
    /// overwriting any existing file at that path.
    ///
    /// Destination paths are used verbatim as archive entry names.
    /// Sources that disappeared since collection are skipped rather
    /// than failing the export; collection and writing are not
    /// transactional against the filesystem. Returns the number of
    /// entries written.
    pub fn create_zip(
        output_path: &Path,
        files: &BTreeMap<PathBuf, String>,
    ) -> Result<usize, ExportError> {
        let file = File::create(output_path)?;
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut written = 0;
        for (source, dest) in files {
            if !source.exists() {
                tracing::warn!("Skipping vanished source file: {}", source.display());
                continue;
            }
            writer.start_file(dest.clone(), options)?;
            let mut input = File::open(source)?;
            io::copy(&mut input, &mut writer)?;
            written += 1;
        }

        writer.finish()?;
        Ok(written)
    }
}
