//! Kipack - KiCad project archiving library
//!
//! This library discovers every file that composes a KiCad project
//! (board, project metadata, hierarchical schematic sheets, referenced
//! symbol libraries) and packages them into a single portable zip
//! archive. External libraries living outside the project directory
//! are bundled under an `external_libs/` folder inside the archive.
//!
//! # Quick Start
//!
//! ```no_run
//! use kipack::export_project;
//! use std::path::Path;
//!
//! let report = export_project(
//!     Path::new("design/board.kicad_pcb"),
//!     Path::new("board.zip"),
//! ).unwrap();
//!
//! println!("wrote {} files", report.file_count);
//! for warning in &report.warnings {
//!     println!("warning: {}", warning);
//! }
//! ```
//!
//! # Features
//!
//! - **File discovery**: Core files, sheet hierarchy (cycle-safe),
//!   sym-lib-table symbol libraries
//! - **Placeholder resolution**: `${KIPRJMOD}` expansion, `${KICAD*}`
//!   system libraries skipped
//! - **Best-effort collection**: missing references become warnings,
//!   never hard failures
//! - **Zip packaging**: deterministic root-relative entry paths

pub mod archive;
pub mod collector;
pub mod core;
pub mod parser;

// Re-export main types
pub use crate::core::{export_project, ExportReport, KipackError};
pub use crate::archive::{ExportError, ZipExporter};
pub use crate::collector::ProjectCollector;
pub use crate::parser::{parse_sexpr, SExp};

/// Collect a project's files without writing an archive (convenience
/// wrapper). Returns the collector holding the collected file set,
/// external library map and warning log.
pub fn collect_project(board_path: &std::path::Path) -> ProjectCollector {
    let mut collector = ProjectCollector::new(board_path);
    collector.collect_all();
    collector
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        export_project, ExportError, ExportReport, KipackError, ProjectCollector, SExp,
        ZipExporter,
    };
}
