//! Simple export example: collect a project and write it to a zip.

use kipack::prelude::*;
use std::path::Path;

fn main() -> Result<(), KipackError> {
    let board = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demo/board.kicad_pcb".to_string());
    let board = Path::new(&board);

    if !board.exists() {
        eprintln!("File not found: {}", board.display());
        eprintln!("Usage: cargo run --example simple_export [path/to/board.kicad_pcb]");
        std::process::exit(1);
    }

    let output = board.with_extension("zip");
    let report = export_project(board, &output)?;

    println!("Exported to: {}", report.zip_path.display());
    println!("Files included: {}", report.file_count);
    if report.external_count > 0 {
        println!("External libraries: {}", report.external_count);
    }

    if report.has_warnings() {
        println!("\nWarnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
    }

    Ok(())
}
