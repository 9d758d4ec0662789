//! List the files a project export would contain, without writing
//! anything. Shows the category tree the way a host UI would.

use kipack::collect_project;
use std::path::Path;

fn main() {
    let board = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demo/board.kicad_pcb".to_string());
    let board = Path::new(&board);

    if !board.exists() {
        eprintln!("File not found: {}", board.display());
        eprintln!("Usage: cargo run --example list_files [path/to/board.kicad_pcb]");
        std::process::exit(1);
    }

    let collector = collect_project(board);

    println!("Project: {}", collector.project_name());
    for (category, files) in collector.files_by_category() {
        println!("\n{} ({})", category, files.len());
        for file in files {
            println!("  {}", file);
        }
    }

    println!("\nArchive layout:");
    for (source, dest) in collector.files_for_archive() {
        println!("  {} <- {}", dest, source.display());
    }

    if !collector.warnings().is_empty() {
        println!("\nWarnings:");
        for warning in collector.warnings() {
            println!("  - {}", warning);
        }
    }
}
