//! Kipack CLI - export KiCad projects as portable zip archives from the
//! command line.

use clap::{Parser, Subcommand, ValueEnum};
use kipack::{export_project, ExportReport, ProjectCollector};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "kipack")]
#[command(about = "KiCad project zip export tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect a project's files and write them to a zip archive
    Export {
        /// Path to the project's .kicad_pcb file
        #[arg(value_name = "BOARD")]
        board: PathBuf,

        /// Output zip path (defaults to <project>.zip next to the board)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Overwrite the output file if it already exists
        #[arg(long)]
        force: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with an error code when collection produced warnings
        #[arg(long)]
        fail_on_warnings: bool,
    },

    /// List the files an export would include, without writing a zip
    List {
        /// Path to the project's .kicad_pcb file
        #[arg(value_name = "BOARD")]
        board: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for CI/CD
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Export {
            board,
            output,
            force,
            format,
            fail_on_warnings,
        } => handle_export(&board, output, force, format, fail_on_warnings),
        Commands::List { board, format } => handle_list(&board, format),
    };

    process::exit(exit_code);
}

fn handle_export(
    board: &Path,
    output: Option<PathBuf>,
    force: bool,
    format: OutputFormat,
    fail_on_warnings: bool,
) -> i32 {
    if !board.exists() {
        eprintln!("Error: Board file not found: {}", board.display());
        return 1;
    }
    if board.extension().and_then(|s| s.to_str()) != Some("kicad_pcb") {
        eprintln!("Error: File must be a .kicad_pcb board file");
        return 1;
    }

    let output = resolve_output_path(board, output);
    if output.exists() && !force {
        eprintln!(
            "Error: Output file already exists: {} (use --force to overwrite)",
            output.display()
        );
        return 1;
    }

    match export_project(board, &output) {
        Ok(report) => {
            match format {
                OutputFormat::Human => print_report(&report),
                OutputFormat::Json => print_report_json(&report),
            }
            if fail_on_warnings && report.has_warnings() {
                return 1;
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn handle_list(board: &Path, format: OutputFormat) -> i32 {
    if !board.exists() {
        eprintln!("Error: Board file not found: {}", board.display());
        return 1;
    }
    if board.extension().and_then(|s| s.to_str()) != Some("kicad_pcb") {
        eprintln!("Error: File must be a .kicad_pcb board file");
        return 1;
    }

    let mut collector = ProjectCollector::new(board);
    collector.collect_all();

    match format {
        OutputFormat::Human => print_listing(&collector),
        OutputFormat::Json => print_listing_json(&collector),
    }
    0
}

/// Default output is `<project>.zip` next to the board. An explicit
/// name without a .zip extension gets one appended rather than
/// replaced.
fn resolve_output_path(board: &Path, output: Option<PathBuf>) -> PathBuf {
    match output {
        Some(path) => {
            let has_zip_ext = path
                .extension()
                .and_then(|s| s.to_str())
                .map(|e| e.eq_ignore_ascii_case("zip"))
                .unwrap_or(false);
            if has_zip_ext {
                path
            } else {
                let mut name = path.into_os_string();
                name.push(".zip");
                PathBuf::from(name)
            }
        }
        None => board.with_extension("zip"),
    }
}

fn print_report(report: &ExportReport) {
    println!("Project exported successfully!");
    println!();
    println!("Location: {}", report.zip_path.display());
    println!("Files included: {}", report.file_count);
    if report.external_count > 0 {
        println!("External libraries: {}", report.external_count);
    }

    if report.has_warnings() {
        println!();
        println!("Warnings: {}", report.warnings.len());
        for warning in report.warnings.iter().take(3) {
            println!("  - {}", warning);
        }
        if report.warnings.len() > 3 {
            println!("  ... and {} more", report.warnings.len() - 3);
        }
    }
}

fn print_report_json(report: &ExportReport) {
    println!("{}", serde_json::to_string_pretty(report).unwrap());
}

fn print_listing(collector: &ProjectCollector) {
    println!("Project: {}", collector.project_name());

    for (category, files) in collector.files_by_category() {
        println!("\n{} ({})", category, files.len());
        for file in files {
            println!("  {}", file);
        }
    }

    println!("\nArchive layout:");
    for (source, dest) in collector.files_for_archive() {
        println!("  {}  ({})", dest, source.display());
    }

    if !collector.warnings().is_empty() {
        println!("\nWarnings: {}", collector.warnings().len());
        for warning in collector.warnings() {
            println!("  - {}", warning);
        }
    }
}

fn print_listing_json(collector: &ProjectCollector) {
    let files: Vec<_> = collector
        .files_for_archive()
        .iter()
        .map(|(source, dest)| {
            serde_json::json!({
                "source": source.display().to_string(),
                "destination": dest,
            })
        })
        .collect();

    let output = serde_json::json!({
        "project": collector.project_name(),
        "files": files,
        "categories": collector.files_by_category(),
        "external_count": collector.external_files().len(),
        "warnings": collector.warnings(),
    });
    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}
