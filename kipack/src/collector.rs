//! Project file discovery.
//!
//! Starting from a board file, the collector probes for the sibling
//! project and schematic files, walks the schematic sheet hierarchy
//! recursively, and resolves symbol-library references from the
//! project's `sym-lib-table`. Problems along the way (missing files,
//! unreadable files) accumulate as warnings; collection itself never
//! fails.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::parser::parse_sexpr;

/// Collects every file required for a complete KiCad project export.
///
/// Handles:
/// - Core project files (.kicad_pcb, .kicad_sch, .kicad_pro)
/// - Hierarchical schematic sheets (recursively, cycle-safe)
/// - External symbol libraries from sym-lib-table
///
/// One collector instance performs one collection pass. Call
/// [`collect_all`](Self::collect_all) once, then read the results
/// through the accessors.
#[derive(Debug)]
pub struct ProjectCollector {
    board_path: PathBuf,
    project_root: PathBuf,
    project_name: String,
    /// Canonical paths of files inside the project root.
    collected: BTreeSet<PathBuf>,
    /// Canonical paths of libraries outside the project root, with a
    /// display name (declared library name, else filename).
    external: BTreeMap<PathBuf, String>,
    warnings: Vec<String>,
}

impl ProjectCollector {
    /// Create a collector for the project that owns `board_path`.
    ///
    /// The board path is canonicalized first, so a relative path is
    /// anchored at the current directory. The project root is the board
    /// file's parent directory and the project name is the board
    /// filename without its extension.
    pub fn new(board_path: impl AsRef<Path>) -> Self {
        let board_path = canonical(board_path.as_ref());
        // A bare filename has an empty parent, which means the current
        // directory.
        let parent = match board_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let project_root = canonical(&parent);
        let project_name = board_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            board_path,
            project_root,
            project_name,
            collected: BTreeSet::new(),
            external: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Run all three collection phases: core files, schematic
    /// hierarchy, symbol libraries.
    pub fn collect_all(&mut self) {
        tracing::debug!(
            "Collecting files for project '{}' in {}",
            self.project_name,
            self.project_root.display()
        );
        self.collect_core_files();
        self.collect_schematic_hierarchy();
        self.collect_symbol_libraries();
    }

    /// Check for the board, project and main schematic files.
    fn collect_core_files(&mut self) {
        // Board file (normally exists since its path is the input).
        if self.board_path.exists() {
            let board = canonical(&self.board_path);
            self.collected.insert(board);
        }

        let pro_path = self
            .project_root
            .join(format!("{}.kicad_pro", self.project_name));
        if pro_path.exists() {
            self.collected.insert(canonical(&pro_path));
        } else {
            self.warn(format!("Project file not found: {}", file_name_of(&pro_path)));
        }

        let sch_path = self
            .project_root
            .join(format!("{}.kicad_sch", self.project_name));
        if sch_path.exists() {
            self.collected.insert(canonical(&sch_path));
        } else {
            self.warn(format!(
                "Schematic file not found: {}",
                file_name_of(&sch_path)
            ));
        }
    }

    /// Walk the sheet hierarchy starting from the main schematic.
    fn collect_schematic_hierarchy(&mut self) {
        let main_sch = self
            .project_root
            .join(format!("{}.kicad_sch", self.project_name));
        if !main_sch.exists() {
            return;
        }

        let mut visited = BTreeSet::new();
        self.walk_sheets(&main_sch, &mut visited);
    }

    /// Parse one schematic for `sheet` references and recurse.
    ///
    /// `visited` holds canonical paths of already-processed schematics
    /// so that cycles and diamond references terminate.
    fn walk_sheets(&mut self, sch_path: &Path, visited: &mut BTreeSet<PathBuf>) {
        let resolved = canonical(sch_path);
        if !visited.insert(resolved) {
            return;
        }

        if !sch_path.exists() {
            self.warn(format!(
                "Referenced schematic not found: {}",
                sch_path.display()
            ));
            return;
        }

        let content = match fs::read_to_string(sch_path) {
            Ok(content) => content,
            Err(e) => {
                self.warn(format!("Error reading {}: {}", file_name_of(sch_path), e));
                return;
            }
        };

        let tree = parse_sexpr(&content);
        let sheet_dir = sch_path.parent().map(Path::to_path_buf).unwrap_or_default();

        for sheet in tree.find_elements("sheet") {
            let sheet_file = match sheet.property("Sheetfile") {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => continue,
            };

            // Sub-sheet paths are relative to the referencing sheet's
            // directory, not the project root.
            let sheet_path = sheet_dir.join(&sheet_file);
            if sheet_path.exists() {
                self.collected.insert(canonical(&sheet_path));
                self.walk_sheets(&sheet_path, visited);
            } else {
                self.warn(format!("Subsheet not found: {}", sheet_file));
            }
        }
    }

    /// Resolve symbol libraries declared in the project's sym-lib-table.
    fn collect_symbol_libraries(&mut self) {
        let table_path = self.project_root.join("sym-lib-table");
        if !table_path.exists() {
            return;
        }

        let content = match fs::read_to_string(&table_path) {
            Ok(content) => content,
            Err(e) => {
                self.warn(format!("Error reading sym-lib-table: {}", e));
                return;
            }
        };

        let tree = parse_sexpr(&content);
        for lib in tree.find_elements("lib") {
            let uri = match lib.element_value("uri") {
                Some(uri) if !uri.is_empty() => uri,
                _ => continue,
            };

            let lib_path = match self.resolve_lib_uri(uri) {
                Some(path) => path,
                None => continue,
            };

            if lib_path.exists() {
                let resolved = canonical(&lib_path);
                if self.is_external(&resolved) {
                    let display_name = match lib.element_value("name") {
                        Some(name) if !name.is_empty() => name.to_string(),
                        _ => file_name_of(&resolved),
                    };
                    tracing::debug!(
                        "External library '{}' at {}",
                        display_name,
                        resolved.display()
                    );
                    self.external.insert(resolved, display_name);
                } else {
                    self.collected.insert(resolved);
                }
            } else {
                self.warn(format!("Library not found: {}", uri));
            }
        }
    }

    /// Resolve a library URI from sym-lib-table to a filesystem path.
    ///
    /// `${KIPRJMOD}` expands to the project root. Any `${KICAD...}`
    /// placeholder refers to the host's bundled libraries and returns
    /// `None` (never packaged with a project). Backslash separators are
    /// normalized and relative paths are anchored at the project root.
    fn resolve_lib_uri(&self, uri: &str) -> Option<PathBuf> {
        if uri.starts_with("${KICAD") {
            return None;
        }

        let expanded = if uri.starts_with("${KIPRJMOD}") {
            uri.replace("${KIPRJMOD}", &self.project_root.to_string_lossy())
        } else {
            uri.to_string()
        };

        let path = PathBuf::from(expanded.replace('\\', "/"));
        if path.is_absolute() {
            Some(path)
        } else {
            Some(self.project_root.join(path))
        }
    }

    /// Whether a canonical path lies outside the project root subtree.
    fn is_external(&self, path: &Path) -> bool {
        !path.starts_with(&self.project_root)
    }

    fn warn(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Canonical paths of collected in-project files.
    pub fn collected_files(&self) -> &BTreeSet<PathBuf> {
        &self.collected
    }

    /// Canonical paths of external libraries with their display names.
    pub fn external_files(&self) -> &BTreeMap<PathBuf, String> {
        &self.external
    }

    /// Non-fatal problems encountered during collection, in order.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Mapping of source paths to archive-internal destination paths.
    ///
    /// In-project files keep their path relative to the project root.
    /// External libraries land under `external_libs/` keyed by bare
    /// filename, so two external libraries sharing a filename collide
    /// (last one wins).
    pub fn files_for_archive(&self) -> BTreeMap<PathBuf, String> {
        let mut mapping = BTreeMap::new();

        for path in &self.collected {
            let dest = match path.strip_prefix(&self.project_root) {
                Ok(rel) => archive_path(rel),
                // Not expected for collected files; fall back to the
                // bare filename.
                Err(_) => file_name_of(path),
            };
            mapping.insert(path.clone(), dest);
        }

        for path in self.external.keys() {
            mapping.insert(path.clone(), format!("external_libs/{}", file_name_of(path)));
        }

        mapping
    }

    /// Collected filenames grouped for display, sorted by path.
    ///
    /// Categories: "Project Files" (.kicad_pcb/.kicad_pro), "Schematic
    /// Files" (.kicad_sch) and "External Libraries". Empty categories
    /// are omitted.
    pub fn files_by_category(&self) -> BTreeMap<String, Vec<String>> {
        let mut project_files = Vec::new();
        let mut schematic_files = Vec::new();

        for path in &self.collected {
            match path.extension().and_then(|s| s.to_str()) {
                Some("kicad_pcb") | Some("kicad_pro") => project_files.push(file_name_of(path)),
                Some("kicad_sch") => schematic_files.push(file_name_of(path)),
                _ => {}
            }
        }

        let external_libs: Vec<String> = self.external.keys().map(|p| file_name_of(p)).collect();

        let mut categories = BTreeMap::new();
        if !project_files.is_empty() {
            categories.insert("Project Files".to_string(), project_files);
        }
        if !schematic_files.is_empty() {
            categories.insert("Schematic Files".to_string(), schematic_files);
        }
        if !external_libs.is_empty() {
            categories.insert("External Libraries".to_string(), external_libs);
        }
        categories
    }
}

/// Canonicalize a path, falling back to the path as given when the
/// target does not exist (or canonicalization fails for any reason).
fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Render a root-relative path with forward slashes for archive use.
fn archive_path(rel: &Path) -> String {
    rel.iter()
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
