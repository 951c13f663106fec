use anyhow::Result;
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File scanner for traversing controller projects.
///
/// The `ControllerScanner` recursively walks through a project directory to find all
/// TypeScript source files. It automatically skips directories that never hold
/// controller sources, such as `node_modules`, `dist` and hidden directories
/// (those starting with `.`).
///
/// Every `.ts` file is collected so that DTO declarations can be looked up later;
/// the subset of files whose name ends in `.controller.ts` is what the endpoint
/// synthesizer actually documents.
///
/// # Example
///
/// ```no_run
/// use apidoc_from_source::scanner::ControllerScanner;
/// use std::path::PathBuf;
///
/// let scanner = ControllerScanner::new(PathBuf::from("./my-project"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} controller files", result.controller_files.len());
/// ```
pub struct ControllerScanner {
    root_path: PathBuf,
}

/// Result of directory scanning operation.
///
/// Contains the discovered source files and any warnings encountered during scanning.
pub struct ScanResult {
    /// Paths of files ending in `.controller.ts`, in lexicographic path
    /// order so repeated runs over the same tree discover them identically
    pub controller_files: Vec<PathBuf>,
    /// Paths of all discovered `.ts` files, including the controllers
    pub source_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

/// Returns true when the file name ends in `.controller` before the `.ts` extension.
fn is_controller_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.ends_with(".controller.ts"))
        .unwrap_or(false)
}

/// Returns true for any TypeScript source file.
fn is_source_file(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("ts")
}

impl ControllerScanner {
    /// Creates a new `ControllerScanner` for the specified root directory.
    ///
    /// # Arguments
    ///
    /// * `root_path` - The root directory to scan for controller files
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects all source files.
    ///
    /// This method recursively traverses the directory tree starting from the root
    /// path. It automatically skips:
    /// - The `node_modules` directory (dependencies)
    /// - The `dist` directory (build artifacts)
    /// - Hidden directories (starting with `.`)
    ///
    /// If any directories or files cannot be accessed, warnings are logged and added
    /// to the result, but scanning continues.
    ///
    /// # Returns
    ///
    /// Returns a `ScanResult` containing the discovered files and any warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be accessed.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut controller_files = Vec::new();
        let mut source_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }

                // Skip dependency/build directories and hidden directories
                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_ignored = file_name == "node_modules" || file_name == "dist";

                !is_hidden && !is_ignored
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();

                    if path.is_file() && is_source_file(path) {
                        if is_controller_file(path) {
                            controller_files.push(path.to_path_buf());
                        }
                        source_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    // Record warning for inaccessible directories/files
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult {
            controller_files,
            source_files,
            warnings,
        })
    }
}
