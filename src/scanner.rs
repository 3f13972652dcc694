use anyhow::Result;
use log::warn;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Directories that never contain application classes
const SKIPPED_DIRS: &[&str] = &["vendor", "node_modules", "storage", "target"];

/// File scanner for traversing project directories.
///
/// The `FileScanner` recursively walks through a project directory to find all PHP source files.
/// It automatically skips dependency and build directories (`vendor`, `node_modules`, `storage`,
/// `target`) and hidden directories (those starting with `.`).
///
/// # Example
///
/// ```no_run
/// use laravel_openapi_router::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-app"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} PHP files", result.php_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of directory scanning operation.
///
/// Contains the list of discovered PHP files and any warnings encountered during scanning.
pub struct ScanResult {
    /// List of paths to all discovered `.php` files
    pub php_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory.
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects all `.php` files.
    ///
    /// If any directories or files cannot be accessed, warnings are logged and added to
    /// the result, but scanning continues.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut php_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_skipped =
                    e.file_type().is_dir() && SKIPPED_DIRS.iter().any(|dir| file_name == *dir);

                !is_hidden && !is_skipped
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();

                    if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("php") {
                        php_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult {
            php_files,
            warnings,
        })
    }
}
