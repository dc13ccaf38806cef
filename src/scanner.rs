use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::PathBuf;
use walkdir::WalkDir;

/// File scanner that collects the Rust sources declaring an API's types.
///
/// Skips `target`, hidden directories and any extra directory names registered through
/// [`FileScanner::skip_dir`]. Results are sorted so that the type catalog built from them is
/// deterministic across runs and platforms.
///
/// # Example
///
/// ```no_run
/// use openapi_typegraph::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-service")).skip_dir("tests");
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    skipped_dirs: Vec<String>,
}

/// Result of directory scanning operation.
pub struct ScanResult {
    /// Sorted paths of all discovered `.rs` files
    pub rust_files: Vec<PathBuf>,
    /// Warning messages for entries that could not be accessed
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            skipped_dirs: vec!["target".to_string()],
        }
    }

    /// Exclude every directory with the given name, at any depth
    pub fn skip_dir(mut self, name: impl Into<String>) -> Self {
        self.skipped_dirs.push(name.into());
        self
    }

    /// Scans the directory tree and collects all `.rs` files.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory does not exist. Inaccessible entries below the
    /// root are reported as warnings instead.
    pub fn scan(&self) -> Result<ScanResult> {
        std::fs::metadata(&self.root_path)
            .with_context(|| format!("Cannot access source root: {}", self.root_path.display()))?;

        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root_path).into_iter().filter_entry(|e| {
            if e.path() == self.root_path || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && !self.skipped_dirs.iter().any(|s| s == name.as_ref())
        });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file()
                        && path.extension().and_then(|s| s.to_str()) == Some("rs")
                    {
                        rust_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        rust_files.sort();
        debug!(
            "Scanned {}: {} Rust files",
            self.root_path.display(),
            rust_files.len()
        );

        Ok(ScanResult {
            rust_files,
            warnings,
        })
    }
}
