use anyhow::Result;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Module name given to a crate root file (`lib.rs`, `main.rs`).
pub const CRATE_ROOT: &str = "crate";

/// File scanner for traversing project directories.
///
/// The `FileScanner` recursively walks through a project directory to find all Rust source files
/// and names the module each of them defines. It automatically skips common directories that
/// should be ignored, such as `target` and hidden directories (those starting with `.`).
///
/// # Example
///
/// ```no_run
/// use docurator::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-project"));
/// let result = scanner.scan().unwrap();
/// for file in &result.source_files {
///     println!("{} -> {}", file.path.display(), file.module_name);
/// }
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// A discovered source file and the module it defines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// `::`-joined module path relative to the scan root
    pub module_name: String,
}

impl SourceFile {
    pub fn new(path: PathBuf, module_name: impl Into<String>) -> Self {
        Self {
            path,
            module_name: module_name.into(),
        }
    }
}

/// Result of directory scanning operation.
///
/// Contains the discovered Rust files and any warnings encountered during scanning.
pub struct ScanResult {
    /// All discovered `.rs` files, in walk order
    pub source_files: Vec<SourceFile>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory.
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects all `.rs` files.
    ///
    /// Entries are visited in file-name order so that the discovery order, and with it the
    /// order in which marked objects are registered, is deterministic. Skips the `target`
    /// directory and hidden directories. Inaccessible paths are recorded as warnings and
    /// scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be accessed.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            anyhow::bail!("Not a directory: {}", self.root_path.display());
        }

        let mut source_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("rs") {
                        let module_name = self.module_name(path);
                        debug!("Found {} ({})", path.display(), module_name);
                        source_files.push(SourceFile::new(path.to_path_buf(), module_name));
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
            source_files,
            warnings,
        })
    }

    /// Derives the module path of a file below the scan root.
    ///
    /// A leading `src` directory is dropped, `mod.rs` is named after its directory and a root
    /// `lib.rs` or `main.rs` is the crate root.
    pub fn module_name(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root_path).unwrap_or(path);
        let mut segments: Vec<String> = relative
            .with_extension("")
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();

        if segments.len() > 1 && segments[0] == "src" {
            segments.remove(0);
        }
        if segments.last().map(String::as_str) == Some("mod") {
            segments.pop();
        }
        if segments.len() == 1 && matches!(segments[0].as_str(), "lib" | "main") {
            segments.clear();
        }

        if segments.is_empty() {
            CRATE_ROOT.to_string()
        } else {
            segments.join("::")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn module_names(result: &ScanResult) -> Vec<String> {
        result
            .source_files
            .iter()
            .map(|f| f.module_name.clone())
            .collect()
    }

    #[test]
    fn test_scan_names_modules() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("src/collections")).unwrap();
        fs::write(root.join("src/lib.rs"), "pub mod collections;").unwrap();
        fs::write(root.join("src/math.rs"), "pub fn add() {}").unwrap();
        fs::write(root.join("src/collections/mod.rs"), "pub mod cache;").unwrap();
        fs::write(root.join("src/collections/cache.rs"), "pub struct Cache;").unwrap();
        fs::write(root.join("readme.md"), "# README").unwrap();

        let scanner = FileScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert!(result.warnings.is_empty());
        assert_eq!(
            module_names(&result),
            vec!["collections::cache", "collections", "crate", "math"]
        );
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let scanner = FileScanner::new(temp_dir.path().to_path_buf());
        let result = scanner.scan().unwrap();

        assert!(result.source_files.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let scanner = FileScanner::new(PathBuf::from("/nonexistent/project"));
        assert!(scanner.scan().is_err());
    }

    #[test]
    fn test_scan_skips_target_and_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("target")).unwrap();
        fs::write(root.join("target/build.rs"), "fn main() {}").unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".git/config.rs"), "// config").unwrap();
        fs::write(root.join("main.rs"), "fn main() {}").unwrap();

        let scanner = FileScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert_eq!(result.source_files.len(), 1);
        assert_eq!(result.source_files[0].module_name, CRATE_ROOT);
    }

    #[test]
    fn test_module_name_outside_src() {
        let scanner = FileScanner::new(PathBuf::from("/project"));
        assert_eq!(
            scanner.module_name(Path::new("/project/tests/integration.rs")),
            "tests::integration"
        );
        assert_eq!(scanner.module_name(Path::new("/project/src/bin/main.rs")), "bin::main");
        assert_eq!(scanner.module_name(Path::new("/project/src.rs")), "src");
    }
}
