use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Source tree scanner used to locate the file declaring a module.
///
/// Skips the `target` directory and hidden directories (those starting with `.`).
///
/// # Example
///
/// ```no_run
/// use openapi_from_rules::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./src"));
/// if let Some(path) = scanner.find_module("users") {
///     println!("users module defined in {}", path.display());
/// }
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of directory scanning operation.
pub struct ScanResult {
    /// Paths of all discovered `.rs` files, sorted
    pub rust_files: Vec<PathBuf>,
    /// Warning messages for inaccessible entries
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Collects every `.rs` file below the root.
    ///
    /// Inaccessible entries are logged and reported as warnings; scanning
    /// continues past them.
    pub fn scan(&self) -> ScanResult {
        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
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
        ScanResult {
            rust_files,
            warnings,
        }
    }

    /// Find the file declaring module `name` anywhere below the root.
    ///
    /// Both `name.rs` and `name/mod.rs` layouts are recognized. When several files
    /// match, the one with the shortest path wins.
    pub fn find_module(&self, name: &str) -> Option<PathBuf> {
        debug!(
            "Scanning {} for module {}",
            self.root_path.display(),
            name
        );
        let file_name = format!("{}.rs", name);
        self.scan()
            .rust_files
            .into_iter()
            .filter(|path| declares_module(path, name, &file_name))
            .min_by_key(|path| path.components().count())
    }
}

fn declares_module(path: &Path, name: &str, file_name: &str) -> bool {
    match path.file_name().and_then(|f| f.to_str()) {
        Some(f) if f == file_name => true,
        Some("mod.rs") => path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|p| p.to_str())
            == Some(name),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("src/models")).unwrap();
        fs::write(root.join("main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("src/lib.rs"), "pub fn test() {}").unwrap();
        fs::write(root.join("src/models/user.rs"), "struct User {}").unwrap();
        fs::write(root.join("readme.md"), "# README").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan();

        assert_eq!(result.rust_files.len(), 3);
        assert!(result.warnings.is_empty());
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

        let result = FileScanner::new(root.to_path_buf()).scan();

        assert_eq!(result.rust_files.len(), 1);
        assert_eq!(
            result.rust_files[0].file_name().unwrap().to_string_lossy(),
            "main.rs"
        );
    }

    #[test]
    fn test_find_module_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("http/controllers")).unwrap();
        fs::write(root.join("http/controllers/users.rs"), "pub fn index() {}").unwrap();

        let scanner = FileScanner::new(root.to_path_buf());
        assert_eq!(
            scanner.find_module("users"),
            Some(root.join("http/controllers/users.rs"))
        );
        assert_eq!(scanner.find_module("products"), None);
    }

    #[test]
    fn test_find_module_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("api/auth")).unwrap();
        fs::write(root.join("api/auth/mod.rs"), "pub fn login() {}").unwrap();

        let scanner = FileScanner::new(root.to_path_buf());
        assert_eq!(scanner.find_module("auth"), Some(root.join("api/auth/mod.rs")));
    }

    #[test]
    fn test_find_module_prefers_shortest_path() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join("a/b/users.rs"), "").unwrap();
        fs::write(root.join("a/users.rs"), "").unwrap();

        let scanner = FileScanner::new(root.to_path_buf());
        assert_eq!(scanner.find_module("users"), Some(root.join("a/users.rs")));
    }
}
