//! File system operations
//!
//! Small helpers shared by the document, image, template and tenant modules.

use log::{error, warn};
use std::fs;
use std::io::{self, Result};
use std::path::Path;
use std::thread;
use std::time::Duration;

const REMOVE_RETRIES: u32 = 3;

/// Create a directory and any missing parents
pub fn create_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
}

/// Check if a regular file exists
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Check if directory exists
pub fn directory_exists(path: &Path) -> bool {
    path.is_dir()
}

/// Remove a file, retrying with linear backoff on permission errors
pub fn remove_file_with_retries(path: &Path) -> Result<()> {
    for attempt in 1..=REMOVE_RETRIES {
        match fs::remove_file(path) {
            Ok(()) => return Ok(()),
            Err(e) if attempt < REMOVE_RETRIES && e.kind() == io::ErrorKind::PermissionDenied => {
                warn!(
                    "Permission denied removing {} (attempt {}/{}), retrying",
                    path.display(),
                    attempt,
                    REMOVE_RETRIES
                );
                thread::sleep(Duration::from_millis(100 * attempt as u64));
            }
            Err(e) => {
                error!("Failed to remove {}: {}", path.display(), e);
                return Err(e);
            }
        }
    }

    Err(io::Error::other("Failed to remove file after retries"))
}

/// Names of the regular files in `dir` accepted by `keep`, sorted
pub fn list_file_names<F>(dir: &Path, keep: F) -> Result<Vec<String>>
where
    F: Fn(&str) -> bool,
{
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if keep(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_list_file_names_filters_and_sorts() {
        let dir = tempdir().expect("temp");
        fs::write(dir.path().join("b.json"), b"{}").expect("b");
        fs::write(dir.path().join("a.json"), b"{}").expect("a");
        fs::write(dir.path().join("notes.txt"), b"").expect("txt");
        fs::create_dir(dir.path().join("dir.json")).expect("dir");

        let names = list_file_names(dir.path(), |n| n.ends_with(".json")).expect("list");
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_remove_missing_file_reports_not_found() {
        let dir = tempdir().expect("temp");
        let err = remove_file_with_retries(&dir.path().join("gone")).expect_err("missing");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
