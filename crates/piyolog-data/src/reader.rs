//! Log file discovery and loading.
//!
//! Each input file becomes one [`TabInput`]; directories expand to the
//! `.txt` exports inside them, sorted by path so months line up in order.

use std::path::{Path, PathBuf};

use piyolog_core::models::TabInput;
use piyolog_core::{PiyologError, Result};
use tracing::{debug, warn};

/// Path that stands for standard input.
pub const STDIN_PATH: &str = "-";

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.txt` files recursively under `dir`, sorted by path.
pub fn find_log_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Log directory does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "txt")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Read every input into a [`TabInput`], in order.
///
/// Directories expand through [`find_log_files`]; `-` reads standard input.
/// The tab name is the file stem.
pub fn load_tabs(paths: &[PathBuf]) -> Result<Vec<TabInput>> {
    let mut tabs = Vec::new();

    for path in paths {
        if path.as_os_str() == STDIN_PATH {
            let text = std::io::read_to_string(std::io::stdin())?;
            tabs.push(TabInput::new("stdin", text));
        } else if path.is_dir() {
            for file in find_log_files(path) {
                tabs.push(read_tab(&file)?);
            }
        } else {
            tabs.push(read_tab(path)?);
        }
    }

    debug!("Loaded {} tab(s) from {} input(s)", tabs.len(), paths.len());
    Ok(tabs)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn read_tab(path: &Path) -> Result<TabInput> {
    let text = std::fs::read_to_string(path).map_err(|source| PiyologError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(TabInput::new(name, text))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_log_files_sorted_txt_only() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("2024-08.txt"), "b").unwrap();
        std::fs::write(dir.path().join("2024-07.txt"), "a").unwrap();
        std::fs::write(dir.path().join("notes.md"), "x").unwrap();

        let files = find_log_files(dir.path());
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["2024-07.txt", "2024-08.txt"]);
    }

    #[test]
    fn test_find_log_files_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(find_log_files(&dir.path().join("missing")).is_empty());
    }

    #[test]
    fn test_load_tabs_keeps_argument_order() {
        let dir = TempDir::new().unwrap();
        let july = dir.path().join("july.txt");
        let august = dir.path().join("august.txt");
        std::fs::write(&july, "2024/7/1(月)").unwrap();
        std::fs::write(&august, "2024/8/1(木)").unwrap();

        let tabs = load_tabs(&[july, august]).unwrap();
        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs[0].name, "july");
        assert_eq!(tabs[0].text, "2024/7/1(月)");
        assert_eq!(tabs[1].name, "august");
    }

    #[test]
    fn test_load_tabs_expands_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("01.txt"), "one").unwrap();
        std::fs::write(dir.path().join("02.txt"), "two").unwrap();

        let tabs = load_tabs(&[dir.path().to_path_buf()]).unwrap();
        let texts: Vec<&str> = tabs.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn test_load_tabs_missing_file_is_file_read_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.txt");
        let err = load_tabs(&[missing.clone()]).unwrap_err();
        match err {
            PiyologError::FileRead { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }
}
