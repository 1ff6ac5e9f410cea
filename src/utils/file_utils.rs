use std::fs;
use std::path::{Path, PathBuf};

use crate::error::TableError;

pub fn is_xlsx_file(path: &Path) -> bool {
    has_extension(path, "xlsx")
}

pub fn is_csv_file(path: &Path) -> bool {
    has_extension(path, "csv")
}

pub fn is_table_file(path: &Path) -> bool {
    is_xlsx_file(path) || is_csv_file(path)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

/// 递归扫描目录中的 xlsx/csv 文件，按文件名排序
pub fn scan_table_files(dir: &Path) -> Result<Vec<PathBuf>, TableError> {
    let mut files = Vec::new();

    if !dir.exists() {
        return Ok(files);
    }

    scan_table_files_recursive(dir, &mut files)?;

    files.sort_by(|a, b| {
        a.file_name()
            .unwrap_or_default()
            .cmp(b.file_name().unwrap_or_default())
            .then_with(|| a.cmp(b))
    });

    Ok(files)
}

fn scan_table_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), TableError> {
    let entries = fs::read_dir(dir).map_err(|e| TableError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| TableError::io(dir, e))?;
        let path = entry.path();

        if let Some(name) = path.file_name() {
            let name = name.to_string_lossy();
            // 隐藏文件和 Excel 锁文件 (~$xxx.xlsx)
            if name.starts_with('.') || name.starts_with("~$") {
                continue;
            }
        }

        if path.is_dir() {
            scan_table_files_recursive(&path, files)?;
        } else if is_table_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

/// Inserts a local timestamp before the extension:
/// `out/positions.xlsx` becomes `out/positions_2024-05-01_09-30-00.xlsx`.
pub fn timestamped_path(path: &Path) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let file_name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, timestamp, ext.to_string_lossy()),
        None => format!("{}_{}", stem, timestamp),
    };

    path.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_table_file() {
        assert!(is_table_file(Path::new("positions.xlsx")));
        assert!(is_table_file(Path::new("positions.XLSX")));
        assert!(is_table_file(Path::new("Portfolio_Positions.csv")));
        assert!(!is_table_file(Path::new("positions.xls")));
        assert!(!is_table_file(Path::new("notes.txt")));
    }

    #[test]
    fn test_timestamped_path() {
        let path = timestamped_path(Path::new("out/positions.xlsx"));
        let name = path.file_name().unwrap().to_string_lossy().to_string();

        assert_eq!(path.parent(), Some(Path::new("out")));
        assert!(name.starts_with("positions_"));
        assert!(name.ends_with(".xlsx"));
        // positions_ + YYYY-MM-DD_HH-MM-SS + .xlsx
        assert_eq!(name.len(), "positions_".len() + 19 + ".xlsx".len());
    }

    #[test]
    fn test_scan_skips_hidden_and_lock_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "a\n1\n").unwrap();
        fs::write(dir.path().join("a.xlsx"), b"").unwrap();
        fs::write(dir.path().join("~$a.xlsx"), b"").unwrap();
        fs::write(dir.path().join(".hidden.csv"), "a\n").unwrap();
        fs::write(dir.path().join("readme.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.csv"), "a\n").unwrap();

        let files = scan_table_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["a.xlsx", "b.csv", "c.csv"]);
    }

    #[test]
    fn test_scan_missing_dir_is_empty() {
        let files = scan_table_files(Path::new("/definitely/not/here")).unwrap();
        assert!(files.is_empty());
    }
}
