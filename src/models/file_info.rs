use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FileStatus {
    #[default]
    Pending,
    Loaded,
    Error(String),
}

impl FileStatus {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// One download file seen while combining a folder.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub file_path: PathBuf,
    pub file_name: String,
    pub columns: Vec<String>,
    /// Rows kept after cleaning.
    pub row_count: usize,
    pub status: FileStatus,
}

impl FileInfo {
    pub fn from_path(path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            file_path: path,
            file_name,
            columns: Vec::new(),
            row_count: 0,
            status: FileStatus::Pending,
        }
    }
}
