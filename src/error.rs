//! Error and warning types for the positions pipeline.
//!
//! - [`TableError`] - fatal conditions; the run stops at the failing stage
//! - [`Warning`] - non-fatal conditions collected alongside a successful run

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Fatal pipeline and collaborator errors.
#[derive(Debug, Error)]
pub enum TableError {
    /// A mandatory column (the exclusion key) is missing from the header.
    #[error("required column not found: '{0}'")]
    ColumnNotFound(String),

    /// A cell in a summed column could not be read as a number.
    ///
    /// `row` is the spreadsheet row number, the header being row 1.
    #[error("cannot total column '{column}': row {row} holds non-numeric value '{value}'")]
    AggregationType {
        column: String,
        row: usize,
        value: String,
    },

    /// A summed column's total is not a finite number.
    #[error("total of column '{column}' is out of range")]
    TotalOutOfRange { column: String },

    /// Reading or writing a source/sink failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source is readable but not a usable table.
    #[error("format error: {0}")]
    Format(String),
}

impl TableError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }
}

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// Pipeline stage a warning was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Aggregate,
    Sort,
    Combine,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Aggregate => "aggregate",
            Stage::Sort => "sort",
            Stage::Combine => "combine",
        };
        f.write_str(name)
    }
}

/// Non-fatal conditions; the named item is skipped and processing continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("{stage}: column '{column}' not found, skipped")]
    UnresolvedColumn { stage: Stage, column: String },

    #[error("{stage}: skipped {}: {reason}", .path.display())]
    SkippedFile {
        stage: Stage,
        path: PathBuf,
        reason: String,
    },
}

impl Warning {
    pub fn unresolved(stage: Stage, column: impl Into<String>) -> Self {
        Self::UnresolvedColumn {
            stage,
            column: column.into(),
        }
    }
}
