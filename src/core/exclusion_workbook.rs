use std::path::{Path, PathBuf};

use super::table_io::{open_table_source, ExclusionSource, SumSpecSource};
use super::ExclusionSet;
use crate::error::{Stage, TableError, Warning};
use crate::models::Table;

/// A small xlsx/csv table listing excluded symbols in one column and the names of the
/// columns to total in another. The file is re-read on every load.
#[derive(Debug, Clone)]
pub struct ExclusionWorkbook {
    path: PathBuf,
    symbol_column: String,
    sum_column: String,
}

impl ExclusionWorkbook {
    pub fn new(
        path: impl Into<PathBuf>,
        symbol_column: impl Into<String>,
        sum_column: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            symbol_column: symbol_column.into(),
            sum_column: sum_column.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_table(&self) -> Result<Table, TableError> {
        open_table_source(&self.path, None)?.load()
    }
}

/// Non-blank, trimmed values of one column in row order.
fn column_entries(table: &Table, column: usize) -> Vec<String> {
    table
        .column_values(column)
        .filter(|cell| !cell.is_empty())
        .map(|cell| cell.as_key().trim().to_string())
        .collect()
}

impl ExclusionSource for ExclusionWorkbook {
    fn load_exclusions(&self) -> Result<ExclusionSet, TableError> {
        let table = self.load_table()?;
        let column = table.header().resolve(&self.symbol_column).ok_or_else(|| {
            TableError::format(format!(
                "exclusion file {} has no '{}' column",
                self.path.display(),
                self.symbol_column
            ))
        })?;

        let exclusions: ExclusionSet = column_entries(&table, column).into_iter().collect();
        tracing::info!(
            "loaded {} excluded symbols from {}",
            exclusions.len(),
            self.path.display()
        );
        Ok(exclusions)
    }
}

impl ExclusionWorkbook {
    /// Column names to total, plus a warning when the workbook has no sum-list column.
    pub fn load_sum_spec_with_warnings(&self) -> Result<(Vec<String>, Vec<Warning>), TableError> {
        let table = self.load_table()?;
        let Some(column) = table.header().resolve(&self.sum_column) else {
            tracing::warn!(
                "exclusion file {} has no '{}' column, no totals will be computed",
                self.path.display(),
                self.sum_column
            );
            let warning = Warning::unresolved(Stage::Aggregate, self.sum_column.as_str());
            return Ok((Vec::new(), vec![warning]));
        };

        Ok((column_entries(&table, column), Vec::new()))
    }
}

impl SumSpecSource for ExclusionWorkbook {
    fn load_sum_spec(&self) -> Result<Vec<String>, TableError> {
        self.load_sum_spec_with_warnings().map(|(columns, _)| columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_loads_symbols_and_sum_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exclusions.csv");
        fs::write(
            &path,
            "Symbol,Sum Columns\nSPAXX**,Current Value\n BB ,Cost Basis Total\nFCASH**,\n",
        )
        .unwrap();

        let workbook = ExclusionWorkbook::new(&path, "Symbol", "Sum Columns");
        let exclusions = workbook.load_exclusions().unwrap();
        let sum_spec = workbook.load_sum_spec().unwrap();

        assert_eq!(exclusions.len(), 3);
        assert!(exclusions.contains("BB"));
        assert!(exclusions.contains("FCASH**"));
        assert_eq!(sum_spec, vec!["Current Value", "Cost Basis Total"]);
    }

    #[test]
    fn test_missing_symbol_column_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exclusions.csv");
        fs::write(&path, "Ticker\nBB\n").unwrap();

        let workbook = ExclusionWorkbook::new(&path, "Symbol", "Sum Columns");

        assert!(matches!(workbook.load_exclusions(), Err(TableError::Format(_))));
        assert!(workbook.load_sum_spec().unwrap().is_empty());
    }

    #[test]
    fn test_missing_sum_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exclusions.csv");
        fs::write(&path, "Symbol\nSPAXX**\n").unwrap();

        let workbook = ExclusionWorkbook::new(&path, "Symbol", "Sum Columns");
        let (columns, warnings) = workbook.load_sum_spec_with_warnings().unwrap();

        assert!(columns.is_empty());
        assert_eq!(warnings, vec![Warning::unresolved(Stage::Aggregate, "Sum Columns")]);
        assert_eq!(workbook.load_exclusions().unwrap().len(), 1);
    }

    #[test]
    fn test_present_sum_column_has_no_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exclusions.csv");
        fs::write(&path, "Symbol,Sum Columns\nSPAXX**,Current Value\n").unwrap();

        let workbook = ExclusionWorkbook::new(&path, "Symbol", "Sum Columns");
        let (columns, warnings) = workbook.load_sum_spec_with_warnings().unwrap();

        assert_eq!(columns, vec!["Current Value"]);
        assert!(warnings.is_empty());
    }
}
