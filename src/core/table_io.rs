use std::path::Path;

use super::csv_io::{CsvOptions, CsvTableSink, CsvTableSource};
use super::excel_reader::XlsxTableSource;
use super::excel_writer::{SheetLayout, XlsxTableSink};
use super::ExclusionSet;
use crate::error::TableError;
use crate::models::Table;
use crate::utils::{is_csv_file, is_xlsx_file};

pub trait TableSource {
    fn load(&self) -> Result<Table, TableError>;
}

pub trait ExclusionSource {
    fn load_exclusions(&self) -> Result<ExclusionSet, TableError>;
}

pub trait SumSpecSource {
    fn load_sum_spec(&self) -> Result<Vec<String>, TableError>;
}

/// Writes a table, replacing whatever is at the destination.
pub trait TableSink {
    fn save(&self, table: &Table) -> Result<(), TableError>;
}

impl TableSource for Table {
    fn load(&self) -> Result<Table, TableError> {
        Ok(self.clone())
    }
}

impl ExclusionSource for ExclusionSet {
    fn load_exclusions(&self) -> Result<ExclusionSet, TableError> {
        Ok(self.clone())
    }
}

impl SumSpecSource for Vec<String> {
    fn load_sum_spec(&self) -> Result<Vec<String>, TableError> {
        Ok(self.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Xlsx,
    Csv,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        if is_xlsx_file(path) {
            Ok(Self::Xlsx)
        } else if is_csv_file(path) {
            Ok(Self::Csv)
        } else {
            Err(TableError::format(format!(
                "unsupported file type (expected .xlsx or .csv): {}",
                path.display()
            )))
        }
    }
}

/// Picks a reader by file extension. `sheet` only applies to xlsx files.
pub fn open_table_source(
    path: &Path,
    sheet: Option<&str>,
) -> Result<Box<dyn TableSource>, TableError> {
    let source: Box<dyn TableSource> = match TableFormat::from_path(path)? {
        TableFormat::Xlsx => Box::new(XlsxTableSource::new(path, sheet.map(str::to_string))),
        TableFormat::Csv => Box::new(CsvTableSource::new(path, CsvOptions::default())),
    };
    Ok(source)
}

/// Picks a writer by file extension. `layout` only applies to xlsx files.
pub fn open_table_sink(path: &Path, layout: SheetLayout) -> Result<Box<dyn TableSink>, TableError> {
    let sink: Box<dyn TableSink> = match TableFormat::from_path(path)? {
        TableFormat::Xlsx => Box::new(XlsxTableSink::new(path, layout)),
        TableFormat::Csv => Box::new(CsvTableSink::new(path)),
    };
    Ok(sink)
}
