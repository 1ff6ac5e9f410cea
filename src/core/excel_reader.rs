use calamine::{open_workbook, Data, Range, Reader, Xlsx, XlsxError};
use std::path::{Path, PathBuf};

use super::table_io::TableSource;
use crate::error::TableError;
use crate::models::{Cell, Table};

pub struct ExcelReader {
    workbook: Xlsx<std::io::BufReader<std::fs::File>>,
    path: PathBuf,
}

impl ExcelReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let path = path.as_ref().to_path_buf();

        let workbook: Xlsx<_> = open_workbook(&path).map_err(|e| map_xlsx_error(&path, e))?;

        Ok(Self { workbook, path })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// Reads a worksheet (the first one when `sheet` is `None`) as a table whose
    /// first used row is the header.
    pub fn read_table(&mut self, sheet: Option<&str>) -> Result<Table, TableError> {
        let sheet_name = match sheet {
            Some(name) => name.to_string(),
            None => self.sheet_names().into_iter().next().ok_or_else(|| {
                TableError::format(format!("workbook has no worksheets: {}", self.path.display()))
            })?,
        };

        if !self.sheet_names().contains(&sheet_name) {
            return Err(TableError::format(format!(
                "worksheet '{}' not found in {}",
                sheet_name,
                self.path.display()
            )));
        }

        let range = self
            .workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| map_xlsx_error(&self.path, e))?;

        let mut rows = Self::range_to_rows(&range).into_iter();
        let header = rows.next().ok_or_else(|| {
            TableError::format(format!(
                "worksheet '{}' in {} has no header row",
                sheet_name,
                self.path.display()
            ))
        })?;

        let header: Vec<String> = header.iter().map(|c| c.as_key().trim().to_string()).collect();
        let records: Vec<Vec<Cell>> = rows
            .filter(|row| !row.iter().all(Cell::is_empty))
            .collect();

        tracing::debug!(
            "read {} rows x {} columns from {} [{}]",
            records.len(),
            header.len(),
            self.path.display(),
            sheet_name
        );

        Table::from_records(header, records)
    }

    fn range_to_rows(range: &Range<Data>) -> Vec<Vec<Cell>> {
        let mut rows = Vec::new();

        let (Some(start), Some(end)) = (range.start(), range.end()) else {
            return rows;
        };

        for row in start.0..=end.0 {
            let mut row_data = Vec::new();
            for col in start.1..=end.1 {
                let cell = range
                    .get_value((row, col))
                    .map(Self::data_to_cell)
                    .unwrap_or_default();
                row_data.push(cell);
            }
            rows.push(row_data);
        }

        rows
    }

    fn data_to_cell(data: &Data) -> Cell {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) if s.is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Text(b.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }
}

fn map_xlsx_error(path: &Path, err: XlsxError) -> TableError {
    match err {
        XlsxError::Io(source) => TableError::io(path, source),
        other => TableError::format(format!("cannot read {}: {}", path.display(), other)),
    }
}

/// Reads one worksheet of an xlsx file.
#[derive(Debug, Clone)]
pub struct XlsxTableSource {
    path: PathBuf,
    sheet: Option<String>,
}

impl XlsxTableSource {
    pub fn new(path: impl Into<PathBuf>, sheet: Option<String>) -> Self {
        Self {
            path: path.into(),
            sheet,
        }
    }
}

impl TableSource for XlsxTableSource {
    fn load(&self) -> Result<Table, TableError> {
        let mut reader = ExcelReader::open(&self.path)?;
        reader.read_table(self.sheet.as_deref())
    }
}
