use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::path::{Path, PathBuf};

use super::table_io::{TableSink, TableSource};
use crate::error::TableError;
use crate::models::{Cell, Table};

#[derive(Debug, Clone, Copy)]
pub struct CsvOptions {
    pub delimiter: u8,
    /// Pads short rows with empty cells and drops empty trailing fields instead of
    /// rejecting the file. Broker downloads end with one-field disclaimer lines.
    pub flexible: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            flexible: false,
        }
    }
}

impl CsvOptions {
    pub fn lenient() -> Self {
        Self {
            flexible: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvTableSource {
    path: PathBuf,
    options: CsvOptions,
}

impl CsvTableSource {
    pub fn new(path: impl Into<PathBuf>, options: CsvOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }
}

impl TableSource for CsvTableSource {
    fn load(&self) -> Result<Table, TableError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            // 表头自行处理，便于报告行号
            .has_headers(false)
            .flexible(self.options.flexible)
            .from_path(&self.path)
            .map_err(|e| map_csv_error(&self.path, e))?;

        let mut records = reader.records();

        let header: Vec<String> = match records.next() {
            Some(record) => record
                .map_err(|e| map_csv_error(&self.path, e))?
                .iter()
                .map(|s| s.trim_start_matches('\u{feff}').trim().to_string())
                .collect(),
            None => {
                return Err(TableError::format(format!(
                    "csv file is empty: {}",
                    self.path.display()
                )));
            }
        };
        let width = trimmed_width(&header);

        let mut rows = Vec::new();
        for (i, record) in records.enumerate() {
            let record = record.map_err(|e| map_csv_error(&self.path, e))?;
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            let row = self.fit_row(&record, width, i + 2)?;
            rows.push(row);
        }

        tracing::debug!("read {} rows from {}", rows.len(), self.path.display());
        Table::from_records(header.into_iter().take(width), rows)
    }
}

impl CsvTableSource {
    fn fit_row(&self, record: &StringRecord, width: usize, line: usize) -> Result<Vec<Cell>, TableError> {
        let mut cells: Vec<Cell> = record.iter().map(field_to_cell).collect();

        if self.options.flexible {
            while cells.len() > width && cells.last().is_some_and(Cell::is_empty) {
                cells.pop();
            }
            if cells.len() < width {
                cells.resize(width, Cell::Empty);
            }
        } else if cells.len() > width && cells[width..].iter().all(Cell::is_empty) {
            cells.truncate(width);
        }

        if cells.len() != width {
            return Err(TableError::format(format!(
                "{}: line {} has {} fields, header has {}",
                self.path.display(),
                line,
                cells.len(),
                width
            )));
        }

        Ok(cells)
    }
}

/// Header width without trailing blank names; exports often end every line with a comma.
fn trimmed_width(header: &[String]) -> usize {
    header
        .iter()
        .rposition(|name| !name.is_empty())
        .map(|i| i + 1)
        .unwrap_or(0)
}

fn field_to_cell(field: &str) -> Cell {
    if field.trim().is_empty() {
        Cell::Empty
    } else {
        Cell::text(field)
    }
}

fn map_csv_error(path: &Path, err: csv::Error) -> TableError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => TableError::io(path, source),
        _ => TableError::format(format!("{}: {}", path.display(), message)),
    }
}

#[derive(Debug, Clone)]
pub struct CsvTableSink {
    path: PathBuf,
}

impl CsvTableSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSink for CsvTableSink {
    fn save(&self, table: &Table) -> Result<(), TableError> {
        let mut writer = WriterBuilder::new()
            .from_path(&self.path)
            .map_err(|e| map_csv_error(&self.path, e))?;

        writer
            .write_record(table.header().names())
            .map_err(|e| map_csv_error(&self.path, e))?;

        for row in table.rows() {
            writer
                .write_record(row.cells.iter().map(|c| c.to_string()))
                .map_err(|e| map_csv_error(&self.path, e))?;
        }

        writer.flush().map_err(|e| TableError::io(&self.path, e))?;

        tracing::info!("saved {} rows to {}", table.row_count(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_keeps_fields_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "p.csv", "Symbol, Shares ,Value\nAAPL,10,1000\n\nBB,,500\n");

        let table = CsvTableSource::new(&path, CsvOptions::default()).load().unwrap();

        assert_eq!(table.header().names(), ["Symbol", "Shares", "Value"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 1), Some(&Cell::text("10")));
        assert_eq!(table.cell(1, 1), Some(&Cell::Empty));
    }

    #[test]
    fn test_strict_rejects_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "p.csv", "Symbol,Value\nAAPL,1\nBB\n");

        let err = CsvTableSource::new(&path, CsvOptions::default()).load().unwrap_err();

        assert!(matches!(err, TableError::Format(_)));
    }

    #[test]
    fn test_lenient_pads_short_rows_and_trailing_commas() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "p.csv",
            "\u{feff}Account Number,Symbol,Value,\nZ1,AAPL,1,\nZ1,MSFT,2,\n\n\"Date downloaded 05/01/2024\"\n",
        );

        let table = CsvTableSource::new(&path, CsvOptions::lenient()).load().unwrap();

        assert_eq!(table.header().names(), ["Account Number", "Symbol", "Value"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(
            table.rows()[2].cells,
            vec![Cell::text("Date downloaded 05/01/2024"), Cell::Empty, Cell::Empty]
        );
    }

    #[test]
    fn test_empty_file_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "p.csv", "");

        let err = CsvTableSource::new(&path, CsvOptions::default()).load().unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = CsvTableSource::new("/no/such/file.csv", CsvOptions::default())
            .load()
            .unwrap_err();
        assert!(matches!(err, TableError::Io { .. }));
    }

    #[test]
    fn test_sink_writes_display_forms() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = Table::from_records(
            ["Symbol", "Value"],
            vec![
                vec!["AAPL".into(), Cell::Number(1000.0)],
                vec![Cell::Empty, Cell::Number(1300.5)],
            ],
        )
        .unwrap();

        CsvTableSink::new(&path).save(&table).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Symbol,Value\nAAPL,1000\n,1300.5\n");
    }
}
