use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use super::csv_io::{CsvOptions, CsvTableSource};
use super::excel_reader::XlsxTableSource;
use super::table_io::{TableFormat, TableSource};
use crate::error::{Stage, TableError, Warning};
use crate::models::{Cell, FileInfo, FileStatus, Header, Row, Table};
use crate::utils::{coerce_number, scan_table_files};

/// Cleaning applied to every broker download before the files are stacked.
#[derive(Debug, Clone, Default)]
pub struct CleanRules {
    /// Column checked for disclaimer footers.
    pub account_column: String,
    /// Rows whose account cell starts with one of these are dropped.
    pub disclaimer_prefixes: Vec<String>,
    /// Columns stripped of `$`, `,`, `%` and similar and stored as numbers.
    pub numeric_columns: Vec<String>,
    pub sheet: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CombineOutcome {
    pub table: Table,
    pub files: Vec<FileInfo>,
    pub warnings: Vec<Warning>,
}

pub struct Combiner {
    rules: CleanRules,
}

impl Combiner {
    pub fn new(rules: CleanRules) -> Self {
        Self { rules }
    }

    /// Loads every xlsx/csv file under `dir`, cleans each one and stacks them into one
    /// table. Unreadable files are skipped with a warning; a folder with nothing
    /// readable is an error.
    pub fn combine_folder(&self, dir: &Path) -> Result<CombineOutcome, TableError> {
        let start_time = Instant::now();
        let paths = scan_table_files(dir)?;

        let loaded: Vec<(FileInfo, Result<Table, TableError>)> = paths
            .into_par_iter()
            .map(|path| {
                let result = self.load_file(&path);
                (FileInfo::from_path(path), result)
            })
            .collect();

        let mut files = Vec::with_capacity(loaded.len());
        let mut tables = Vec::new();
        let mut warnings = Vec::new();

        for (mut info, result) in loaded {
            match result {
                Ok(table) => {
                    let table = self.clean(table);
                    info.columns = table.header().names().to_vec();
                    info.row_count = table.row_count();
                    info.status = FileStatus::Loaded;
                    tracing::debug!("{}: {} rows", info.file_name, info.row_count);
                    tables.push(table);
                }
                Err(e) => {
                    tracing::warn!("skipping {}: {}", info.file_path.display(), e);
                    warnings.push(Warning::SkippedFile {
                        stage: Stage::Combine,
                        path: info.file_path.clone(),
                        reason: e.to_string(),
                    });
                    info.status = FileStatus::error(e.to_string());
                }
            }
            files.push(info);
        }

        if tables.is_empty() {
            return Err(TableError::format(format!(
                "no readable .xlsx or .csv files in {}",
                dir.display()
            )));
        }

        let mut table = concat(tables);
        normalize_numeric(&mut table, &self.rules.numeric_columns);

        tracing::info!(
            "combined {} rows from {} of {} files in {:.2}s",
            table.row_count(),
            files.iter().filter(|f| !f.status.is_error()).count(),
            files.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(CombineOutcome {
            table,
            files,
            warnings,
        })
    }

    fn load_file(&self, path: &Path) -> Result<Table, TableError> {
        match TableFormat::from_path(path)? {
            TableFormat::Xlsx => XlsxTableSource::new(path, self.rules.sheet.clone()).load(),
            TableFormat::Csv => CsvTableSource::new(path, CsvOptions::lenient()).load(),
        }
    }

    /// Trims text, drops disclaimer footers and rows left blank.
    pub fn clean(&self, table: Table) -> Table {
        let account = table.header().resolve(&self.rules.account_column);
        let (header, rows) = table.into_parts();

        let rows = rows
            .into_iter()
            .map(|row| Row {
                cells: row.cells.into_iter().map(trim_cell).collect(),
                kind: row.kind,
            })
            .filter(|row| !row.cells.iter().all(Cell::is_empty))
            .filter(|row| match account.and_then(|col| row.get(col)) {
                Some(Cell::Text(text)) => !self
                    .rules
                    .disclaimer_prefixes
                    .iter()
                    .any(|prefix| text.starts_with(prefix.as_str())),
                _ => true,
            })
            .collect::<Vec<_>>();

        let mut cleaned = Table::empty(header);
        cleaned.rows_mut().extend(rows);
        cleaned
    }
}

fn trim_cell(cell: Cell) -> Cell {
    match cell {
        Cell::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Cell::Empty
            } else if trimmed.len() == text.len() {
                Cell::Text(text)
            } else {
                Cell::text(trimmed)
            }
        }
        other => other,
    }
}

/// Stacks tables by column name. The header is the union of all column names in order
/// of first appearance; cells a file lacks are left empty.
pub fn concat(tables: Vec<Table>) -> Table {
    let mut names: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for table in &tables {
        for name in table.header().names() {
            if !positions.contains_key(name) {
                positions.insert(name.clone(), names.len());
                names.push(name.clone());
            }
        }
    }

    let width = names.len();
    let mut rows = Vec::new();

    for table in tables {
        let (header, table_rows) = table.into_parts();
        let targets: Vec<usize> = header.names().iter().map(|n| positions[n]).collect();

        for row in table_rows {
            let mut cells = vec![Cell::Empty; width];
            for (cell, &target) in row.cells.into_iter().zip(&targets) {
                // 同一文件内重名列只保留第一列
                if cells[target].is_empty() {
                    cells[target] = cell;
                }
            }
            rows.push(Row { cells, kind: row.kind });
        }
    }

    let mut combined = Table::empty(Header::new(names));
    combined.rows_mut().extend(rows);
    combined
}

/// Coerces the named columns to numbers; text that has no number in it becomes empty.
pub fn normalize_numeric(table: &mut Table, columns: &[String]) {
    let targets: Vec<usize> = columns
        .iter()
        .filter_map(|name| table.header().resolve(name))
        .collect();

    for row in table.rows_mut() {
        for &col in &targets {
            if let Cell::Text(text) = &row.cells[col] {
                row.cells[col] = coerce_number(text).map(Cell::Number).unwrap_or_default();
            }
        }
    }
}
