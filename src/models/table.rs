use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::error::TableError;
use crate::utils::{format_number, parse_number};

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Blank text counts as empty, the way a spreadsheet shows it.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => parse_number(s),
            Cell::Empty => None,
        }
    }

    /// String form used for key matching and text comparison.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            Cell::Empty => Cow::Borrowed(""),
            Cell::Number(n) => Cow::Owned(format_number(*n)),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// Column names with a name → position lookup built once at construction.
#[derive(Debug, Clone)]
pub struct Header {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Header {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(names.len());

        // 重名列以第一次出现为准
        for (i, name) in names.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }

        Self { names, index }
    }

    /// Case-sensitive exact lookup.
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowKind {
    #[default]
    Data,
    /// Appended by the aggregator; rendered with emphasis by sinks.
    Totals,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub kind: RowKind,
}

impl Row {
    pub fn data(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            kind: RowKind::Data,
        }
    }

    pub fn totals(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            kind: RowKind::Totals,
        }
    }

    pub fn is_totals(&self) -> bool {
        self.kind == RowKind::Totals
    }

    pub fn get(&self, column: usize) -> Option<&Cell> {
        self.cells.get(column)
    }
}

/// A header row plus the rows below it. Every row is as wide as the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    header: Header,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(header: Header, rows: Vec<Row>) -> Result<Self, TableError> {
        for (i, row) in rows.iter().enumerate() {
            check_width(&header, row, i)?;
        }

        Ok(Self { header, rows })
    }

    pub fn empty(header: Header) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Builds a table of data rows from a header and raw records.
    pub fn from_records<I, S>(header: I, records: Vec<Vec<Cell>>) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = records.into_iter().map(Row::data).collect();
        Self::new(Header::new(header), rows)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows below the header, totals rows included.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn push_row(&mut self, row: Row) -> Result<(), TableError> {
        check_width(&self.header, &row, self.rows.len())?;
        self.rows.push(row);
        Ok(())
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(column)
    }

    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().filter_map(move |row| row.get(column))
    }

    pub fn into_parts(self) -> (Header, Vec<Row>) {
        (self.header, self.rows)
    }

    /// Row storage for the pipeline stages, which keep every row at header width.
    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }
}

fn check_width(header: &Header, row: &Row, index: usize) -> Result<(), TableError> {
    if row.cells.len() != header.len() {
        return Err(TableError::format(format!(
            "row {} has {} cells, header has {} columns",
            index + 2,
            row.cells.len(),
            header.len()
        )));
    }
    Ok(())
}
