use std::cmp::Ordering;

use crate::error::{Stage, Warning};
use crate::models::{Cell, Row, Table};

/// How a sort key column compares, inferred once per sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Numeric,
    Text,
}

/// Numeric when every non-empty cell in the column reads as a number.
pub fn infer_column_type(table: &Table, column: usize) -> ColumnType {
    let all_numeric = table
        .column_values(column)
        .filter(|cell| !cell.is_empty())
        .all(|cell| cell.as_number().is_some());

    if all_numeric {
        ColumnType::Numeric
    } else {
        ColumnType::Text
    }
}

#[derive(Debug, Clone, Default)]
pub struct SortOutcome {
    /// Keys that resolved, primary first.
    pub keys: Vec<String>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Copy)]
struct SortKey {
    column: usize,
    kind: ColumnType,
}

pub struct TableSorter<'a> {
    columns: &'a [String],
}

impl<'a> TableSorter<'a> {
    pub fn new(columns: &'a [String]) -> Self {
        Self { columns }
    }

    /// Stable ascending sort of every row below the header, totals rows included.
    ///
    /// Unknown key names are skipped with a warning; the remaining keys still apply.
    pub fn apply(&self, table: &mut Table) -> SortOutcome {
        let mut outcome = SortOutcome::default();
        let mut keys = Vec::with_capacity(self.columns.len());

        for name in self.columns {
            match table.header().resolve(name) {
                Some(column) => {
                    keys.push(SortKey {
                        column,
                        kind: infer_column_type(table, column),
                    });
                    outcome.keys.push(name.clone());
                }
                None => {
                    tracing::warn!("sort column not found, skipped: '{}'", name);
                    outcome.warnings.push(Warning::unresolved(Stage::Sort, name.as_str()));
                }
            }
        }

        if keys.is_empty() {
            return outcome;
        }

        table.rows_mut().sort_by(|a, b| compare_rows(a, b, &keys));
        outcome
    }
}

fn compare_rows(a: &Row, b: &Row, keys: &[SortKey]) -> Ordering {
    keys.iter().fold(Ordering::Equal, |ordering, key| {
        ordering.then_with(|| {
            let left = a.get(key.column).unwrap_or(&Cell::Empty);
            let right = b.get(key.column).unwrap_or(&Cell::Empty);
            compare_cells(left, right, key.kind)
        })
    })
}

/// 空单元格无论数值列还是文本列都排在最后
fn compare_cells(a: &Cell, b: &Cell, kind: ColumnType) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    if kind == ColumnType::Numeric {
        if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
            return x.total_cmp(&y);
        }
    }

    a.as_key().cmp(&b.as_key())
}
