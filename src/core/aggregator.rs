use crate::error::{Stage, TableError, Warning};
use crate::models::{Cell, Row, Table};
use crate::utils::parse_number;

#[derive(Debug, Clone, Default)]
pub struct AggregateOutcome {
    /// Column name and total, in SumSpec order.
    pub totals: Vec<(String, f64)>,
    pub appended: bool,
    pub warnings: Vec<Warning>,
}

pub struct ColumnAggregator<'a> {
    columns: &'a [String],
}

impl<'a> ColumnAggregator<'a> {
    pub fn new(columns: &'a [String]) -> Self {
        Self { columns }
    }

    /// Sums the named columns over the data rows and appends one totals row.
    ///
    /// Unknown column names are skipped with a warning. A cell that cannot be read as a
    /// number fails the whole call and the table is left as it was. No row is appended
    /// when none of the names resolve.
    pub fn apply(&self, table: &mut Table) -> Result<AggregateOutcome, TableError> {
        let mut outcome = AggregateOutcome::default();
        let mut totals_row = vec![Cell::Empty; table.header().len()];

        for name in self.columns {
            let Some(column) = table.header().resolve(name) else {
                tracing::warn!("column to total not found, skipped: '{}'", name);
                outcome.warnings.push(Warning::unresolved(Stage::Aggregate, name.as_str()));
                continue;
            };

            let total = sum_column(table, column, name)?;
            totals_row[column] = Cell::Number(total);
            outcome.totals.push((name.clone(), total));
        }

        if !outcome.totals.is_empty() {
            table.rows_mut().push(Row::totals(totals_row));
            outcome.appended = true;
        }

        Ok(outcome)
    }
}

/// 仅累加数据行，已有的合计行不参与
fn sum_column(table: &Table, column: usize, name: &str) -> Result<f64, TableError> {
    let mut total = 0.0;

    for (i, row) in table.rows().iter().enumerate() {
        if row.is_totals() {
            continue;
        }

        match row.get(column) {
            Some(Cell::Number(n)) => total += n,
            Some(Cell::Text(text)) if !text.trim().is_empty() => {
                total += parse_number(text).ok_or_else(|| TableError::AggregationType {
                    column: name.to_string(),
                    row: i + 2,
                    value: text.clone(),
                })?;
            }
            _ => {}
        }
    }

    if !total.is_finite() {
        return Err(TableError::TotalOutOfRange {
            column: name.to_string(),
        });
    }

    Ok(total)
}
