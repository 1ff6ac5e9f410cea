use std::time::Instant;

use super::{ColumnAggregator, ExclusionFilter, ExclusionSet, TableSorter};
use crate::error::TableError;
use crate::models::{RunReport, Table};

/// Everything one pipeline run needs besides the table itself.
#[derive(Debug, Clone, Default)]
pub struct PipelineSpec {
    pub key_column: String,
    pub exclusions: ExclusionSet,
    pub sum_columns: Vec<String>,
    pub sort_columns: Vec<String>,
}

/// A transformed table and what happened to it.
#[derive(Debug, Clone)]
pub struct Processed {
    pub table: Table,
    pub report: RunReport,
}

pub struct Processor {
    spec: PipelineSpec,
}

impl Processor {
    pub fn new(spec: PipelineSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &PipelineSpec {
        &self.spec
    }

    /// Runs filter → aggregate → sort in place.
    ///
    /// On a fatal error the table keeps the state of the last completed stage.
    pub fn run(&self, table: &mut Table) -> Result<RunReport, TableError> {
        run_stages(
            table,
            &self.spec.key_column,
            &self.spec.exclusions,
            &self.spec.sum_columns,
            &self.spec.sort_columns,
        )
    }
}

/// Filters, totals and sorts `table`, consuming it and handing back the result.
pub fn transform(
    mut table: Table,
    key_column: &str,
    exclusions: &ExclusionSet,
    sum_spec: &[String],
    sort_spec: &[String],
) -> Result<Processed, TableError> {
    let report = run_stages(&mut table, key_column, exclusions, sum_spec, sort_spec)?;
    Ok(Processed { table, report })
}

fn run_stages(
    table: &mut Table,
    key_column: &str,
    exclusions: &ExclusionSet,
    sum_spec: &[String],
    sort_spec: &[String],
) -> Result<RunReport, TableError> {
    let start_time = Instant::now();
    let mut report = RunReport {
        rows_before: table.row_count(),
        ..RunReport::default()
    };

    report.removed_rows = ExclusionFilter::new(key_column, exclusions).apply(table)?;
    tracing::info!(
        "removed {} excluded rows ({} exclusions on '{}')",
        report.removed_rows,
        exclusions.len(),
        key_column
    );

    let aggregated = ColumnAggregator::new(sum_spec).apply(table)?;
    for (column, total) in &aggregated.totals {
        tracing::info!("total {}: {}", column, total);
    }
    report.totals = aggregated.totals;
    report.totals_appended = aggregated.appended;
    report.warnings.extend(aggregated.warnings);

    let sorted = TableSorter::new(sort_spec).apply(table);
    if !sorted.keys.is_empty() {
        tracing::info!("sorted {} rows by {}", table.row_count(), sorted.keys.join(", "));
    }
    report.sorted_by = sorted.keys;
    report.warnings.extend(sorted.warnings);

    report.elapsed_secs = start_time.elapsed().as_secs_f64();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Stage, Warning};
    use crate::models::Cell;

    fn positions() -> Table {
        Table::from_records(
            ["Symbol", "Shares", "Value"],
            vec![
                vec!["AAPL".into(), Cell::Number(10.0), Cell::Number(1000.0)],
                vec!["BB".into(), Cell::Number(5.0), Cell::Number(500.0)],
                vec!["AAPL".into(), Cell::Number(3.0), Cell::Number(300.0)],
            ],
        )
        .unwrap()
    }

    fn spec(key: &str, exclude: &[&str], sum: &[&str], sort: &[&str]) -> PipelineSpec {
        PipelineSpec {
            key_column: key.to_string(),
            exclusions: exclude.iter().copied().collect(),
            sum_columns: sum.iter().map(|s| s.to_string()).collect(),
            sort_columns: sort.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_run_reports_each_stage() {
        let processor = Processor::new(spec("Symbol", &["BB"], &["Value", "Gain"], &["Symbol"]));
        let mut table = positions();

        let report = processor.run(&mut table).unwrap();

        assert_eq!(report.rows_before, 3);
        assert_eq!(report.removed_rows, 1);
        assert!(report.totals_appended);
        assert_eq!(report.totals, vec![("Value".to_string(), 1300.0)]);
        assert_eq!(report.sorted_by, vec!["Symbol"]);
        assert_eq!(report.warnings, vec![Warning::unresolved(Stage::Aggregate, "Gain")]);
        assert_eq!(report.rows_after(), table.row_count());
    }

    #[test]
    fn test_missing_key_aborts_before_any_change() {
        let processor = Processor::new(spec("Ticker", &["BB"], &["Value"], &["Symbol"]));
        let mut table = positions();

        let err = processor.run(&mut table).unwrap_err();

        assert!(matches!(err, TableError::ColumnNotFound(_)));
        assert_eq!(table, positions());
    }

    #[test]
    fn test_aggregation_failure_keeps_filtered_table() {
        let processor = Processor::new(spec("Symbol", &["BB"], &["Symbol"], &["Value"]));
        let mut table = positions();

        let err = processor.run(&mut table).unwrap_err();

        assert!(matches!(err, TableError::AggregationType { .. }));
        // 过滤已完成，合计与排序未执行
        assert_eq!(table.row_count(), 2);
        assert!(table.rows().iter().all(|r| !r.is_totals()));
    }
}
