mod aggregator;
mod combiner;
mod csv_io;
mod excel_reader;
mod excel_writer;
mod exclusion;
mod exclusion_workbook;
mod processor;
mod sorter;
mod table_io;

pub use aggregator::{AggregateOutcome, ColumnAggregator};
pub use combiner::{concat, normalize_numeric, CleanRules, CombineOutcome, Combiner};
pub use csv_io::{CsvOptions, CsvTableSink, CsvTableSource};
pub use excel_reader::{ExcelReader, XlsxTableSource};
pub use excel_writer::{SheetLayout, XlsxTableSink};
pub use exclusion::{ExclusionFilter, ExclusionSet};
pub use exclusion_workbook::ExclusionWorkbook;
pub use processor::{transform, PipelineSpec, Processed, Processor};
pub use sorter::{infer_column_type, ColumnType, SortOutcome, TableSorter};
pub use table_io::{
    open_table_source, open_table_sink, ExclusionSource, SumSpecSource, TableFormat, TableSink,
    TableSource,
};
