use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};

use super::table_io::TableSink;
use crate::error::TableError;
use crate::models::{Cell, Row, Table};
use crate::utils::parse_number;

const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

const CURRENCY_FORMAT: &str = "$#,##0.00;[Red]($#,##0.00)";
const PERCENT_FORMAT: &str = "0.00%";

/// Which columns get a number format in the written sheet.
#[derive(Debug, Clone, Default)]
pub struct SheetLayout {
    pub currency_columns: Vec<String>,
    /// Values are stored as whole percents (`5.2` meaning 5.2%) and written divided by 100.
    pub percentage_columns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnStyle {
    General,
    Currency,
    Percent,
}

struct Formats {
    header: Format,
    bold: Format,
    currency: Format,
    currency_bold: Format,
    percent: Format,
    percent_bold: Format,
}

impl Formats {
    fn new() -> Self {
        let currency = Format::new().set_num_format(CURRENCY_FORMAT);
        let percent = Format::new().set_num_format(PERCENT_FORMAT);

        Self {
            header: Format::new()
                .set_bold()
                .set_background_color("#4472C4")
                .set_font_color(Color::White)
                .set_border(FormatBorder::Thin),
            bold: Format::new().set_bold(),
            currency_bold: currency.clone().set_bold(),
            currency,
            percent_bold: percent.clone().set_bold(),
            percent,
        }
    }

    fn number(&self, style: ColumnStyle, totals: bool) -> Option<&Format> {
        match (style, totals) {
            (ColumnStyle::General, false) => None,
            (ColumnStyle::General, true) => Some(&self.bold),
            (ColumnStyle::Currency, false) => Some(&self.currency),
            (ColumnStyle::Currency, true) => Some(&self.currency_bold),
            (ColumnStyle::Percent, false) => Some(&self.percent),
            (ColumnStyle::Percent, true) => Some(&self.percent_bold),
        }
    }
}

/// Writes a table to a single-sheet xlsx workbook; totals rows are bold.
#[derive(Debug, Clone)]
pub struct XlsxTableSink {
    path: PathBuf,
    layout: SheetLayout,
}

impl XlsxTableSink {
    pub fn new(path: impl Into<PathBuf>, layout: SheetLayout) -> Self {
        Self {
            path: path.into(),
            layout,
        }
    }

    fn column_styles(&self, table: &Table) -> Vec<ColumnStyle> {
        let mut styles = vec![ColumnStyle::General; table.header().len()];

        for name in &self.layout.currency_columns {
            if let Some(col) = table.header().resolve(name) {
                styles[col] = ColumnStyle::Currency;
            }
        }
        for name in &self.layout.percentage_columns {
            if let Some(col) = table.header().resolve(name) {
                styles[col] = ColumnStyle::Percent;
            }
        }

        styles
    }

    fn write(&self, table: &Table) -> Result<(), XlsxError> {
        let formats = Formats::new();
        let styles = self.column_styles(table);

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (col, name) in table.header().names().iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, name, &formats.header)?;
        }

        for (i, row) in table.rows().iter().enumerate() {
            Self::write_row(worksheet, i as u32 + 1, row, &styles, &formats)?;
        }

        worksheet.set_freeze_panes(1, 1)?;
        worksheet.autofit();

        workbook.save(&self.path)
    }

    fn write_row(
        worksheet: &mut Worksheet,
        row_index: u32,
        row: &Row,
        styles: &[ColumnStyle],
        formats: &Formats,
    ) -> Result<(), XlsxError> {
        let totals = row.is_totals();

        for (col, cell) in row.cells.iter().enumerate() {
            let col_index = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Number(n) => {
                    Self::write_number(worksheet, row_index, col_index, *n, styles[col], totals, formats)?;
                }
                // csv 读入的数字是文本，写出时按数值处理
                Cell::Text(text) => match parse_number(text) {
                    Some(n) => {
                        Self::write_number(worksheet, row_index, col_index, n, styles[col], totals, formats)?;
                    }
                    None if totals => {
                        worksheet.write_string_with_format(row_index, col_index, text, &formats.bold)?;
                    }
                    None => {
                        worksheet.write_string(row_index, col_index, text)?;
                    }
                },
            }
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn write_number(
        worksheet: &mut Worksheet,
        row_index: u32,
        col_index: u16,
        n: f64,
        style: ColumnStyle,
        totals: bool,
        formats: &Formats,
    ) -> Result<(), XlsxError> {
        let value = if style == ColumnStyle::Percent { n / 100.0 } else { n };
        match formats.number(style, totals) {
            Some(format) => worksheet.write_number_with_format(row_index, col_index, value, format)?,
            None => worksheet.write_number(row_index, col_index, value)?,
        };
        Ok(())
    }
}

impl TableSink for XlsxTableSink {
    fn save(&self, table: &Table) -> Result<(), TableError> {
        if table.row_count() + 1 > MAX_ROWS || table.header().len() > MAX_COLUMNS {
            return Err(TableError::format(format!(
                "table of {} rows x {} columns exceeds the xlsx sheet limits",
                table.row_count() + 1,
                table.header().len()
            )));
        }

        self.write(table).map_err(|e| map_write_error(&self.path, e))?;

        tracing::info!("saved {} rows to {}", table.row_count(), self.path.display());
        Ok(())
    }
}

fn map_write_error(path: &Path, err: XlsxError) -> TableError {
    match err {
        XlsxError::IoError(source) => TableError::io(path, source),
        other => TableError::format(format!("cannot write {}: {}", path.display(), other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::excel_reader::ExcelReader;

    fn positions() -> Table {
        let mut table = Table::from_records(
            ["Symbol", "Current Value", "Percent Of Account"],
            vec![
                vec!["AAPL".into(), Cell::Number(1000.0), Cell::Number(75.0)],
                vec!["MSFT".into(), Cell::Number(300.0), Cell::Number(25.0)],
            ],
        )
        .unwrap();
        table
            .push_row(Row::totals(vec![Cell::Empty, Cell::Number(1300.0), Cell::Empty]))
            .unwrap();
        table
    }

    #[test]
    fn test_column_styles() {
        let sink = XlsxTableSink::new(
            "unused.xlsx",
            SheetLayout {
                currency_columns: vec!["Current Value".into(), "Missing".into()],
                percentage_columns: vec!["Percent Of Account".into()],
            },
        );

        assert_eq!(
            sink.column_styles(&positions()),
            vec![ColumnStyle::General, ColumnStyle::Currency, ColumnStyle::Percent]
        );
    }

    #[test]
    fn test_written_values_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        XlsxTableSink::new(&path, SheetLayout::default())
            .save(&positions())
            .unwrap();

        let table = ExcelReader::open(&path).unwrap().read_table(None).unwrap();
        assert_eq!(table.header().names(), ["Symbol", "Current Value", "Percent Of Account"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.cell(0, 1), Some(&Cell::Number(1000.0)));
        assert_eq!(table.cell(2, 0), Some(&Cell::Empty));
        assert_eq!(table.cell(2, 1), Some(&Cell::Number(1300.0)));
    }

    #[test]
    fn test_percent_columns_are_scaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let layout = SheetLayout {
            currency_columns: vec![],
            percentage_columns: vec!["Percent Of Account".into()],
        };

        XlsxTableSink::new(&path, layout).save(&positions()).unwrap();

        let table = ExcelReader::open(&path).unwrap().read_table(None).unwrap();
        assert_eq!(table.cell(0, 2), Some(&Cell::Number(0.75)));
        assert_eq!(table.cell(1, 2), Some(&Cell::Number(0.25)));
    }

    #[test]
    fn test_numeric_text_is_written_as_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let table = Table::from_records(
            ["Symbol", "Current Value", "Percent Of Account"],
            vec![
                vec!["AAPL".into(), "1000".into(), "75".into()],
                vec!["MSFT".into(), " 300.5 ".into(), "n/a".into()],
            ],
        )
        .unwrap();
        let layout = SheetLayout {
            currency_columns: vec!["Current Value".into()],
            percentage_columns: vec!["Percent Of Account".into()],
        };

        XlsxTableSink::new(&path, layout).save(&table).unwrap();

        let written = ExcelReader::open(&path).unwrap().read_table(None).unwrap();
        assert_eq!(written.cell(0, 0), Some(&Cell::text("AAPL")));
        assert_eq!(written.cell(0, 1), Some(&Cell::Number(1000.0)));
        assert_eq!(written.cell(0, 2), Some(&Cell::Number(0.75)));
        assert_eq!(written.cell(1, 1), Some(&Cell::Number(300.5)));
        assert_eq!(written.cell(1, 2), Some(&Cell::text("n/a")));
    }

    #[test]
    fn test_unwritable_destination() {
        let err = XlsxTableSink::new("/no/such/dir/out.xlsx", SheetLayout::default())
            .save(&positions())
            .unwrap_err();
        assert!(matches!(err, TableError::Io { .. } | TableError::Format(_)));
    }
}
