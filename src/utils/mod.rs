mod file_utils;
mod numeric;

pub use file_utils::{is_csv_file, is_table_file, is_xlsx_file, scan_table_files, timestamped_path};
pub use numeric::{coerce_number, format_number, parse_number, strip_non_numeric, NON_NUMERIC};
