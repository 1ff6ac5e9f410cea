mod config;
mod file_info;
mod run_report;
mod table;

pub use config::Config;
pub use file_info::{FileInfo, FileStatus};
pub use run_report::RunReport;
pub use table::{Cell, Header, Row, RowKind, Table};
