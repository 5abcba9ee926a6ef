/// JSON backups and spreadsheet reports.
mod backup;
mod spreadsheet;

pub use backup::{ImportMode, export_backup, import_backup, parse_backup, write_backup};
pub use spreadsheet::write_report;
