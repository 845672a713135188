pub mod columns;
pub mod error;
pub mod export;
pub mod join;

pub use columns::{output_name, report_header, ColumnRename, Field, Side, COLUMN_RENAMES};
pub use error::ReportError;
pub use export::{
    render_report_csv, render_scores_csv, report_filename, scores_filename, write_export,
};
pub use join::{
    build_hardware_rows, build_report, cutoff_date, format_date, load_report, CombinedReportRow,
    HardwareReportRow, Report,
};
