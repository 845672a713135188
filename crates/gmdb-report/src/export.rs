//! CSV renderings of the combined report and of the raw score set.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use gmdb_core::{ScoreRecord, NOT_AVAILABLE};

use crate::columns::{report_header, COLUMN_RENAMES};
use crate::error::ReportError;
use crate::join::{format_date, Report};

const SOFTWARE_SECTION: &str = "# software_sales";
const HARDWARE_SECTION: &str = "# hardware_sales";
const HARDWARE_HEADER: [&str; 6] = [
    "link",
    "start_date",
    "end_date",
    "platform",
    "weekly_units",
    "lifetime_units",
];
const SCORES_HEADER: [&str; 4] = ["title", "release_date", "content_rating", "score"];

/// `gmdb_report_<YYYY-MM-DD>_utc.csv`
#[must_use]
pub fn report_filename(date: NaiveDate) -> String {
    format!("gmdb_report_{}_utc.csv", date.format("%Y-%m-%d"))
}

/// `gmdb_scores_<YYYY-MM-DD>_utc.csv`
#[must_use]
pub fn scores_filename(date: NaiveDate) -> String {
    format!("gmdb_scores_{}_utc.csv", date.format("%Y-%m-%d"))
}

/// Renders the two-section report: software rows joined with scores, a
/// blank line, then the hardware rows of the same windows.
///
/// # Errors
///
/// Returns [`ReportError::Csv`] if a record cannot be encoded.
pub fn render_report_csv(report: &Report) -> Result<Vec<u8>, ReportError> {
    let mut buf = Vec::new();

    buf.extend_from_slice(SOFTWARE_SECTION.as_bytes());
    buf.push(b'\n');
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(report_header())?;
        for row in &report.software {
            writer.write_record(COLUMN_RENAMES.iter().map(|c| row.cell(c)))?;
        }
        writer.flush().map_err(csv::Error::from)?;
    }

    buf.push(b'\n');
    buf.extend_from_slice(HARDWARE_SECTION.as_bytes());
    buf.push(b'\n');
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(HARDWARE_HEADER)?;
        for row in &report.hardware {
            writer.write_record([
                row.link.clone(),
                format_date(Some(row.start_date)),
                format_date(Some(row.end_date)),
                row.platform.clone(),
                row.weekly_units.map(|u| u.to_string()).unwrap_or_default(),
                row.lifetime_units.map(|u| u.to_string()).unwrap_or_default(),
            ])?;
        }
        writer.flush().map_err(csv::Error::from)?;
    }

    Ok(buf)
}

/// Renders every stored score. Missing values render as [`NOT_AVAILABLE`].
///
/// # Errors
///
/// Returns [`ReportError::Csv`] if a record cannot be encoded.
pub fn render_scores_csv(scores: &[ScoreRecord]) -> Result<Vec<u8>, ReportError> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(SCORES_HEADER)?;
        for record in scores {
            let release_date = record
                .release_date
                .map_or_else(|| NOT_AVAILABLE.to_string(), |d| format_date(Some(d)));
            writer.write_record([
                record.title.clone(),
                release_date,
                record.content_rating.clone(),
                record.score.to_string(),
            ])?;
        }
        writer.flush().map_err(csv::Error::from)?;
    }
    Ok(buf)
}

/// Writes `contents` to `dir/filename`, creating `dir` if needed.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if the directory or file cannot be written.
pub fn write_export(dir: &Path, filename: &str, contents: &[u8]) -> Result<PathBuf, ReportError> {
    let io_err = |path: &Path, source: std::io::Error| ReportError::Io {
        path: path.display().to_string(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    let path = dir.join(filename);
    std::fs::write(&path, contents).map_err(|e| io_err(&path, e))?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "wrote export");
    Ok(path)
}
