//! Report and score export handlers. Files are named by the current UTC date.

use std::path::{Path, PathBuf};

use chrono::Utc;
use gmdb_core::Store;
use gmdb_report::{
    load_report, render_report_csv, render_scores_csv, report_filename, scores_filename,
    write_export,
};

/// Builds the combined report for the trailing `days` and writes it to `out`.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the file cannot be written.
pub(crate) async fn write_report<S: Store>(
    store: &S,
    days: u32,
    out: &Path,
) -> anyhow::Result<PathBuf> {
    let today = Utc::now().date_naive();
    let report = load_report(store, today, days).await?;
    let bytes = render_report_csv(&report)?;
    let path = write_export(out, &report_filename(today), &bytes)?;

    println!(
        "wrote {} software and {} hardware row(s) to {}",
        report.software.len(),
        report.hardware.len(),
        path.display()
    );
    Ok(path)
}

/// Writes every stored score to `out`.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the file cannot be written.
pub(crate) async fn write_scores<S: Store>(store: &S, out: &Path) -> anyhow::Result<PathBuf> {
    let scores = store.all_scores().await?;
    let bytes = render_scores_csv(&scores)?;
    let path = write_export(out, &scores_filename(Utc::now().date_naive()), &bytes)?;

    println!("wrote {} score(s) to {}", scores.len(), path.display());
    Ok(path)
}
