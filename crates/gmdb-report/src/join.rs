//! Join of recent bulletin windows with review scores.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use gmdb_core::{BulletinWindow, Metascore, ScoreRecord, Store};

use crate::columns::{ColumnRename, Field};
use crate::error::ReportError;

/// One software sale with its window and, when the title matched, its score.
///
/// The score-side fields are all `None` for an unmatched title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedReportRow {
    pub link: String,
    pub platform: String,
    pub title: String,
    pub publisher: Option<String>,
    pub bulletin_release_date: Option<NaiveDate>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weekly_units: Option<u64>,
    pub lifetime_units: Option<u64>,
    pub score: Option<Metascore>,
    pub content_rating: Option<String>,
    pub review_release_date: Option<NaiveDate>,
}

impl CombinedReportRow {
    /// Renders the value for `column`. Absent values render empty; a matched
    /// score without a value renders as [`gmdb_core::NOT_AVAILABLE`].
    #[must_use]
    pub fn cell(&self, column: &ColumnRename) -> String {
        match column.field {
            Field::Platform => self.platform.clone(),
            Field::Title => self.title.clone(),
            Field::Publisher => self.publisher.clone().unwrap_or_default(),
            Field::BulletinReleaseDate => format_date(self.bulletin_release_date),
            Field::StartDate => format_date(Some(self.start_date)),
            Field::EndDate => format_date(Some(self.end_date)),
            Field::WeeklyUnits => format_units(self.weekly_units),
            Field::LifetimeUnits => format_units(self.lifetime_units),
            Field::Score => self.score.map(|s| s.to_string()).unwrap_or_default(),
            Field::ContentRating => self.content_rating.clone().unwrap_or_default(),
            Field::ReviewReleaseDate => format_date(self.review_release_date),
        }
    }
}

/// One hardware line with its window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareReportRow {
    pub link: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub platform: String,
    pub weekly_units: Option<u64>,
    pub lifetime_units: Option<u64>,
}

/// The combined report for one trailing window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub generated_on: NaiveDate,
    /// Oldest `end_date` included.
    pub cutoff: NaiveDate,
    pub software: Vec<CombinedReportRow>,
    pub hardware: Vec<HardwareReportRow>,
}

/// `YYYY-MM-DD`, or empty when absent.
#[must_use]
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn format_units(units: Option<u64>) -> String {
    units.map(|u| u.to_string()).unwrap_or_default()
}

/// Oldest window end date inside a trailing window of `days` ending `today`.
///
/// # Errors
///
/// Returns [`ReportError::WindowOutOfRange`] if the subtraction underflows
/// the calendar.
pub fn cutoff_date(today: NaiveDate, days: u32) -> Result<NaiveDate, ReportError> {
    today
        .checked_sub_days(Days::new(u64::from(days)))
        .ok_or(ReportError::WindowOutOfRange(days))
}

/// Flattens every window's software list and left-joins it to `scores` on
/// exact title equality.
///
/// Output has one row per software sale, ordered by window `end_date`
/// descending. Rows of the same window keep their chart order.
#[must_use]
pub fn build_report(windows: &[BulletinWindow], scores: &[ScoreRecord]) -> Vec<CombinedReportRow> {
    let mut by_title: HashMap<&str, &ScoreRecord> = HashMap::with_capacity(scores.len());
    for score in scores {
        by_title.entry(score.title.as_str()).or_insert(score);
    }
    let by_title = &by_title;

    let mut rows: Vec<CombinedReportRow> = windows
        .iter()
        .flat_map(|window| {
            window.software_sales.iter().map(move |sale| {
                let matched = by_title.get(sale.title.as_str()).copied();
                CombinedReportRow {
                    link: window.link.clone(),
                    platform: sale.platform.clone(),
                    title: sale.title.clone(),
                    publisher: sale.publisher.clone(),
                    bulletin_release_date: sale.release_date,
                    start_date: window.start_date,
                    end_date: window.end_date,
                    weekly_units: sale.weekly_units,
                    lifetime_units: sale.lifetime_units,
                    score: matched.map(|s| s.score),
                    content_rating: matched.map(|s| s.content_rating.clone()),
                    review_release_date: matched.and_then(|s| s.release_date),
                }
            })
        })
        .collect();

    rows.sort_by(|a, b| b.end_date.cmp(&a.end_date));
    rows
}

/// Flattens every window's hardware list, newest window first.
#[must_use]
pub fn build_hardware_rows(windows: &[BulletinWindow]) -> Vec<HardwareReportRow> {
    let mut rows: Vec<HardwareReportRow> = windows
        .iter()
        .flat_map(|window| {
            window.hardware_sales.iter().map(move |sale| HardwareReportRow {
                link: window.link.clone(),
                start_date: window.start_date,
                end_date: window.end_date,
                platform: sale.platform.clone(),
                weekly_units: sale.weekly_units,
                lifetime_units: sale.lifetime_units,
            })
        })
        .collect();
    rows.sort_by(|a, b| b.end_date.cmp(&a.end_date));
    rows
}

/// Reads windows ending within the last `days` days of `today` plus every
/// score, and builds the report.
///
/// # Errors
///
/// Returns [`ReportError::Store`] when either read fails.
pub async fn load_report<S: Store>(
    store: &S,
    today: NaiveDate,
    days: u32,
) -> Result<Report, ReportError> {
    let cutoff = cutoff_date(today, days)?;
    let windows = store.windows_ending_since(cutoff).await?;
    let scores = store.all_scores().await?;

    let software = build_report(&windows, &scores);
    let hardware = build_hardware_rows(&windows);
    let matched = software.iter().filter(|r| r.score.is_some()).count();
    tracing::info!(
        %cutoff,
        windows = windows.len(),
        rows = software.len(),
        matched,
        hardware = hardware.len(),
        "built combined report"
    );

    Ok(Report {
        generated_on: today,
        cutoff,
        software,
        hardware,
    })
}
