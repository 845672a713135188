//! Output column mapping for the combined report.
//!
//! Both inputs carry a `release_date`: the bulletin's is the Japanese launch
//! date printed next to the sale, the review aggregator's is its own listing
//! date. Every source field is mapped here to exactly one output column so
//! the two can never collide.

/// Which record a source field comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The parent bulletin window.
    Window,
    /// One software sale inside the window.
    Sale,
    /// The matched review-aggregator record.
    Score,
}

/// The joined-row value a column projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Platform,
    Title,
    Publisher,
    BulletinReleaseDate,
    StartDate,
    EndDate,
    WeeklyUnits,
    LifetimeUnits,
    Score,
    ContentRating,
    ReviewReleaseDate,
}

/// One `(side, source field) -> output column` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRename {
    pub side: Side,
    pub source: &'static str,
    pub output: &'static str,
    pub field: Field,
}

const fn rename(
    side: Side,
    source: &'static str,
    output: &'static str,
    field: Field,
) -> ColumnRename {
    ColumnRename {
        side,
        source,
        output,
        field,
    }
}

/// The report's columns, in output order.
pub const COLUMN_RENAMES: [ColumnRename; 11] = [
    rename(Side::Sale, "platform", "platform", Field::Platform),
    rename(Side::Sale, "title", "title", Field::Title),
    rename(Side::Sale, "publisher", "publisher", Field::Publisher),
    rename(
        Side::Sale,
        "release_date",
        "bulletin_release_date",
        Field::BulletinReleaseDate,
    ),
    rename(Side::Window, "start_date", "start_date", Field::StartDate),
    rename(Side::Window, "end_date", "end_date", Field::EndDate),
    rename(Side::Sale, "weekly_units", "weekly_units", Field::WeeklyUnits),
    rename(
        Side::Sale,
        "lifetime_units",
        "lifetime_units",
        Field::LifetimeUnits,
    ),
    rename(Side::Score, "score", "score", Field::Score),
    rename(
        Side::Score,
        "content_rating",
        "content_rating",
        Field::ContentRating,
    ),
    rename(
        Side::Score,
        "release_date",
        "review_release_date",
        Field::ReviewReleaseDate,
    ),
];

/// Output column for `source` on `side`, if the report carries it.
#[must_use]
pub fn output_name(side: Side, source: &str) -> Option<&'static str> {
    COLUMN_RENAMES
        .iter()
        .find(|c| c.side == side && c.source == source)
        .map(|c| c.output)
}

/// Header row of the software section.
#[must_use]
pub fn report_header() -> [&'static str; 11] {
    COLUMN_RENAMES.map(|c| c.output)
}
