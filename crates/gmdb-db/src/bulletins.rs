//! Database operations for `bulletin_windows`.

use chrono::{DateTime, NaiveDate, Utc};
use gmdb_core::{BulletinWindow, HardwareSale, SoftwareSale, WindowKey};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `bulletin_windows` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BulletinWindowRow {
    pub id: i64,
    pub link: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub software_sales: Json<Vec<SoftwareSale>>,
    pub hardware_sales: Json<Vec<HardwareSale>>,
    pub ingested_at: DateTime<Utc>,
}

impl From<BulletinWindowRow> for BulletinWindow {
    fn from(row: BulletinWindowRow) -> Self {
        Self {
            link: row.link,
            start_date: row.start_date,
            end_date: row.end_date,
            software_sales: row.software_sales.0,
            hardware_sales: row.hardware_sales.0,
            ingested_at: row.ingested_at,
        }
    }
}

const SELECT_COLUMNS: &str =
    "id, link, start_date, end_date, software_sales, hardware_sales, ingested_at";

/// Exact lookup on the dedup key `(link, start_date, end_date)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_window(
    pool: &PgPool,
    key: &WindowKey,
) -> Result<Option<BulletinWindowRow>, DbError> {
    let row = sqlx::query_as::<_, BulletinWindowRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM bulletin_windows \
         WHERE link = $1 AND start_date = $2 AND end_date = $3"
    ))
    .bind(&key.link)
    .bind(key.start_date)
    .bind(key.end_date)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a new window and returns its internal `id`.
///
/// Callers check [`find_window`] first; a duplicate key surfaces as a
/// unique violation.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including on a duplicate key.
pub async fn insert_window(pool: &PgPool, window: &BulletinWindow) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO bulletin_windows \
             (link, start_date, end_date, software_sales, hardware_sales, ingested_at) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id",
    )
    .bind(&window.link)
    .bind(window.start_date)
    .bind(window.end_date)
    .bind(Json(&window.software_sales))
    .bind(Json(&window.hardware_sales))
    .bind(window.ingested_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Lists windows whose `end_date` is on or after `cutoff`, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_windows_ending_since(
    pool: &PgPool,
    cutoff: NaiveDate,
) -> Result<Vec<BulletinWindowRow>, DbError> {
    let rows = sqlx::query_as::<_, BulletinWindowRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM bulletin_windows \
         WHERE end_date >= $1 \
         ORDER BY end_date DESC, id"
    ))
    .bind(cutoff)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Deletes every bulletin window.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_all_windows(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM bulletin_windows")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
