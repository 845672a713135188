//! Database operations for `score_records`.

use chrono::{DateTime, NaiveDate, Utc};
use gmdb_core::{Metascore, ScoreRecord};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `score_records` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScoreRow {
    pub id: i64,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub content_rating: String,
    /// `NULL` when the aggregator showed no score.
    pub score: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ScoreRow> for ScoreRecord {
    type Error = DbError;

    fn try_from(row: ScoreRow) -> Result<Self, Self::Error> {
        let score = match row.score {
            None => Metascore::NotAvailable,
            Some(raw) => Metascore::Scored(u8::try_from(raw).map_err(|_| DbError::Decode {
                what: "score",
                reason: format!("{raw} is out of range for title {}", row.title),
            })?),
        };
        Ok(Self {
            title: row.title,
            release_date: row.release_date,
            content_rating: row.content_rating,
            score,
        })
    }
}

/// Creates or replaces the row for `record.title`.
///
/// Conflicts on `title` overwrite `release_date`, `content_rating`, `score`
/// and bump `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_score(pool: &PgPool, record: &ScoreRecord) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO score_records (title, release_date, content_rating, score) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (title) DO UPDATE SET \
             release_date   = EXCLUDED.release_date, \
             content_rating = EXCLUDED.content_rating, \
             score          = EXCLUDED.score, \
             updated_at     = NOW() \
         RETURNING id",
    )
    .bind(&record.title)
    .bind(record.release_date)
    .bind(&record.content_rating)
    .bind(record.score.value().map(i16::from))
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Lists every score row ordered by title.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_scores(pool: &PgPool) -> Result<Vec<ScoreRow>, DbError> {
    let rows = sqlx::query_as::<_, ScoreRow>(
        "SELECT id, title, release_date, content_rating, score, created_at, updated_at \
         FROM score_records \
         ORDER BY title",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Deletes every score row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_all_scores(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM score_records")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
