//! [`Store`] implementation over a Postgres pool.

use chrono::NaiveDate;
use gmdb_core::{BulletinWindow, Collection, ScoreRecord, Store, StoreError, WindowKey};
use sqlx::PgPool;

use crate::{bulletins, scores, DbError};

/// Postgres-backed persistence adapter. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn store_error(operation: &'static str) -> impl FnOnce(DbError) -> StoreError {
    move |e| StoreError::new(operation, e)
}

impl Store for PgStore {
    async fn find_window(&self, key: &WindowKey) -> Result<Option<BulletinWindow>, StoreError> {
        let row = bulletins::find_window(&self.pool, key)
            .await
            .map_err(store_error("find_window"))?;
        Ok(row.map(BulletinWindow::from))
    }

    async fn insert_window(&self, window: &BulletinWindow) -> Result<(), StoreError> {
        let id = bulletins::insert_window(&self.pool, window)
            .await
            .map_err(store_error("insert_window"))?;
        tracing::debug!(id, link = %window.link, "inserted bulletin window");
        Ok(())
    }

    async fn windows_ending_since(
        &self,
        cutoff: NaiveDate,
    ) -> Result<Vec<BulletinWindow>, StoreError> {
        let rows = bulletins::list_windows_ending_since(&self.pool, cutoff)
            .await
            .map_err(store_error("windows_ending_since"))?;
        Ok(rows.into_iter().map(BulletinWindow::from).collect())
    }

    async fn upsert_score(&self, record: &ScoreRecord) -> Result<(), StoreError> {
        scores::upsert_score(&self.pool, record)
            .await
            .map_err(store_error("upsert_score"))?;
        Ok(())
    }

    async fn all_scores(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        let rows = scores::list_scores(&self.pool)
            .await
            .map_err(store_error("all_scores"))?;
        rows.into_iter()
            .map(ScoreRecord::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(store_error("all_scores"))
    }

    async fn delete_all(&self, collection: Collection) -> Result<u64, StoreError> {
        let removed = match collection {
            Collection::Bulletins => bulletins::delete_all_windows(&self.pool).await,
            Collection::Scores => scores::delete_all_scores(&self.pool).await,
        }
        .map_err(store_error("delete_all"))?;
        tracing::info!(%collection, removed, "cleared collection");
        Ok(removed)
    }
}
