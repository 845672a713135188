//! Persistence adapter consumed by the crawl runs and the report engine.

use std::future::Future;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

use crate::sales::{BulletinWindow, WindowKey};
use crate::scores::ScoreRecord;
use crate::CoreError;

/// Store unreachable or write rejected. Always aborts the run that hit it.
#[derive(Debug, Error)]
#[error("persistence failure during {operation}: {source}")]
pub struct StoreError {
    pub operation: &'static str,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl StoreError {
    pub fn new(
        operation: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }
}

/// The two logical collections an operator can clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Bulletins,
    Scores,
}

impl Collection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Bulletins => "bulletins",
            Collection::Scores => "scores",
        }
    }
}

impl FromStr for Collection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bulletins" => Ok(Collection::Bulletins),
            "scores" => Ok(Collection::Scores),
            other => Err(CoreError::UnknownCollection(other.to_string())),
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document store holding bulletin windows and score records.
///
/// Every operation is a single-document atomic write or a plain read.
pub trait Store: Send + Sync {
    /// Dedup ledger lookup: exact match on `(link, start_date, end_date)`.
    fn find_window(
        &self,
        key: &WindowKey,
    ) -> impl Future<Output = Result<Option<BulletinWindow>, StoreError>> + Send;

    /// Append-only write. Bulletins have no update path.
    fn insert_window(
        &self,
        window: &BulletinWindow,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// All windows with `end_date >= cutoff`.
    fn windows_ending_since(
        &self,
        cutoff: NaiveDate,
    ) -> impl Future<Output = Result<Vec<BulletinWindow>, StoreError>> + Send;

    /// Create-or-replace keyed on `record.title`.
    fn upsert_score(
        &self,
        record: &ScoreRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn all_scores(&self) -> impl Future<Output = Result<Vec<ScoreRecord>, StoreError>> + Send;

    /// Removes every document of `collection`, returning how many were dropped.
    fn delete_all(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}
