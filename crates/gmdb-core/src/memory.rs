//! In-process [`Store`] used by crawl and report tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;

use crate::sales::{BulletinWindow, WindowKey};
use crate::scores::ScoreRecord;
use crate::store::{Collection, Store, StoreError};

#[derive(Debug, Default)]
struct Inner {
    windows: Vec<BulletinWindow>,
    scores: Vec<ScoreRecord>,
    lookups: usize,
}

/// Vec-backed store with the same keying rules as the Postgres schema.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_windows(windows: Vec<BulletinWindow>) -> Self {
        let store = Self::default();
        store.lock().windows = windows;
        store
    }

    #[must_use]
    pub fn windows(&self) -> Vec<BulletinWindow> {
        self.lock().windows.clone()
    }

    #[must_use]
    pub fn scores(&self) -> Vec<ScoreRecord> {
        self.lock().scores.clone()
    }

    /// Number of dedup lookups served so far.
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lock().lookups
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for MemoryStore {
    async fn find_window(&self, key: &WindowKey) -> Result<Option<BulletinWindow>, StoreError> {
        let mut inner = self.lock();
        inner.lookups += 1;
        Ok(inner.windows.iter().find(|w| w.matches(key)).cloned())
    }

    async fn insert_window(&self, window: &BulletinWindow) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let key = window.key();
        if inner.windows.iter().any(|w| w.matches(&key)) {
            return Err(StoreError::new(
                "insert_window",
                format!("duplicate bulletin window {key}"),
            ));
        }
        inner.windows.push(window.clone());
        Ok(())
    }

    async fn windows_ending_since(
        &self,
        cutoff: NaiveDate,
    ) -> Result<Vec<BulletinWindow>, StoreError> {
        Ok(self
            .lock()
            .windows
            .iter()
            .filter(|w| w.end_date >= cutoff)
            .cloned()
            .collect())
    }

    async fn upsert_score(&self, record: &ScoreRecord) -> Result<(), StoreError> {
        let mut inner = self.lock();
        match inner.scores.iter_mut().find(|s| s.title == record.title) {
            Some(existing) => *existing = record.clone(),
            None => inner.scores.push(record.clone()),
        }
        Ok(())
    }

    async fn all_scores(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(self.lock().scores.clone())
    }

    async fn delete_all(&self, collection: Collection) -> Result<u64, StoreError> {
        let mut inner = self.lock();
        let removed = match collection {
            Collection::Bulletins => std::mem::take(&mut inner.windows).len(),
            Collection::Scores => std::mem::take(&mut inner.scores).len(),
        };
        Ok(removed as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::scores::Metascore;

    fn window(link: &str, end_day: u32) -> BulletinWindow {
        BulletinWindow {
            link: link.to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, end_day).unwrap(),
            software_sales: vec![],
            hardware_sales: vec![],
            ingested_at: Utc::now(),
        }
    }

    fn score(title: &str, value: u8) -> ScoreRecord {
        ScoreRecord {
            title: title.to_string(),
            release_date: None,
            content_rating: "M".to_string(),
            score: Metascore::Scored(value),
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_key() {
        let store = MemoryStore::new();
        store.insert_window(&window("/a", 7)).await.unwrap();
        assert!(store.insert_window(&window("/a", 7)).await.is_err());
        assert_eq!(store.windows().len(), 1);
    }

    #[tokio::test]
    async fn upsert_replaces_by_title() {
        let store = MemoryStore::new();
        store.upsert_score(&score("Foo", 80)).await.unwrap();
        store.upsert_score(&score("Foo", 85)).await.unwrap();
        let scores = store.all_scores().await.unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].score, Metascore::Scored(85));
    }

    #[tokio::test]
    async fn windows_ending_since_filters_on_end_date() {
        let store = MemoryStore::with_windows(vec![window("/a", 7), window("/b", 14)]);
        let cutoff = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let recent = store.windows_ending_since(cutoff).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].link, "/b");
    }

    #[tokio::test]
    async fn delete_all_clears_one_collection() {
        let store = MemoryStore::with_windows(vec![window("/a", 7)]);
        store.upsert_score(&score("Foo", 80)).await.unwrap();
        assert_eq!(store.delete_all(Collection::Bulletins).await.unwrap(), 1);
        assert!(store.windows().is_empty());
        assert_eq!(store.scores().len(), 1);
    }
}
