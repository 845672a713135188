//! Weekly sales bulletin records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// One ranked software entry from a bulletin's software list.
///
/// `lifetime_units` equals `weekly_units` for first-week ("new") entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareSale {
    /// Short platform code as printed in the bulletin, e.g. `NSW`, `PS5`.
    pub platform: String,
    pub title: String,
    pub publisher: Option<String>,
    /// `None` when the bulletin's short date token is missing or unparsable.
    pub release_date: Option<NaiveDate>,
    pub weekly_units: Option<u64>,
    pub lifetime_units: Option<u64>,
}

/// One hardware line from a bulletin's hardware list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareSale {
    pub platform: String,
    pub weekly_units: Option<u64>,
    pub lifetime_units: Option<u64>,
}

/// Dedup identity of a bulletin window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowKey {
    pub link: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// One published sales report covering `start_date..=end_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletinWindow {
    pub link: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub software_sales: Vec<SoftwareSale>,
    pub hardware_sales: Vec<HardwareSale>,
    pub ingested_at: DateTime<Utc>,
}

impl WindowKey {
    /// Builds a key, rejecting ranges that end before they start.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvertedWindow`] if `start_date > end_date`.
    pub fn new(
        link: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, CoreError> {
        let link = link.into();
        if start_date > end_date {
            return Err(CoreError::InvertedWindow {
                link,
                start_date,
                end_date,
            });
        }
        Ok(Self {
            link,
            start_date,
            end_date,
        })
    }
}

impl std::fmt::Display for WindowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} – {})", self.link, self.start_date, self.end_date)
    }
}

impl BulletinWindow {
    #[must_use]
    pub fn key(&self) -> WindowKey {
        WindowKey {
            link: self.link.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    #[must_use]
    pub fn matches(&self, key: &WindowKey) -> bool {
        self.link == key.link && self.start_date == key.start_date && self.end_date == key.end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_key_rejects_inverted_range() {
        let err = WindowKey::new("/a", date(2024, 1, 7), date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, CoreError::InvertedWindow { .. }));
    }

    #[test]
    fn window_key_accepts_single_day_range() {
        let key = WindowKey::new("/a", date(2024, 1, 1), date(2024, 1, 1)).unwrap();
        assert_eq!(key.start_date, key.end_date);
    }

    #[test]
    fn window_matches_only_exact_triple() {
        let window = BulletinWindow {
            link: "/a".to_string(),
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 7),
            software_sales: vec![],
            hardware_sales: vec![],
            ingested_at: Utc::now(),
        };
        assert!(window.matches(&WindowKey::new("/a", date(2024, 1, 1), date(2024, 1, 7)).unwrap()));
        assert!(!window.matches(&WindowKey::new("/b", date(2024, 1, 1), date(2024, 1, 7)).unwrap()));
        assert!(!window.matches(&WindowKey::new("/a", date(2024, 1, 2), date(2024, 1, 7)).unwrap()));
    }

    #[test]
    fn software_sale_serializes_absent_fields_as_null() {
        let sale = SoftwareSale {
            platform: "NSW".to_string(),
            title: "Animal Crossing".to_string(),
            publisher: None,
            release_date: None,
            weekly_units: Some(10),
            lifetime_units: None,
        };
        let json = serde_json::to_value(&sale).unwrap();
        assert!(json["publisher"].is_null());
        assert!(json["release_date"].is_null());
        assert!(json["lifetime_units"].is_null());
    }
}
