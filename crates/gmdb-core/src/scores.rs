//! Review-aggregator score records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rendering of any review field the aggregator did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// A critic score, or the explicit marker that the card carried none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metascore {
    Scored(u8),
    NotAvailable,
}

impl Metascore {
    #[must_use]
    pub fn value(self) -> Option<u8> {
        match self {
            Metascore::Scored(v) => Some(v),
            Metascore::NotAvailable => None,
        }
    }
}

impl From<Option<u8>> for Metascore {
    fn from(value: Option<u8>) -> Self {
        value.map_or(Metascore::NotAvailable, Metascore::Scored)
    }
}

impl std::fmt::Display for Metascore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metascore::Scored(v) => write!(f, "{v}"),
            Metascore::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// One game as listed by the review aggregator. `title` is the upsert key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub title: String,
    pub release_date: Option<NaiveDate>,
    /// Age rating such as `M` or `E10+`; [`NOT_AVAILABLE`] when absent.
    pub content_rating: String,
    pub score: Metascore,
}

impl ScoreRecord {
    #[must_use]
    pub fn has_content_rating(&self) -> bool {
        self.content_rating != NOT_AVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metascore_displays_sentinel() {
        assert_eq!(Metascore::Scored(85).to_string(), "85");
        assert_eq!(Metascore::NotAvailable.to_string(), "N/A");
    }

    #[test]
    fn metascore_from_option() {
        assert_eq!(Metascore::from(Some(91)), Metascore::Scored(91));
        assert_eq!(Metascore::from(None), Metascore::NotAvailable);
        assert_eq!(Metascore::Scored(70).value(), Some(70));
        assert_eq!(Metascore::NotAvailable.value(), None);
    }
}
