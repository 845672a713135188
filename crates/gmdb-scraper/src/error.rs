use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    Store(#[from] gmdb_core::StoreError),
}

impl ScraperError {
    /// Network failures, 429 and 5xx responses.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ScraperError::Http(_) | ScraperError::RateLimited { .. } => true,
            ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Why a single list item or listing article could not be turned into a record.
///
/// These never abort a page: the caller drops the one item and logs it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("no bracketed platform code in \"{0}\"")]
    MissingPlatform(String),

    #[error("no title in \"{0}\"")]
    MissingTitle(String),

    #[error("no sales figures in \"{0}\"")]
    MissingSales(String),

    #[error("malformed article \"{heading}\": {reason}")]
    MalformedArticle { heading: String, reason: String },
}
