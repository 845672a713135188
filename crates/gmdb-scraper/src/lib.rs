pub mod client;
pub mod detail;
pub mod error;
pub mod extract;
pub mod listing;
mod rate_limit;
pub mod reviews;
pub mod walker;

pub use client::{resolve_url, PageFetcher};
pub use detail::{extract_window, WindowSales};
pub use error::{ExtractionError, ScraperError};
pub use extract::{classify_figures, parse_hardware_entry, parse_software_entry, SalesFigures};
pub use listing::{parse_listing_page, ArticleSummary, ListingPage};
pub use reviews::{extract_listing_page, run_score_crawl, ScoreCrawlSettings, ScoreRunSummary};
pub use walker::{run_bulletin_crawl, BulletinRunSummary, CrawlMode, CrawlSettings};
