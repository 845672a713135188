//! Bulletin crawl: listing walk, dedup check, detail extraction, persistence.
//!
//! The walk owns its discovered windows until it hands them to the persist
//! step. Fetching is strictly sequential and every request goes through the
//! [`PageFetcher`] pacer.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use gmdb_core::{BulletinWindow, Store, WindowKey};
use serde::Serialize;

use crate::client::{resolve_url, PageFetcher};
use crate::detail::extract_window;
use crate::error::ScraperError;
use crate::listing::{listing_page_url, parse_listing_page, ListingPage};

/// How far a bulletin crawl walks the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "page", rename_all = "snake_case")]
pub enum CrawlMode {
    /// Index page 1 only.
    Latest,
    /// One caller-chosen index page.
    Page(u32),
    /// Page 1, then 2..=N as advertised by the pagination block.
    Full,
    /// Page 1; if nothing on it is new, back off once and look again.
    Poll,
}

impl std::fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrawlMode::Latest => f.write_str("latest"),
            CrawlMode::Page(n) => write!(f, "page {n}"),
            CrawlMode::Full => f.write_str("full"),
            CrawlMode::Poll => f.write_str("poll"),
        }
    }
}

/// Source location and timing for a bulletin crawl.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub base_url: String,
    /// Single long sleep taken by [`CrawlMode::Poll`] when page 1 has nothing new.
    pub caught_up_backoff: Duration,
}

impl CrawlSettings {
    #[must_use]
    pub fn from_app_config(config: &gmdb_core::AppConfig) -> Self {
        Self {
            base_url: config.bulletin_base_url.clone(),
            caught_up_backoff: Duration::from_secs(config.bulletin_caught_up_backoff_secs),
        }
    }
}

/// Counters for one bulletin crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulletinRunSummary {
    pub pages_visited: u32,
    pub articles_seen: u32,
    /// Already in the store; detail page not fetched.
    pub skipped_known: u32,
    /// Seen earlier in the same run.
    pub skipped_repeat: u32,
    pub malformed_articles: u32,
    pub failed_details: u32,
    /// Detail pages with neither list; not stored so a later crawl retries them.
    pub empty_details: u32,
    pub item_warnings: u32,
    /// Listing pages after the first that could not be fetched.
    pub failed_pages: u32,
    pub backed_off: bool,
    pub inserted: u32,
}

/// Walks the bulletin index per `mode` and stores every unseen window.
///
/// # Errors
///
/// - [`ScraperError`] fetch variants when page 1 (or the poll refetch of
///   page 1) cannot be fetched.
/// - [`ScraperError::Store`] when the dedup lookup or an insert fails.
///
/// Failures on later index pages and on detail pages are logged, counted in
/// the summary and skipped.
pub async fn run_bulletin_crawl<S: Store>(
    fetcher: &PageFetcher,
    store: &S,
    settings: &CrawlSettings,
    mode: CrawlMode,
) -> Result<BulletinRunSummary, ScraperError> {
    tracing::info!(%mode, base_url = %settings.base_url, "bulletin crawl starting");

    let mut walk = Walk::new(fetcher, store, settings);

    let first_page = match mode {
        CrawlMode::Page(n) => n.max(1),
        CrawlMode::Latest | CrawlMode::Full | CrawlMode::Poll => 1,
    };
    let listing = walk.fetch_listing(first_page).await?;
    let new_on_first = walk.visit(first_page, &listing).await?;

    match mode {
        CrawlMode::Full => {
            let last_page = listing.last_page.unwrap_or(1);
            for page in 2..=last_page {
                match walk.fetch_listing(page).await {
                    Ok(listing) => {
                        walk.visit(page, &listing).await?;
                    }
                    Err(e) => {
                        walk.summary.failed_pages += 1;
                        tracing::warn!(page, error = %e, "listing page fetch failed, skipping");
                    }
                }
            }
        }
        CrawlMode::Poll if new_on_first == 0 => {
            tracing::info!(
                backoff_secs = settings.caught_up_backoff.as_secs(),
                "no new bulletins on page 1, backing off once before rechecking"
            );
            walk.summary.backed_off = true;
            tokio::time::sleep(settings.caught_up_backoff).await;
            let listing = walk.fetch_listing(1).await?;
            walk.visit(1, &listing).await?;
        }
        CrawlMode::Latest | CrawlMode::Page(_) | CrawlMode::Poll => {}
    }

    let (windows, mut summary) = walk.finish();
    summary.inserted = persist_windows(store, windows).await?;

    tracing::info!(
        %mode,
        pages = summary.pages_visited,
        articles = summary.articles_seen,
        skipped_known = summary.skipped_known,
        malformed = summary.malformed_articles,
        failed_details = summary.failed_details,
        inserted = summary.inserted,
        "bulletin crawl finished"
    );
    Ok(summary)
}

/// In-progress crawl state.
struct Walk<'a, S> {
    fetcher: &'a PageFetcher,
    store: &'a S,
    settings: &'a CrawlSettings,
    seen: HashSet<WindowKey>,
    windows: Vec<BulletinWindow>,
    summary: BulletinRunSummary,
}

impl<'a, S: Store> Walk<'a, S> {
    fn new(fetcher: &'a PageFetcher, store: &'a S, settings: &'a CrawlSettings) -> Self {
        Self {
            fetcher,
            store,
            settings,
            seen: HashSet::new(),
            windows: Vec::new(),
            summary: BulletinRunSummary::default(),
        }
    }

    async fn fetch_listing(&mut self, page: u32) -> Result<ListingPage, ScraperError> {
        let url = listing_page_url(&self.settings.base_url, page);
        let html = self.fetcher.fetch_html(&url).await?;
        self.summary.pages_visited += 1;
        Ok(parse_listing_page(&html))
    }

    /// Processes one parsed index page. Returns how many articles were new,
    /// i.e. neither stored nor already handled in this run.
    async fn visit(&mut self, page: u32, listing: &ListingPage) -> Result<u32, ScraperError> {
        for err in &listing.malformed {
            self.summary.malformed_articles += 1;
            tracing::warn!(page, error = %err, "skipping malformed article");
        }

        let mut new_articles = 0;
        for article in &listing.articles {
            self.summary.articles_seen += 1;
            let key = &article.key;

            if self.seen.contains(key) {
                self.summary.skipped_repeat += 1;
                tracing::debug!(%key, "article already handled in this run");
                continue;
            }
            self.seen.insert(key.clone());

            if self.store.find_window(key).await?.is_some() {
                self.summary.skipped_known += 1;
                tracing::debug!(%key, "window already stored, skipping detail fetch");
                continue;
            }

            new_articles += 1;
            if let Some(window) = self.fetch_window(key).await {
                self.windows.push(window);
            }
        }

        Ok(new_articles)
    }

    /// Fetches and parses one detail page. `None` when it failed or was empty.
    async fn fetch_window(&mut self, key: &WindowKey) -> Option<BulletinWindow> {
        let html = match resolve_url(&self.settings.base_url, &key.link) {
            Ok(url) => self.fetcher.fetch_html(&url).await,
            Err(e) => Err(e),
        };
        let html = match html {
            Ok(html) => html,
            Err(e) => {
                self.summary.failed_details += 1;
                tracing::warn!(%key, error = %e, "detail page fetch failed, skipping");
                return None;
            }
        };

        let sales = extract_window(&html);
        for warning in &sales.warnings {
            tracing::warn!(link = %key.link, error = %warning, "dropping unparsable list item");
        }
        self.summary.item_warnings += u32::try_from(sales.warnings.len()).unwrap_or(u32::MAX);

        if sales.is_empty() {
            self.summary.empty_details += 1;
            tracing::warn!(%key, "detail page has no sales lists, not storing");
            return None;
        }

        tracing::debug!(
            %key,
            software = sales.software.len(),
            hardware = sales.hardware.len(),
            "extracted bulletin window"
        );
        Some(BulletinWindow {
            link: key.link.clone(),
            start_date: key.start_date,
            end_date: key.end_date,
            software_sales: sales.software,
            hardware_sales: sales.hardware,
            ingested_at: Utc::now(),
        })
    }

    fn finish(self) -> (Vec<BulletinWindow>, BulletinRunSummary) {
        (self.windows, self.summary)
    }
}

/// Inserts each window, re-checking the ledger so a concurrent run that got
/// there first is not treated as a failure.
async fn persist_windows<S: Store>(
    store: &S,
    windows: Vec<BulletinWindow>,
) -> Result<u32, ScraperError> {
    let mut inserted = 0;
    for window in windows {
        let key = window.key();
        if store.find_window(&key).await?.is_some() {
            tracing::info!(%key, "window stored by another run, skipping insert");
            continue;
        }
        store.insert_window(&window).await?;
        inserted += 1;
        tracing::info!(
            %key,
            software = window.software_sales.len(),
            hardware = window.hardware_sales.len(),
            "stored bulletin window"
        );
    }
    Ok(inserted)
}
