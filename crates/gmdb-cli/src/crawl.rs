//! Crawl command handlers.

use gmdb_core::{AppConfig, Store};
use gmdb_scraper::{
    run_bulletin_crawl, run_score_crawl, CrawlMode, CrawlSettings, PageFetcher,
    ScoreCrawlSettings,
};

/// Maps the mutually exclusive `crawl-bulletins` flags onto a mode.
///
/// No flag means the latest index page only.
pub(crate) fn crawl_mode(all_pages: bool, page: Option<u32>, poll: bool) -> CrawlMode {
    match (all_pages, page, poll) {
        (true, _, _) => CrawlMode::Full,
        (_, Some(n), _) => CrawlMode::Page(n),
        (_, None, true) => CrawlMode::Poll,
        (false, None, false) => CrawlMode::Latest,
    }
}

/// Runs one bulletin crawl and prints its summary as JSON.
///
/// # Errors
///
/// Returns an error if the fetcher cannot be built, page 1 cannot be
/// fetched, or the store rejects a read or write.
pub(crate) async fn run_bulletins<S: Store>(
    config: &AppConfig,
    store: &S,
    mode: CrawlMode,
) -> anyhow::Result<()> {
    let fetcher = PageFetcher::from_app_config(config)?;
    let settings = CrawlSettings::from_app_config(config);

    let summary = run_bulletin_crawl(&fetcher, store, &settings, mode).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Runs one score crawl and prints its summary as JSON.
///
/// # Errors
///
/// Returns an error if the fetcher cannot be built, the first listing page
/// cannot be fetched, or an upsert fails.
pub(crate) async fn run_scores<S: Store>(
    config: &AppConfig,
    store: &S,
    max_pages: Option<u32>,
) -> anyhow::Result<()> {
    let fetcher = PageFetcher::from_app_config(config)?;
    let mut settings = ScoreCrawlSettings::from_app_config(config);
    if let Some(max_pages) = max_pages {
        settings.max_pages = max_pages;
    }

    let summary = run_score_crawl(&fetcher, store, &settings).await?;
    if summary.truncated {
        tracing::warn!(
            pages_visited = summary.pages_visited,
            "score crawl stopped early on a failed page"
        );
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
