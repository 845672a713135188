//! Review-aggregator listing: card extraction and the score crawl.

use std::sync::LazyLock;

use chrono::NaiveDate;
use gmdb_core::{Metascore, ScoreRecord, Store, NOT_AVAILABLE};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::client::PageFetcher;
use crate::error::ScraperError;
use crate::extract::normalize_whitespace;

static ORDINAL_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s*").expect("valid ordinal regex"));

const RATING_LABEL: &str = "Rated ";

/// Where and how far the score crawl walks.
#[derive(Debug, Clone)]
pub struct ScoreCrawlSettings {
    pub base_url: String,
    pub max_pages: u32,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
}

impl ScoreCrawlSettings {
    #[must_use]
    pub fn from_app_config(config: &gmdb_core::AppConfig) -> Self {
        Self {
            base_url: config.review_base_url.clone(),
            max_pages: config.review_max_pages,
            year_min: config.review_year_min,
            year_max: config.review_year_max,
        }
    }
}

/// Counters for one score crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreRunSummary {
    pub pages_visited: u32,
    pub cards_parsed: u32,
    /// Upsert writes performed; a title listed twice is written twice, last wins.
    pub upserted: u32,
    /// The walk stopped on a page fetch failure rather than an empty page.
    pub truncated: bool,
}

/// Extracts one [`ScoreRecord`] per product card.
///
/// Cards without a title are dropped. Every other field degrades to `None`
/// or [`NOT_AVAILABLE`] on its own.
#[must_use]
pub fn extract_listing_page(html: &str) -> Vec<ScoreRecord> {
    let document = Html::parse_document(html);
    let card_selector = Selector::parse("div.c-finderProductCard").expect("valid selector");

    document
        .select(&card_selector)
        .filter_map(|card| {
            let record = parse_card(card);
            if record.is_none() {
                tracing::warn!("dropping review card without a title");
            }
            record
        })
        .collect()
}

fn parse_card(card: ElementRef<'_>) -> Option<ScoreRecord> {
    let title_selector =
        Selector::parse("h3.c-finderProductCard_titleHeading").expect("valid selector");
    let meta_selector = Selector::parse("div.c-finderProductCard_meta").expect("valid selector");
    let score_selector = Selector::parse(".c-siteReviewScore").expect("valid selector");

    let heading = card.select(&title_selector).next()?;
    let title = strip_ordinal(&normalize_whitespace(&heading.text().collect::<String>()));
    if title.is_empty() {
        return None;
    }

    let segments: Vec<String> = card
        .select(&meta_selector)
        .next()
        .map(meta_segments)
        .unwrap_or_default();
    let release_date = segments.first().and_then(|s| parse_release_date(s));
    let content_rating = segments
        .last()
        .and_then(|s| parse_content_rating(s))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let score = card
        .select(&score_selector)
        .next()
        .and_then(|badge| parse_score(&badge.text().collect::<String>()))
        .into();

    Some(ScoreRecord {
        title,
        release_date,
        content_rating,
        score,
    })
}

/// Non-empty lines of the metadata block, bullets removed.
fn meta_segments(meta: ElementRef<'_>) -> Vec<String> {
    meta.text()
        .flat_map(str::lines)
        .map(normalize_whitespace)
        .filter(|s| !s.is_empty() && s != "•")
        .collect()
}

/// Removes a leading rank such as `12. `.
#[must_use]
pub fn strip_ordinal(title: &str) -> String {
    ORDINAL_PREFIX_RE.replace(title, "").trim().to_string()
}

/// Parses `Feb 28, 2025`.
#[must_use]
pub fn parse_release_date(segment: &str) -> Option<NaiveDate> {
    let parsed = NaiveDate::parse_from_str(segment.trim(), "%b %d, %Y").ok();
    if parsed.is_none() {
        tracing::debug!(segment, "review release date unparsable");
    }
    parsed
}

/// Parses `Rated M` into `M`.
#[must_use]
pub fn parse_content_rating(segment: &str) -> Option<String> {
    segment
        .trim()
        .strip_prefix(RATING_LABEL)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}

/// Parses a 0..=100 badge value. `tbd` and anything else yield `None`.
#[must_use]
pub fn parse_score(raw: &str) -> Option<u8> {
    raw.trim().parse::<u8>().ok().filter(|v| *v <= 100)
}

/// URL of listing page `page`, with the optional release-year bounds.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if `base_url` does not parse.
pub fn review_page_url(
    base_url: &str,
    page: u32,
    year_min: Option<i32>,
    year_max: Option<i32>,
) -> Result<String, ScraperError> {
    let mut url = reqwest::Url::parse(base_url).map_err(|e| ScraperError::InvalidUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    {
        let mut query = url.query_pairs_mut();
        if let Some(min) = year_min {
            query.append_pair("releaseYearMin", &min.to_string());
        }
        if let Some(max) = year_max {
            query.append_pair("releaseYearMax", &max.to_string());
        }
        query.append_pair("page", &page.to_string());
    }
    Ok(url.into())
}

/// Walks listing pages `1..=max_pages` until one has no cards, then upserts
/// every record by title.
///
/// # Errors
///
/// - [`ScraperError`] fetch variants when page 1 cannot be fetched.
/// - [`ScraperError::Store`] when an upsert fails.
///
/// A fetch failure on a later page ends the walk; what was collected so far
/// is still stored.
pub async fn run_score_crawl<S: Store>(
    fetcher: &PageFetcher,
    store: &S,
    settings: &ScoreCrawlSettings,
) -> Result<ScoreRunSummary, ScraperError> {
    tracing::info!(base_url = %settings.base_url, max_pages = settings.max_pages, "score crawl starting");

    let mut summary = ScoreRunSummary::default();
    let mut records = Vec::new();

    for page in 1..=settings.max_pages.max(1) {
        let url = review_page_url(
            &settings.base_url,
            page,
            settings.year_min,
            settings.year_max,
        )?;
        let html = match fetcher.fetch_html(&url).await {
            Ok(html) => html,
            Err(e) if page == 1 => return Err(e),
            Err(e) => {
                summary.truncated = true;
                tracing::warn!(page, error = %e, "review page fetch failed, ending walk");
                break;
            }
        };
        summary.pages_visited += 1;

        let cards = extract_listing_page(&html);
        tracing::debug!(page, cards = cards.len(), "parsed review page");
        if cards.is_empty() {
            break;
        }
        summary.cards_parsed += u32::try_from(cards.len()).unwrap_or(u32::MAX);
        records.extend(cards);
    }

    for record in &records {
        store.upsert_score(record).await?;
        summary.upserted += 1;
    }

    tracing::info!(
        pages = summary.pages_visited,
        cards = summary.cards_parsed,
        upserted = summary.upserted,
        "score crawl finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div class="c-finderProductCard c-finderProductCard-game">
          <h3 class="c-finderProductCard_titleHeading"><span>1.</span> <span>Elden Ring</span></h3>
          <div class="c-finderProductCard_meta">
            <span class="u-text-uppercase">Feb 25, 2022</span>
            <span>•</span>
            <span>Rated M</span>
          </div>
          <div class="c-siteReviewScore c-siteReviewScore_green"><span>96</span></div>
        </div>
        <div class="c-finderProductCard c-finderProductCard-game">
          <h3 class="c-finderProductCard_titleHeading">2. Indie Thing</h3>
          <div class="c-finderProductCard_meta">
            Coming soon
          </div>
          <div class="c-siteReviewScore"><span>tbd</span></div>
        </div>
        <div class="c-finderProductCard c-finderProductCard-game">
          <h3 class="c-finderProductCard_titleHeading">3. No Badge</h3>
          <div class="c-finderProductCard_meta">Mar 1, 2024
            Rated E10+</div>
        </div>
        <div class="c-finderProductCard"><p>ad slot</p></div>
    "#;

    #[test]
    fn extracts_full_card() {
        let records = extract_listing_page(PAGE);
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            ScoreRecord {
                title: "Elden Ring".to_string(),
                release_date: NaiveDate::from_ymd_opt(2022, 2, 25),
                content_rating: "M".to_string(),
                score: Metascore::Scored(96),
            }
        );
    }

    #[test]
    fn missing_fields_degrade_individually() {
        let records = extract_listing_page(PAGE);
        let indie = &records[1];
        assert_eq!(indie.title, "Indie Thing");
        assert_eq!(indie.release_date, None);
        assert_eq!(indie.content_rating, NOT_AVAILABLE);
        assert_eq!(indie.score, Metascore::NotAvailable);

        let no_badge = &records[2];
        assert_eq!(no_badge.release_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(no_badge.content_rating, "E10+");
        assert_eq!(no_badge.score, Metascore::NotAvailable);
    }

    #[test]
    fn empty_page_has_no_records() {
        assert!(extract_listing_page("<main><p>No results</p></main>").is_empty());
    }

    #[test]
    fn ordinal_prefix_removed_only_at_start() {
        assert_eq!(strip_ordinal("12. Persona 5"), "Persona 5");
        assert_eq!(strip_ordinal("Persona 5"), "Persona 5");
        assert_eq!(strip_ordinal("2. 1942. Remake"), "1942. Remake");
    }

    #[test]
    fn score_bounds() {
        assert_eq!(parse_score(" 85 "), Some(85));
        assert_eq!(parse_score("100"), Some(100));
        assert_eq!(parse_score("101"), None);
        assert_eq!(parse_score("tbd"), None);
    }

    #[test]
    fn content_rating_requires_label() {
        assert_eq!(parse_content_rating("Rated T"), Some("T".to_string()));
        assert_eq!(parse_content_rating("Feb 25, 2022"), None);
        assert_eq!(parse_content_rating("Rated "), None);
    }

    #[test]
    fn page_url_carries_page_and_year_bounds() {
        let url = review_page_url(
            "https://www.metacritic.com/browse/game/?platform=ps5",
            3,
            Some(2023),
            Some(2024),
        )
        .unwrap();
        assert_eq!(
            url,
            "https://www.metacritic.com/browse/game/?platform=ps5&releaseYearMin=2023&releaseYearMax=2024&page=3"
        );
    }

    #[test]
    fn page_url_without_year_bounds() {
        let url = review_page_url("http://127.0.0.1:9/browse", 1, None, None).unwrap();
        assert_eq!(url, "http://127.0.0.1:9/browse?page=1");
    }
}
