//! Bulletin index pages: article discovery and pagination.

use std::sync::LazyLock;

use chrono::NaiveDate;
use gmdb_core::WindowKey;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractionError;
use crate::extract::{normalize_whitespace, parse_short_date, parse_units};

static DATE_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2}/\d{1,2}/\d{2,4})\s*[–—-]\s*(\d{1,2}/\d{1,2}/\d{2,4})")
        .expect("valid date range regex")
});

/// One article teaser on an index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSummary {
    /// Dedup key. `link` is the href exactly as the index printed it.
    pub key: WindowKey,
    pub heading: String,
}

/// Parsed index page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub articles: Vec<ArticleSummary>,
    /// Articles whose anchor or heading could not be used.
    pub malformed: Vec<ExtractionError>,
    /// Highest page number advertised by the pagination block.
    pub last_page: Option<u32>,
}

/// Extracts the article teasers and the pagination bound from an index page.
#[must_use]
pub fn parse_listing_page(html: &str) -> ListingPage {
    let document = Html::parse_document(html);
    let article_selector = Selector::parse("article.gematsu-post").expect("valid selector");

    let mut page = ListingPage {
        last_page: last_page_number(&document),
        ..ListingPage::default()
    };

    for article in document.select(&article_selector) {
        match parse_article(article) {
            Ok(summary) => page.articles.push(summary),
            Err(err) => page.malformed.push(err),
        }
    }

    page
}

fn parse_article(article: ElementRef<'_>) -> Result<ArticleSummary, ExtractionError> {
    let anchor_selector = Selector::parse("h2 a").expect("valid selector");
    let Some(anchor) = article.select(&anchor_selector).next() else {
        return Err(ExtractionError::MalformedArticle {
            heading: normalize_whitespace(&article.text().collect::<String>()),
            reason: "no heading link".to_string(),
        });
    };

    let heading = normalize_whitespace(&anchor.text().collect::<String>());
    let href = anchor
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .ok_or_else(|| ExtractionError::MalformedArticle {
            heading: heading.clone(),
            reason: "heading link has no href".to_string(),
        })?;

    let (start_date, end_date) = parse_date_range(&heading)?;
    let key = WindowKey::new(href, start_date, end_date).map_err(|e| {
        ExtractionError::MalformedArticle {
            heading: heading.clone(),
            reason: e.to_string(),
        }
    })?;

    Ok(ArticleSummary { key, heading })
}

/// Parses the `M/D/YY – M/D/YY` range out of a heading such as
/// `Famitsu Sales: 3/16/20 – 3/22/20 [Update]`.
///
/// # Errors
///
/// Returns [`ExtractionError::MalformedArticle`] when no range is present or
/// either endpoint is not a calendar date.
pub fn parse_date_range(heading: &str) -> Result<(NaiveDate, NaiveDate), ExtractionError> {
    let malformed = |reason: &str| ExtractionError::MalformedArticle {
        heading: heading.to_string(),
        reason: reason.to_string(),
    };

    let caps = DATE_RANGE_RE
        .captures(heading)
        .ok_or_else(|| malformed("no date range"))?;
    let start = parse_short_date(&caps[1]).ok_or_else(|| malformed("invalid start date"))?;
    let end = parse_short_date(&caps[2]).ok_or_else(|| malformed("invalid end date"))?;
    Ok((start, end))
}

/// The largest numeric label among the pagination links.
fn last_page_number(document: &Html) -> Option<u32> {
    let selector =
        Selector::parse("div.gematsu-pagination a.page-numbers").expect("valid selector");
    document
        .select(&selector)
        .filter_map(|link| parse_units(&link.text().collect::<String>()))
        .filter_map(|n| u32::try_from(n).ok())
        .max()
}

/// URL of index page `page`. Page 1 is the base URL itself.
#[must_use]
pub fn listing_page_url(base_url: &str, page: u32) -> String {
    if page <= 1 {
        base_url.to_string()
    } else {
        format!("{}/page/{page}", base_url.trim_end_matches('/'))
    }
}
