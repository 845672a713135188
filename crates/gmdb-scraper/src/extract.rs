//! Text extraction for individual bulletin list items.
//!
//! A software line looks like
//!
//! ```text
//! [NSW] Animal Crossing (Nintendo, 3/20/20) – 1,065,000 (New)
//! [PS4] Final Fantasy VII Remake (Square Enix, 4/10/20) – 45,230 (812,500)
//! ```
//!
//! and a hardware line like `Switch – 236,588 (17,456,321)`. Everything here
//! is pure: no I/O, no HTML. The detail parser hands over the item's rendered
//! text plus, when the markup had one, the emphasized span holding the title.
//!
//! Sub-field failures (publisher, release date) degrade to `None`. Only a
//! missing platform, title or sales-figure group rejects the whole item.

use std::sync::LazyLock;

use chrono::NaiveDate;
use gmdb_core::{HardwareSale, SoftwareSale};
use regex::Regex;

use crate::error::ExtractionError;

static PLATFORM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\p{L}\[]*\[\s*([^\]]+?)\s*\]").expect("valid platform regex"));

static SHORT_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{2}|\d{4})\b").expect("valid short date regex")
});

static FIGURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,3}(?:[,.'\u{2009}\u{202F}]\d{3})+|\d+").expect("valid figure regex")
});

static NEW_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bnew\b").expect("valid new-marker regex"));

const DASHES: [char; 3] = ['–', '—', '-'];

/// Classified sales-figure group of one list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesFigures {
    /// First week on sale: one figure, which is both weekly and lifetime.
    New { units: u64 },
    /// A weekly figure and, when printed, a lifetime total.
    Continuing { weekly: u64, lifetime: Option<u64> },
}

impl SalesFigures {
    #[must_use]
    pub fn weekly(self) -> u64 {
        match self {
            SalesFigures::New { units } => units,
            SalesFigures::Continuing { weekly, .. } => weekly,
        }
    }

    #[must_use]
    pub fn lifetime(self) -> Option<u64> {
        match self {
            SalesFigures::New { units } => Some(units),
            SalesFigures::Continuing { lifetime, .. } => lifetime,
        }
    }
}

/// Classifies a sales-figure group such as `1,065,000 (New)` or
/// `45,230 (812,500)`.
///
/// A "new" marker anywhere in the group selects [`SalesFigures::New`] with the
/// first figure. Otherwise the first figure is weekly and the second, if any,
/// lifetime. Returns `None` when the group holds no figure at all, or a
/// figure that does not fit in `u64`.
#[must_use]
pub fn classify_figures(group: &str) -> Option<SalesFigures> {
    let figures = FIGURE_RE
        .find_iter(group)
        .map(|m| parse_units(m.as_str()))
        .collect::<Option<Vec<u64>>>()?;
    let mut figures = figures.into_iter();
    let first = figures.next()?;

    if NEW_MARKER_RE.is_match(group) {
        return Some(SalesFigures::New { units: first });
    }

    Some(SalesFigures::Continuing {
        weekly: first,
        lifetime: figures.next(),
    })
}

/// Parses a locale-formatted unit count: `"1,234"` → `1234`.
///
/// Grouping separators (`,` `.` `'` thin spaces) are dropped. Returns `None`
/// if anything other than digits and separators remains.
#[must_use]
pub fn parse_units(raw: &str) -> Option<u64> {
    let digits: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '.' | '\'' | '\u{2009}' | '\u{202F}' | ' '))
        .collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok()
}

/// Parses the first `M/D/YY` (or `M/D/YYYY`) token in `text`.
///
/// Two-digit years `00..=69` map to 20xx and `70..=99` to 19xx.
#[must_use]
pub fn parse_short_date(text: &str) -> Option<NaiveDate> {
    let caps = SHORT_DATE_RE.captures(text)?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    let year_raw = &caps[3];
    let mut year: i32 = year_raw.parse().ok()?;
    if year_raw.len() == 2 {
        year += if year < 70 { 2000 } else { 1900 };
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses one software line from its plain rendered text.
///
/// # Errors
///
/// Returns [`ExtractionError`] when the platform code, the title or the
/// sales-figure group cannot be located.
pub fn parse_software_entry(raw_text: &str) -> Result<SoftwareSale, ExtractionError> {
    parse_software_item(raw_text, None)
}

/// Parses one software line, using `emphasis` as the title when the markup
/// had an emphasized span.
///
/// # Errors
///
/// Returns [`ExtractionError`] when the platform code, the title or the
/// sales-figure group cannot be located.
pub fn parse_software_item(
    raw_text: &str,
    emphasis: Option<&str>,
) -> Result<SoftwareSale, ExtractionError> {
    let text = normalize_whitespace(raw_text);

    let caps = PLATFORM_RE
        .captures(&text)
        .ok_or_else(|| ExtractionError::MissingPlatform(text.clone()))?;
    let platform = caps[1].to_string();
    let after_platform = &text[caps.get(0).map_or(0, |m| m.end())..];

    let (head, figures_group) = split_sales_group(after_platform)
        .ok_or_else(|| ExtractionError::MissingSales(text.clone()))?;
    let figures =
        classify_figures(figures_group).ok_or_else(|| ExtractionError::MissingSales(text.clone()))?;

    // Emphasis inside the figures group (e.g. an italic "New") is not a title.
    let emphasis = emphasis
        .map(normalize_whitespace)
        .filter(|e| !e.is_empty() && head.contains(e.as_str()));

    let (title, clause) = match emphasis {
        Some(title) => {
            let tail = head
                .find(title.as_str())
                .map_or(head, |pos| &head[pos + title.len()..]);
            (title, first_parenthesized(tail))
        }
        None => split_trailing_clause(head),
    };

    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(ExtractionError::MissingTitle(text));
    }

    let (publisher, release_date) = clause.map_or((None, None), parse_publisher_clause);

    Ok(SoftwareSale {
        platform,
        title,
        publisher,
        release_date,
        weekly_units: Some(figures.weekly()),
        lifetime_units: figures.lifetime(),
    })
}

/// Parses one hardware line such as `Switch – 236,588 (17,456,321)`.
///
/// # Errors
///
/// Returns [`ExtractionError::MissingPlatform`] when nothing precedes the
/// figures, or [`ExtractionError::MissingSales`] when no figure is present.
pub fn parse_hardware_entry(raw_text: &str) -> Result<HardwareSale, ExtractionError> {
    let text = normalize_whitespace(raw_text);

    let (head, figures_group) =
        split_sales_group(&text).ok_or_else(|| ExtractionError::MissingSales(text.clone()))?;
    let figures =
        classify_figures(figures_group).ok_or_else(|| ExtractionError::MissingSales(text.clone()))?;

    let head = head.trim();
    let platform = head
        .strip_prefix('[')
        .and_then(|p| p.strip_suffix(']'))
        .unwrap_or(head)
        .trim()
        .to_string();
    if platform.is_empty() {
        return Err(ExtractionError::MissingPlatform(text));
    }

    Ok(HardwareSale {
        platform,
        weekly_units: Some(figures.weekly()),
        lifetime_units: figures.lifetime(),
    })
}

/// Collapses runs of whitespace (including non-breaking spaces) to one space.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits `text` at the last spaced dash whose tail carries a figure or a
/// "new" marker. Returns `(head, figures_group)`.
fn split_sales_group(text: &str) -> Option<(&str, &str)> {
    let mut candidates = text
        .char_indices()
        .filter(|&(idx, c)| {
            DASHES.contains(&c) && (idx == 0 || text[..idx].ends_with(char::is_whitespace))
        })
        .collect::<Vec<_>>();

    while let Some((idx, dash)) = candidates.pop() {
        let tail = text[idx + dash.len_utf8()..].trim();
        if tail.bytes().any(|b| b.is_ascii_digit()) || NEW_MARKER_RE.is_match(tail) {
            return Some((text[..idx].trim_end(), tail));
        }
    }
    None
}

/// Splits `Title (Publisher, 3/20/20)` into the title and the contents of the
/// trailing parenthesized clause.
fn split_trailing_clause(head: &str) -> (String, Option<&str>) {
    let trimmed = head.trim_end();
    if !trimmed.ends_with(')') {
        return (trimmed.to_string(), None);
    }

    let mut depth = 0usize;
    for (idx, c) in trimmed.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let inner = &trimmed[idx + 1..trimmed.len() - 1];
                    return (trimmed[..idx].trim_end().to_string(), Some(inner));
                }
            }
            _ => {}
        }
    }

    (trimmed.to_string(), None)
}

/// Contents of the first `( ... )` group in `text`.
fn first_parenthesized(text: &str) -> Option<&str> {
    let open = text.find('(')?;
    let close = text[open..].find(')')? + open;
    Some(&text[open + 1..close])
}

/// Parses `Publisher, 3/20/20` into its parts. Either part may be absent.
fn parse_publisher_clause(clause: &str) -> (Option<String>, Option<NaiveDate>) {
    let clause = clause.trim();
    let (publisher_part, date_part) = match clause.rsplit_once(',') {
        Some((before, after)) if looks_like_date_token(after) => (before, Some(after)),
        _ if looks_like_date_token(clause) => ("", Some(clause)),
        _ => (clause, None),
    };

    let release_date = date_part.and_then(|token| {
        let parsed = parse_short_date(token);
        if parsed.is_none() {
            tracing::debug!(token = token.trim(), "release date token unparsable");
        }
        parsed
    });

    let publisher = Some(publisher_part.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    (publisher, release_date)
}

fn looks_like_date_token(segment: &str) -> bool {
    let segment = segment.trim();
    !segment.is_empty()
        && segment.contains('/')
        && segment
            .chars()
            .all(|c| c.is_ascii_digit() || c == '/' || c == '?')
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
