//! Bulletin detail page parsing.
//!
//! A detail page carries its figures in ordered lists inside the post body:
//! the first visible `<ol>` is the software chart and the second, when
//! present, the hardware chart. Lists hidden with `display: none` or the
//! `hidden` attribute are embeds or teasers, not sales lists.

use gmdb_core::{HardwareSale, SoftwareSale};
use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractionError;
use crate::extract::{normalize_whitespace, parse_hardware_entry, parse_software_item};

/// Everything extracted from one detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowSales {
    pub software: Vec<SoftwareSale>,
    pub hardware: Vec<HardwareSale>,
    /// Items that were dropped, in page order.
    pub warnings: Vec<ExtractionError>,
}

impl WindowSales {
    /// True when the page yielded neither a software nor a hardware record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.software.is_empty() && self.hardware.is_empty()
    }
}

/// Parses a bulletin detail page into its software and hardware charts.
///
/// Never fails: a page without lists yields an empty [`WindowSales`], and a
/// malformed item is recorded in `warnings` while the rest are kept.
#[must_use]
pub fn extract_window(html: &str) -> WindowSales {
    let document = Html::parse_document(html);
    let region = content_region(&document);

    let ol_selector = Selector::parse("ol").expect("valid selector");
    let mut lists = region.select(&ol_selector).filter(|ol| !is_hidden(*ol));

    let mut sales = WindowSales::default();

    if let Some(software_list) = lists.next() {
        for item in list_items(software_list) {
            let text = item.text().collect::<String>();
            let emphasis = emphasis_text(item);
            match parse_software_item(&text, emphasis.as_deref()) {
                Ok(sale) => sales.software.push(sale),
                Err(err) => sales.warnings.push(err),
            }
        }
    }

    if let Some(hardware_list) = lists.next() {
        for item in list_items(hardware_list) {
            let text = item.text().collect::<String>();
            match parse_hardware_entry(&text) {
                Ok(sale) => sales.hardware.push(sale),
                Err(err) => sales.warnings.push(err),
            }
        }
    }

    sales
}

/// The post body: `.entry-content`, else the first `<article>`, else the
/// whole document.
fn content_region(document: &Html) -> ElementRef<'_> {
    for css in [".entry-content", "article"] {
        let selector = Selector::parse(css).expect("valid selector");
        if let Some(region) = document.select(&selector).next() {
            return region;
        }
    }
    document.root_element()
}

/// Direct `<li>` children, so nested lists do not contribute extra rows.
fn list_items(list: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
}

fn emphasis_text(item: ElementRef<'_>) -> Option<String> {
    let selector = Selector::parse("em, i").expect("valid selector");
    let emphasized = item.select(&selector).next()?;
    let text = normalize_whitespace(&emphasized.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

/// A list is hidden when it or any ancestor suppresses display.
fn is_hidden(list: ElementRef<'_>) -> bool {
    std::iter::once(list)
        .chain(list.ancestors().filter_map(ElementRef::wrap))
        .any(|element| {
            let value = element.value();
            value.attr("hidden").is_some()
                || value.attr("style").is_some_and(|style| {
                    let compact: String = style
                        .chars()
                        .filter(|c| !c.is_whitespace())
                        .collect::<String>()
                        .to_ascii_lowercase();
                    compact.contains("display:none")
                })
        })
}
