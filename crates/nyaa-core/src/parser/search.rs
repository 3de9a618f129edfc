//! Search results parser for nyaa.si
//!
//! A results listing yields two things: the result IDs in document
//! order (the site's relevance order, never re-sorted) and the extra
//! page numbers advertised by the pagination control.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::error::{NyaaError, Result};

/// Result links point at `/view/{id}`. Comment links on the same rows
/// carry a `#comments` fragment and so never match the anchored
/// pattern.
static VIEW_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/view/(\d+)$").expect("valid regex"));

/// One parsed results-listing page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchPage {
    /// Result IDs in document order
    pub ids: Vec<u64>,

    /// Additional page numbers advertised by the pagination control,
    /// excluding the current page and the prev/next controls. Empty
    /// when the listing fits on a single page.
    pub extra_pages: Vec<u32>,
}

/// Parses one search results page.
pub fn parse_search_results(html: &str) -> Result<SearchPage> {
    let document = Html::parse_document(html);

    let anchor_sel = selector("a[href]")?;
    let mut ids = Vec::new();
    for anchor in document.select(&anchor_sel) {
        if let Some(href) = anchor.value().attr("href")
            && let Some(captures) = VIEW_LINK.captures(href)
            && let Ok(id) = captures[1].parse::<u64>()
        {
            ids.push(id);
        }
    }

    let item_sel = selector("ul.pagination li")?;
    let link_sel = selector("a")?;
    let mut extra_pages = Vec::new();
    let mut seen = HashSet::new();
    for item in document.select(&item_sel) {
        if item.value().classes().any(|c| c == "active" || c == "disabled") {
            continue;
        }
        if let Some(link) = item.select(&link_sel).next()
            && let Ok(page) = link.text().collect::<String>().trim().parse::<u32>()
            && seen.insert(page)
        {
            extra_pages.push(page);
        }
    }

    Ok(SearchPage { ids, extra_pages })
}

fn selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| NyaaError::Parse(format!("invalid selector {s:?}: {e:?}")))
}
