//! Torrent page parser for nyaa.si
//!
//! A torrent page is one Bootstrap panel of labeled rows plus a footer
//! with the download links and a separate description block. Fields are
//! located by the panel's label/value structure rather than free text
//! search, since the label order is stable even when the row layout
//! shifts between categories.

use chrono::{DateTime, TimeZone, Utc};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::category::{Category, UnknownCategoryPolicy};
use crate::error::{NyaaError, Result};
use crate::types::Submitter;
use crate::url::absolutize;

/// Placeholder the site renders for an empty information field
const NO_INFORMATION: &str = "No information.";
/// Placeholder the site renders for an empty description
const NO_DESCRIPTION: &str = "#### No description.";

/// Everything parsed out of a single torrent page
///
/// Intermediate value; the orchestrator combines it with the resolved
/// ID/URL and the decoded `.torrent` file into a `NyaaRelease`.
#[derive(Debug, Clone, PartialEq)]
pub struct TorrentPage {
    pub title: String,
    pub category: Category,
    pub datetime: DateTime<Utc>,
    pub submitter: Option<Submitter>,
    pub information: Option<String>,
    pub seeders: u32,
    pub leechers: u32,
    pub completed: u32,
    pub size: u64,
    pub infohash: String,
    pub is_trusted: bool,
    pub is_remake: bool,
    pub description: Option<String>,
    pub torrent_url: String,
    pub magnet: String,
}

/// Parses a full torrent page.
///
/// A record is all-or-nothing: the first missing or malformed required
/// field aborts the parse with [`NyaaError::Parse`] carrying that
/// field's label.
pub fn parse_torrent_page(
    page_url: &Url,
    html: &str,
    policy: UnknownCategoryPolicy,
) -> Result<TorrentPage> {
    let document = Html::parse_document(html);

    let (panel, is_trusted, is_remake) = classify_panel(&document)?;
    let title = panel_title(panel)?;
    let (torrent_url, magnet) = footer_links(page_url, panel)?;

    let fields = PanelFields::collect(panel)?;

    Ok(TorrentPage {
        title,
        category: fields.category(policy)?,
        datetime: fields.datetime()?,
        submitter: fields.submitter(page_url)?,
        information: fields.information()?,
        seeders: fields.seeders()?,
        leechers: fields.leechers()?,
        completed: fields.completed()?,
        size: fields.size()?,
        infohash: fields.infohash()?,
        is_trusted,
        is_remake,
        description: description(&document)?,
        torrent_url,
        magnet,
    })
}

/// Finds the record panel and classifies its badge.
///
/// Trusted uploads use `panel-success` (green) and remakes
/// `panel-danger` (red); everything else is `panel-default`. Remake and
/// trusted are mutually exclusive at the page level, and remake wins
/// when the markup signals both, so the danger class is checked first.
fn classify_panel(document: &Html) -> Result<(ElementRef<'_>, bool, bool)> {
    if let Some(panel) = select_first(document, "div.panel.panel-danger")? {
        return Ok((panel, false, true));
    }
    if let Some(panel) = select_first(document, "div.panel.panel-success")? {
        return Ok((panel, true, false));
    }
    if let Some(panel) = select_first(document, "div.panel.panel-default")? {
        return Ok((panel, false, false));
    }

    Err(NyaaError::Parse("torrent panel".to_string()))
}

/// Title comes from the panel heading, not the document title, which
/// would need its site-name suffix stripped.
fn panel_title(panel: ElementRef<'_>) -> Result<String> {
    let selector = sel("div.panel-heading h3.panel-title")?;
    let heading = panel
        .select(&selector)
        .next()
        .ok_or_else(|| NyaaError::Parse("title".to_string()))?;

    Ok(collapsed_text(heading))
}

/// The footer holds two anchors, distinguished by `.torrent` suffix vs
/// `magnet:` scheme rather than by position.
fn footer_links(page_url: &Url, panel: ElementRef<'_>) -> Result<(String, String)> {
    let selector = sel("div.panel-footer a[href]")?;

    let mut torrent = None;
    let mut magnet = None;

    for anchor in panel.select(&selector) {
        if let Some(href) = anchor.value().attr("href") {
            if href.starts_with("magnet:") {
                magnet.get_or_insert_with(|| href.to_string());
            } else if href.split('?').next().unwrap_or(href).ends_with(".torrent") {
                torrent.get_or_insert(absolutize(page_url, href)?);
            }
        }
    }

    let torrent = torrent.ok_or_else(|| NyaaError::Parse("torrent download link".to_string()))?;
    let magnet = magnet.ok_or_else(|| NyaaError::Parse("magnet link".to_string()))?;
    Ok((torrent, magnet))
}

fn description(document: &Html) -> Result<Option<String>> {
    let block = select_first(document, "#torrent-description")?
        .ok_or_else(|| NyaaError::Parse("description".to_string()))?;

    Ok(optional_text(&text_of(block), NO_DESCRIPTION))
}

/// Safe accessor over the panel body's labeled rows
///
/// Collects the ordered "label cell → value cell" pairs once, then
/// serves typed per-field accessors. Each accessor fails independently
/// with [`NyaaError::Parse`] carrying its label, so the caller sees
/// exactly which slot was missing.
pub struct PanelFields<'a> {
    pairs: Vec<(String, ElementRef<'a>)>,
    body: ElementRef<'a>,
}

impl<'a> PanelFields<'a> {
    /// Walks the panel body rows and pairs each `col-md-1` label cell
    /// with the `col-md-5` value cell that follows it.
    pub fn collect(panel: ElementRef<'a>) -> Result<Self> {
        let body_sel = sel("div.panel-body")?;
        let body = panel
            .select(&body_sel)
            .next()
            .ok_or_else(|| NyaaError::Parse("panel body".to_string()))?;

        let cell_sel = sel("div.row > div")?;
        let mut pairs = Vec::new();
        let mut pending_label: Option<String> = None;

        for cell in body.select(&cell_sel) {
            if has_class(cell, "col-md-1") {
                pending_label = Some(collapsed_text(cell));
            } else if has_class(cell, "col-md-5") {
                if let Some(label) = pending_label.take() {
                    pairs.push((label, cell));
                }
            }
        }

        Ok(Self { pairs, body })
    }

    fn value(&self, label: &str) -> Result<ElementRef<'a>> {
        self.pairs
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, cell)| *cell)
            .ok_or_else(|| NyaaError::Parse(label.to_string()))
    }

    /// Category, resolved against the closed taxonomy
    pub fn category(&self, policy: UnknownCategoryPolicy) -> Result<Category> {
        let text = collapsed_text(self.value("Category:")?);
        match Category::from_name(&text) {
            Some(category) => Ok(category),
            None => match policy {
                UnknownCategoryPolicy::DefaultToAll => Ok(Category::All),
                UnknownCategoryPolicy::Fail => Err(NyaaError::Parse(format!(
                    "Category: unrecognized {text:?}"
                ))),
            },
        }
    }

    /// Submission time, taken from the machine-readable
    /// `data-timestamp` attribute rather than the locale-dependent
    /// display text
    pub fn datetime(&self) -> Result<DateTime<Utc>> {
        let cell = self.value("Date:")?;
        let timestamp = cell
            .value()
            .attr("data-timestamp")
            .ok_or_else(|| NyaaError::Parse("Date: missing data-timestamp".to_string()))?;

        let secs: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| NyaaError::Parse(format!("Date: bad timestamp {timestamp:?}")))?;

        Utc.timestamp_opt(secs, 0)
            .single()
            .ok_or_else(|| NyaaError::Parse(format!("Date: out of range timestamp {secs}")))
    }

    /// Submitter of the upload.
    ///
    /// The literal display name "Anonymous" is the site's sentinel for
    /// "no submitter" and yields `None`; it is never materialized as a
    /// `Submitter`. Trusted/banned flags come from the anchor's status
    /// annotation by case-insensitive substring match and are not
    /// mutually exclusive (a submitter can be a banned trusted user).
    pub fn submitter(&self, page_url: &Url) -> Result<Option<Submitter>> {
        let cell = self.value("Submitter:")?;
        let name = collapsed_text(cell);

        if name.eq_ignore_ascii_case("anonymous") {
            return Ok(None);
        }

        let anchor_sel = sel("a")?;
        let anchor = cell.select(&anchor_sel).next();

        let href = anchor
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string)
            .unwrap_or_else(|| format!("/user/{name}"));

        let status = anchor
            .and_then(|a| a.value().attr("title"))
            .map(str::to_lowercase)
            .unwrap_or_default();

        Ok(Some(Submitter {
            url: absolutize(page_url, &href)?,
            is_trusted: status.contains("trusted"),
            is_banned: status.contains("banned"),
            name,
        }))
    }

    pub fn seeders(&self) -> Result<u32> {
        self.count("Seeders:")
    }

    pub fn leechers(&self) -> Result<u32> {
        self.count("Leechers:")
    }

    pub fn completed(&self) -> Result<u32> {
        self.count("Completed:")
    }

    fn count(&self, label: &str) -> Result<u32> {
        let text = collapsed_text(self.value(label)?);
        text.parse()
            .map_err(|_| NyaaError::Parse(format!("{label} not a count: {text:?}")))
    }

    /// Information field; the placeholder text normalizes to `None`
    pub fn information(&self) -> Result<Option<String>> {
        let cell = self.value("Information:")?;
        Ok(optional_text(&text_of(cell), NO_INFORMATION))
    }

    /// Content size in bytes
    pub fn size(&self) -> Result<u64> {
        let text = collapsed_text(self.value("File size:")?);
        parse_size(&text)
    }

    /// Info hash, read from the `<kbd>` element.
    ///
    /// Located by structural position instead of its row label, which
    /// is not unique enough on its own.
    pub fn infohash(&self) -> Result<String> {
        let kbd_sel = sel("kbd")?;
        let hash = self
            .body
            .select(&kbd_sel)
            .next()
            .map(collapsed_text)
            .ok_or_else(|| NyaaError::Parse("Info hash:".to_string()))?;

        if hash.len() != 40 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(NyaaError::Parse(format!("Info hash: malformed {hash:?}")));
        }

        Ok(hash)
    }
}

/// Parses a `"{value} {unit}"` size into bytes.
///
/// Units are binary (powers of 1024). Fractional byte results round
/// up, so a size is never under-reported.
fn parse_size(text: &str) -> Result<u64> {
    let (value, unit) = text
        .rsplit_once(' ')
        .ok_or_else(|| NyaaError::Parse(format!("File size: malformed {text:?}")))?;

    let value: f64 = value
        .parse()
        .map_err(|_| NyaaError::Parse(format!("File size: bad value {text:?}")))?;

    let multiplier: f64 = match unit {
        "Bytes" => 1.0,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "TiB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        "PiB" => 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0,
        _ => {
            return Err(NyaaError::Parse(format!(
                "File size: unrecognized unit {unit:?}"
            )));
        }
    };

    if !(0.0..=u64::MAX as f64).contains(&value) {
        return Err(NyaaError::Parse(format!("File size: bad value {text:?}")));
    }

    Ok((value * multiplier).ceil() as u64)
}

fn sel(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| NyaaError::Parse(format!("invalid selector {selector:?}: {e:?}")))
}

fn select_first<'a>(document: &'a Html, selector: &str) -> Result<Option<ElementRef<'a>>> {
    let selector = sel(selector)?;
    Ok(document.select(&selector).next())
}

fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Text content with runs of whitespace collapsed to single spaces
fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text content, trimmed but with inner structure left intact
fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Sentinel-to-absence translation happens exactly once, here
fn optional_text(text: &str, placeholder: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == placeholder {
        None
    } else {
        Some(trimmed.to_string())
    }
}
