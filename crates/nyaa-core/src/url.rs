//! URL helpers for nyaa.si
//!
//! Resolves caller-supplied page references (numeric ID or full URL)
//! to canonical page URLs and builds search URLs.

use url::Url;

use crate::error::{NyaaError, Result};
use crate::types::SearchOptions;

/// Default base URL of the site
pub const DEFAULT_BASE_URL: &str = "https://nyaa.si/";

/// A reference to a torrent page: either the numeric ID or a full URL
/// whose path ends in `/{digits}` (a trailing slash is tolerated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRef {
    Id(u64),
    Url(String),
}

impl From<u64> for PageRef {
    fn from(id: u64) -> Self {
        PageRef::Id(id)
    }
}

impl From<u32> for PageRef {
    fn from(id: u32) -> Self {
        PageRef::Id(id.into())
    }
}

impl From<&str> for PageRef {
    fn from(url: &str) -> Self {
        PageRef::Url(url.to_string())
    }
}

impl From<String> for PageRef {
    fn from(url: String) -> Self {
        PageRef::Url(url)
    }
}

/// Builds the canonical page URL for a numeric ID
pub fn view_url(base: &Url, id: u64) -> Result<Url> {
    base.join(&format!("/view/{id}"))
        .map_err(|e| NyaaError::Validation(format!("cannot build view URL: {e}")))
}

/// Resolves a page reference to its numeric ID and canonical URL.
///
/// # Errors
/// Returns `Validation` if the URL cannot be parsed or its trailing
/// path segment is not numeric. No network I/O is performed.
pub fn resolve_page(base: &Url, page: &PageRef) -> Result<(u64, Url)> {
    match page {
        PageRef::Id(id) => Ok((*id, view_url(base, *id)?)),
        PageRef::Url(raw) => {
            let url = Url::parse(raw)
                .map_err(|e| NyaaError::Validation(format!("invalid page URL {raw:?}: {e}")))?;

            let segment = url
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
                .ok_or_else(|| {
                    NyaaError::Validation(format!("page URL {raw:?} has no path segments"))
                })?;

            let id: u64 = segment.parse().map_err(|_| {
                NyaaError::Validation(format!(
                    "page URL {raw:?} does not end in a numeric ID (got {segment:?})"
                ))
            })?;

            // Normalize away a trailing slash so equal pages compare equal
            let mut canonical = url.clone();
            canonical.set_path(url.path().trim_end_matches('/'));

            Ok((id, canonical))
        }
    }
}

/// Builds a search URL with the standard query parameters
/// (`f` filter, `c` category, `q` query, `s` sort, `o` order).
///
/// The first page is the canonical bare search URL; later pages add
/// `p={page}`.
pub fn search_url(base: &Url, query: &str, options: &SearchOptions, page: u32) -> String {
    let mut url = format!(
        "{}?f={}&c={}&q={}&s={}&o={}",
        base,
        options.filter.as_query(),
        options.category.id(),
        urlencoding::encode(query),
        options.sort_by.as_query(),
        options.order.as_query(),
    );

    if page > 1 {
        url.push_str(&format!("&p={page}"));
    }

    url
}

/// Resolves an href from a page against that page's URL.
///
/// Absolute hrefs pass through unchanged; relative ones are joined.
pub(crate) fn absolutize(page_url: &Url, href: &str) -> Result<String> {
    if href.contains("://") || href.starts_with("magnet:") {
        return Ok(href.to_string());
    }

    page_url
        .join(href)
        .map(|u| u.to_string())
        .map_err(|e| NyaaError::Parse(format!("unresolvable link {href:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn base() -> Url {
        Url::parse(DEFAULT_BASE_URL).unwrap()
    }

    #[test]
    fn test_resolve_numeric_id() {
        let (id, url) = resolve_page(&base(), &PageRef::Id(123456)).unwrap();
        assert_eq!(id, 123456);
        assert_eq!(url.as_str(), "https://nyaa.si/view/123456");
    }

    #[test]
    fn test_resolve_full_url() {
        let page = PageRef::from("https://nyaa.si/view/123456");
        let (id, url) = resolve_page(&base(), &page).unwrap();
        assert_eq!(id, 123456);
        assert_eq!(url.as_str(), "https://nyaa.si/view/123456");
    }

    #[test]
    fn test_resolve_tolerates_trailing_slash() {
        let page = PageRef::from("https://nyaa.si/view/123456/");
        let (id, url) = resolve_page(&base(), &page).unwrap();
        assert_eq!(id, 123456);
        assert_eq!(url.as_str(), "https://nyaa.si/view/123456");
    }

    #[test]
    fn test_resolve_rejects_non_numeric_segment() {
        let page = PageRef::from("https://nyaa.si/view/abc");
        assert!(matches!(
            resolve_page(&base(), &page),
            Err(NyaaError::Validation(_))
        ));
    }

    #[test]
    fn test_resolve_rejects_garbage_url() {
        let page = PageRef::from("not a url");
        assert!(matches!(
            resolve_page(&base(), &page),
            Err(NyaaError::Validation(_))
        ));
    }

    #[test]
    fn test_search_url_first_page_has_no_p_param() {
        let url = search_url(&base(), "big buck bunny", &SearchOptions::default(), 1);
        assert_eq!(
            url,
            "https://nyaa.si/?f=0&c=0_0&q=big%20buck%20bunny&s=id&o=desc"
        );
    }

    #[test]
    fn test_search_url_keeps_empty_query_param() {
        let url = search_url(&base(), "", &SearchOptions::default(), 1);
        assert_eq!(url, "https://nyaa.si/?f=0&c=0_0&q=&s=id&o=desc");
    }

    #[test]
    fn test_search_url_later_pages_add_p_param() {
        let url = search_url(&base(), "test", &SearchOptions::default(), 3);
        assert!(url.ends_with("&p=3"));
    }

    #[test]
    fn test_search_url_carries_options() {
        use crate::category::{Filter, Order, SortBy};

        let options = SearchOptions {
            category: crate::category::Category::AnimeEnglishTranslated,
            filter: Filter::TrustedOnly,
            sort_by: SortBy::Seeders,
            order: Order::Ascending,
        };
        let url = search_url(&base(), "test", &options, 1);
        assert_eq!(url, "https://nyaa.si/?f=2&c=1_2&q=test&s=seeders&o=asc");
    }

    #[test]
    fn test_absolutize() {
        let page = Url::parse("https://nyaa.si/view/123456").unwrap();
        assert_eq!(
            absolutize(&page, "/download/123456.torrent").unwrap(),
            "https://nyaa.si/download/123456.torrent"
        );
        assert_eq!(
            absolutize(&page, "magnet:?xt=urn:btih:abc").unwrap(),
            "magnet:?xt=urn:btih:abc"
        );
        assert_eq!(
            absolutize(&page, "https://elsewhere.example/x").unwrap(),
            "https://elsewhere.example/x"
        );
    }

    proptest! {
        #[test]
        fn prop_resolve_id_round_trips(id in 1u64..u64::MAX) {
            let (resolved, url) = resolve_page(&base(), &PageRef::Id(id)).unwrap();
            prop_assert_eq!(resolved, id);
            let expected_suffix = format!("/view/{}", id);
            prop_assert!(url.as_str().ends_with(&expected_suffix));

            let (again, _) = resolve_page(&base(), &PageRef::Url(url.to_string())).unwrap();
            prop_assert_eq!(again, id);
        }
    }
}
