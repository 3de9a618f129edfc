//! High-level client API for nyaa.si
//!
//! Combines the HTTP layer with the page and search parsers: one call
//! resolves a page reference into a complete [`NyaaRelease`], and
//! search walks paginated listings as a lazy stream of releases.

use std::collections::{HashSet, VecDeque};

use futures::stream::{self, Stream, TryStreamExt};
use tracing::debug;
use url::Url;

use crate::category::UnknownCategoryPolicy;
use crate::client::{ClientConfig, NyaaClient};
use crate::error::{NyaaError, Result};
use crate::parser::{parse_search_results, parse_torrent_page};
use crate::types::{NyaaRelease, SearchOptions, TorrentFile};
use crate::url::{PageRef, resolve_page, search_url};

/// Client for nyaa.si
///
/// # Example
/// ```no_run
/// # async fn example() -> nyaa_core::Result<()> {
/// use nyaa_core::Nyaa;
///
/// let nyaa = Nyaa::new()?;
/// let release = nyaa.get(1817328u64).await?;
/// println!("{}: {} seeders", release.title, release.seeders);
/// # Ok(())
/// # }
/// ```
pub struct Nyaa {
    client: NyaaClient,
    base_url: Url,
    unknown_category: UnknownCategoryPolicy,
}

impl Nyaa {
    /// Create a client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom configuration
    ///
    /// # Errors
    /// Returns `Validation` if the configured base URL does not parse,
    /// or `Http` if the underlying HTTP client fails to initialize.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| NyaaError::Validation(format!("invalid base URL: {e}")))?;
        let client = NyaaClient::with_config(&config)?;

        Ok(Self {
            client,
            base_url,
            unknown_category: config.unknown_category,
        })
    }

    /// Fetch one torrent page and its `.torrent` file as a complete
    /// release.
    ///
    /// `page` is either a numeric ID or a full page URL whose path
    /// ends in the ID (`https://nyaa.si/view/123456`, trailing slash
    /// tolerated).
    ///
    /// # Errors
    /// - `Validation` for a malformed page reference, before any I/O
    /// - `NotFound` when the page does not exist (HTTP 404)
    /// - `Status` / `Http` for other transport failures
    /// - `Parse` when the page does not match the expected layout
    /// - `Torrent` when the `.torrent` file does not decode
    pub async fn get(&self, page: impl Into<PageRef>) -> Result<NyaaRelease> {
        self.get_ref(&page.into()).await
    }

    async fn get_ref(&self, page: &PageRef) -> Result<NyaaRelease> {
        let (id, url) = resolve_page(&self.base_url, page)?;

        let html = self.client.get_text(url.as_str()).await?;
        let parsed = parse_torrent_page(&url, &html, self.unknown_category)?;

        let torrent_bytes = self.client.get_bytes(&parsed.torrent_url).await?;
        let torrent = TorrentFile::from_bytes(&torrent_bytes)?;
        debug!(id, title = %parsed.title, "fetched release");

        Ok(NyaaRelease {
            id,
            url: url.to_string(),
            title: parsed.title,
            category: parsed.category,
            submitter: parsed.submitter,
            datetime: parsed.datetime,
            information: parsed.information,
            seeders: parsed.seeders,
            leechers: parsed.leechers,
            completed: parsed.completed,
            size: parsed.size,
            infohash: parsed.infohash,
            is_trusted: parsed.is_trusted,
            is_remake: parsed.is_remake,
            description: parsed.description,
            torrent_url: parsed.torrent_url,
            magnet: parsed.magnet,
            torrent,
        })
    }

    /// Search for releases, walking all result pages lazily.
    ///
    /// The first listing page is fetched on first poll; every result
    /// ID is then fetched as a full release in document order, and
    /// each page number advertised by the pagination control is
    /// fetched in turn (each page at most once). The stream therefore
    /// yields the flattened sequence page 1 + page 2 + ... without
    /// paying for pages the consumer never reaches.
    ///
    /// The query is sent verbatim; an empty query yields whatever the
    /// site lists for an unconstrained search.
    ///
    /// A failure for one release propagates as an `Err` item and ends
    /// the stream; nothing is skipped silently.
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> nyaa_core::Result<()> {
    /// use futures::TryStreamExt;
    /// use nyaa_core::{Nyaa, SearchOptions};
    ///
    /// let nyaa = Nyaa::new()?;
    /// let mut results = std::pin::pin!(nyaa.search("big buck bunny", SearchOptions::default()));
    /// while let Some(release) = results.try_next().await? {
    ///     println!("{} ({} seeders)", release.title, release.seeders);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> impl Stream<Item = Result<NyaaRelease>> + '_ {
        let state = SearchState {
            query: query.to_string(),
            options,
            queue: VecDeque::new(),
            pending_pages: VecDeque::new(),
            seen_pages: HashSet::from([1]),
            first_fetch: true,
        };

        stream::try_unfold(state, move |mut state| async move {
            loop {
                if let Some(id) = state.queue.pop_front() {
                    let release = self.get_ref(&PageRef::Id(id)).await?;
                    return Ok(Some((release, state)));
                }

                let page = if state.first_fetch {
                    state.first_fetch = false;
                    1
                } else if let Some(page) = state.pending_pages.pop_front() {
                    page
                } else {
                    return Ok(None);
                };

                let url = search_url(&self.base_url, &state.query, &state.options, page);
                let html = self.client.get_text(&url).await?;
                let listing = parse_search_results(&html)?;
                debug!(page, results = listing.ids.len(), "parsed search page");

                state.queue.extend(listing.ids);
                for extra in listing.extra_pages {
                    if state.seen_pages.insert(extra) {
                        state.pending_pages.push_back(extra);
                    }
                }
            }
        })
    }

    /// Search and collect every result into a vector.
    ///
    /// Convenience over [`Nyaa::search`] for consumers that want all
    /// pages anyway.
    pub async fn search_all(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<NyaaRelease>> {
        self.search(query, options).try_collect().await
    }

    /// The configured base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

struct SearchState {
    query: String,
    options: SearchOptions,
    queue: VecDeque<u64>,
    pending_pages: VecDeque<u32>,
    seen_pages: HashSet<u32>,
    first_fetch: bool,
}
