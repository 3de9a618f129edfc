//! Typed client library for nyaa.si
//!
//! Fetches torrent pages and search listings from nyaa.si and parses
//! the HTML into typed, immutable domain objects.
//!
//! # Overview
//!
//! - Rate-limited HTTP client so the site's informal request limits
//!   are respected
//! - HTML parsers for torrent pages (category, submitter, counters,
//!   size, info hash, download links) and for paginated search
//!   listings
//! - A high-level API that combines a page with its decoded `.torrent`
//!   file into one [`NyaaRelease`], and walks search results as a lazy
//!   stream
//!
//! # Example
//!
//! ```no_run
//! use futures::TryStreamExt;
//! use nyaa_core::{Nyaa, Result, SearchOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let nyaa = Nyaa::new()?;
//!
//!     // Fetch one release by ID or URL
//!     let release = nyaa.get(1817328u64).await?;
//!     println!("{} ({} bytes)", release.title, release.size);
//!
//!     // Walk search results lazily; stop whenever you have enough
//!     let mut results = std::pin::pin!(nyaa.search("big buck bunny", SearchOptions::default()));
//!     while let Some(release) = results.try_next().await? {
//!         println!("{}", release.title);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod category;
mod client;
mod error;
mod nyaa;
pub mod parser;
mod types;
pub mod url;

// Re-export category taxonomy and search parameter enums
pub use category::{Category, Filter, Order, SortBy, UnknownCategoryPolicy};

// Re-export client types
pub use client::{ClientConfig, NyaaClient, RateLimiter};

// Re-export error types
pub use error::{NyaaError, Result};

// Re-export the main client API
pub use nyaa::Nyaa;

// Re-export parser entry points
pub use parser::{SearchPage, TorrentPage, parse_search_results, parse_torrent_page};

// Re-export data types
pub use types::{FileEntry, NyaaRelease, SearchOptions, Submitter, TorrentFile};

// Re-export page reference type
pub use crate::url::{DEFAULT_BASE_URL, PageRef};
