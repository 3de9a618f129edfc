//! HTML parsers for nyaa.si
//!
//! Contains modules for parsing the two page types the client
//! consumes: individual torrent pages and search results listings.

pub mod page;
pub mod search;

pub use page::{PanelFields, TorrentPage, parse_torrent_page};
pub use search::{SearchPage, parse_search_results};
