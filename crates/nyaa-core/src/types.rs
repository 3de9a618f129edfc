//! Core data types for the nyaa.si client
//!
//! Contains the immutable domain objects built from a torrent page plus
//! its decoded `.torrent` file, and the search parameter bundle.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, TimeZone, Utc};
use lava_torrent::bencode::BencodeElem;
use lava_torrent::torrent::v1::Torrent;
use serde::{Deserialize, Serialize};

use crate::category::{Category, Filter, Order, SortBy};
use crate::error::Result;

/// The user who submitted a torrent
///
/// Anonymous uploads have no submitter at all; the parser never
/// constructs a `Submitter` named "Anonymous".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Submitter {
    /// Username of the submitter
    pub name: String,

    /// Profile URL of the submitter
    pub url: String,

    /// Whether the account is marked trusted (green)
    ///
    /// Unlike the page-level badges, `is_trusted` and `is_banned` are
    /// independent: a submitter can be both at once.
    pub is_trusted: bool,

    /// Whether the account is banned
    pub is_banned: bool,
}

/// One file inside a torrent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path of the file, relative to the torrent root
    pub path: String,

    /// Size of the file in bytes
    pub size: u64,
}

/// Metadata decoded from a raw `.torrent` file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentFile {
    /// Torrent name
    pub name: String,

    /// Total size of the content in bytes
    pub size: u64,

    /// SHA-1 info hash, 40 lowercase hex characters
    pub infohash: String,

    /// Piece size in bytes
    pub piece_size: u64,

    /// Files contained in the torrent; single-file torrents list
    /// themselves as the only entry
    pub files: Vec<FileEntry>,

    /// Tracker tiers as announced by the torrent file
    pub trackers: Vec<Vec<String>>,

    /// Free-text comment, if any
    pub comment: Option<String>,

    /// Tool that created the torrent, if recorded
    pub created_by: Option<String>,

    /// Creation time, if recorded
    pub creation_date: Option<DateTime<Utc>>,
}

impl TorrentFile {
    /// Decodes a raw `.torrent` file.
    ///
    /// # Errors
    /// Returns `Torrent` if the bytes are not a valid bencoded torrent.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let torrent = Torrent::read_from_bytes(bytes)?;
        let infohash = torrent.info_hash();

        let files = match &torrent.files {
            Some(files) => files
                .iter()
                .map(|f| FileEntry {
                    path: f.path.to_string_lossy().into_owned(),
                    size: f.length.max(0) as u64,
                })
                .collect(),
            None => vec![FileEntry {
                path: torrent.name.clone(),
                size: torrent.length.max(0) as u64,
            }],
        };

        let trackers = match &torrent.announce_list {
            Some(tiers) => tiers.clone(),
            None => torrent
                .announce
                .clone()
                .map(|announce| vec![vec![announce]])
                .unwrap_or_default(),
        };

        Ok(Self {
            name: torrent.name.clone(),
            size: torrent.length.max(0) as u64,
            piece_size: torrent.piece_length.max(0) as u64,
            files,
            trackers,
            comment: extra_string(&torrent, "comment"),
            created_by: extra_string(&torrent, "created by"),
            creation_date: extra_integer(&torrent, "creation date")
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
            infohash,
        })
    }
}

fn extra_string(torrent: &Torrent, key: &str) -> Option<String> {
    match torrent.extra_fields.as_ref()?.get(key)? {
        BencodeElem::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn extra_integer(torrent: &Torrent, key: &str) -> Option<i64> {
    match torrent.extra_fields.as_ref()?.get(key)? {
        BencodeElem::Integer(i) => Some(*i),
        _ => None,
    }
}

/// One torrent release: the parsed nyaa.si page combined with its
/// decoded `.torrent` file
///
/// Constructed atomically from a single successful page parse plus one
/// successful torrent-file fetch, and never mutated afterwards.
///
/// Equality and hashing use only `id` and `url`: two fetches of the
/// same release compare equal even when volatile counters (seeders,
/// leechers, completed) have moved in between.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NyaaRelease {
    /// Numeric nyaa.si ID (`https://nyaa.si/view/{id}`)
    pub id: u64,

    /// Canonical URL of the torrent page
    pub url: String,

    /// Title of the release
    pub title: String,

    /// Category of the release
    pub category: Category,

    /// Submitting user; `None` for anonymous uploads
    pub submitter: Option<Submitter>,

    /// Submission time (UTC)
    pub datetime: DateTime<Utc>,

    /// Free-text information field; the placeholder "No information."
    /// is normalized to `None`
    pub information: Option<String>,

    /// Number of seeders at fetch time
    pub seeders: u32,

    /// Number of leechers at fetch time
    pub leechers: u32,

    /// Number of completed downloads at fetch time
    pub completed: u32,

    /// Content size in bytes, as reported by the page
    pub size: u64,

    /// SHA-1 info hash shown on the page, 40 hex characters
    pub infohash: String,

    /// Whether the upload carries the trusted (green) badge.
    ///
    /// Trusted and remake are mutually exclusive at the page level;
    /// when the markup signals both, remake takes priority and this is
    /// `false`.
    pub is_trusted: bool,

    /// Whether the upload carries the remake (red) badge
    pub is_remake: bool,

    /// Free-text description; the placeholder "#### No description."
    /// is normalized to `None`
    pub description: Option<String>,

    /// URL of the raw `.torrent` file
    pub torrent_url: String,

    /// Magnet URI as provided by the page
    pub magnet: String,

    /// Decoded `.torrent` file metadata
    pub torrent: TorrentFile,
}

impl PartialEq for NyaaRelease {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.url == other.url
    }
}

impl Eq for NyaaRelease {}

impl Hash for NyaaRelease {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.url.hash(state);
    }
}

/// Search parameters beyond the query text
///
/// Defaults match the site's own: all categories, no filter, newest
/// first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Category to restrict the search to
    pub category: Category,

    /// Result filter (no filter / no remakes / trusted only)
    pub filter: Filter,

    /// Sort field
    pub sort_by: SortBy,

    /// Sort order
    pub order: Order,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Minimal valid single-file torrent: 1 MiB content, 256 KiB pieces.
    pub(crate) fn sample_torrent_bytes() -> Vec<u8> {
        let mut bytes = b"d8:announce32:https://tracker.example/announce\
7:comment9:Test data13:creation datei1681484400e\
4:infod6:lengthi1048576e4:name8:test.bin12:piece lengthi262144e6:pieces80:"
            .to_vec();
        bytes.extend(std::iter::repeat(b'\xff').take(80));
        bytes.extend(b"ee");
        bytes
    }

    fn sample_release(id: u64, seeders: u32) -> NyaaRelease {
        NyaaRelease {
            id,
            url: format!("https://nyaa.si/view/{id}"),
            title: "title".to_string(),
            category: Category::AnimeEnglishTranslated,
            submitter: Some(Submitter {
                name: "alice".to_string(),
                url: "https://nyaa.si/user/alice".to_string(),
                is_trusted: true,
                is_banned: false,
            }),
            datetime: Utc.timestamp_opt(1681484400, 0).single().unwrap(),
            information: None,
            seeders,
            leechers: 0,
            completed: 10,
            size: 734003200,
            infohash: "2c6867c91b5827bcbc7fce2a0c49754c5ff9a276".to_string(),
            is_trusted: true,
            is_remake: false,
            description: None,
            torrent_url: format!("https://nyaa.si/download/{id}.torrent"),
            magnet: "magnet:?xt=urn:btih:2c6867c91b5827bcbc7fce2a0c49754c5ff9a276".to_string(),
            torrent: TorrentFile::from_bytes(&sample_torrent_bytes()).unwrap(),
        }
    }

    #[test]
    fn test_release_equality_ignores_volatile_counters() {
        let a = sample_release(123456, 20);
        let b = sample_release(123456, 99);
        let c = sample_release(567890, 20);

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<NyaaRelease> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_torrent_file_from_bytes() {
        let torrent = TorrentFile::from_bytes(&sample_torrent_bytes()).unwrap();

        assert_eq!(torrent.name, "test.bin");
        assert_eq!(torrent.size, 1048576);
        assert_eq!(torrent.piece_size, 262144);
        assert_eq!(torrent.infohash.len(), 40);
        assert!(torrent.infohash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(torrent.files.len(), 1);
        assert_eq!(torrent.files[0].path, "test.bin");
        assert_eq!(torrent.files[0].size, 1048576);
        assert_eq!(
            torrent.trackers,
            vec![vec!["https://tracker.example/announce".to_string()]]
        );
        assert_eq!(torrent.comment.as_deref(), Some("Test data"));
        assert_eq!(
            torrent.creation_date,
            Utc.timestamp_opt(1681484400, 0).single()
        );
    }

    #[test]
    fn test_torrent_file_rejects_garbage() {
        assert!(TorrentFile::from_bytes(b"not a torrent").is_err());
    }

    #[test]
    fn test_release_serialization_round_trip() {
        let release = sample_release(123456, 5);
        let json = serde_json::to_string(&release).expect("Serialization should succeed");
        let back: NyaaRelease =
            serde_json::from_str(&json).expect("Deserialization should succeed");

        assert_eq!(release, back);
        assert_eq!(back.seeders, 5);
        assert_eq!(back.category, Category::AnimeEnglishTranslated);
    }

    #[test]
    fn test_search_options_defaults() {
        let options = SearchOptions::default();
        assert_eq!(options.category, Category::All);
        assert_eq!(options.filter, Filter::NoFilter);
        assert_eq!(options.sort_by, SortBy::Datetime);
        assert_eq!(options.order, Order::Descending);
    }
}
