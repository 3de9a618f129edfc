//! Error types for the nyaa.si client
//!
//! A single error enum covers input validation, transport failures,
//! HTML structure mismatches, and torrent-file decoding.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for all nyaa.si client operations
#[derive(Error, Debug)]
pub enum NyaaError {
    /// Malformed caller input, raised before any network I/O
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The requested page does not exist (upstream HTTP 404)
    #[error("Page not found: {0}")]
    NotFound(String),

    /// HTTP request failed at the network level
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream returned a non-success status other than 404
    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    /// Rate limited by the server (HTTP 429) after all retries
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// The page structure does not match the expected layout.
    ///
    /// Carries the label of the missing or malformed field
    /// (e.g. `"File size:"`) for diagnosability.
    #[error("Failed to parse page: {0}")]
    Parse(String),

    /// The downloaded `.torrent` file could not be decoded
    #[error("Failed to decode torrent file: {0}")]
    Torrent(#[from] lava_torrent::LavaTorrentError),
}

impl Serialize for NyaaError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for nyaa.si client operations
pub type Result<T> = std::result::Result<T, NyaaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation() {
        let error = NyaaError::Validation("expected an ID or URL".to_string());
        assert_eq!(error.to_string(), "Invalid input: expected an ID or URL");
    }

    #[test]
    fn test_error_display_not_found() {
        let error = NyaaError::NotFound("https://nyaa.si/view/1".to_string());
        assert_eq!(error.to_string(), "Page not found: https://nyaa.si/view/1");
    }

    #[test]
    fn test_error_display_status() {
        let error = NyaaError::Status {
            url: "https://nyaa.si/view/1".to_string(),
            status: 503,
        };
        assert_eq!(
            error.to_string(),
            "Unexpected HTTP status 503 for https://nyaa.si/view/1"
        );
    }

    #[test]
    fn test_error_display_parse_carries_label() {
        let error = NyaaError::Parse("Info hash:".to_string());
        assert_eq!(error.to_string(), "Failed to parse page: Info hash:");
    }

    #[test]
    fn test_error_serialize() {
        let error = NyaaError::RateLimited;
        let json = serde_json::to_string(&error).expect("Serialization should succeed");
        assert_eq!(json, "\"Rate limited - too many requests\"");
    }
}
