//! Error types for the request handler

use serde::{Serialize, Serializer};
use thiserror::Error;
use wgcrawl_core::CrawlError;

/// Error type for request handling and the command line
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Request body is not a JSON object with a `url` string
    #[error("Invalid request payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),

    /// `url` field is not an absolute http(s) URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Records could not be encoded as JSON
    #[error("Failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),

    /// Crawler could not be built
    #[error(transparent)]
    Crawl(#[from] CrawlError),

    /// Reading the request from stdin failed
    #[error("Failed to read request: {0}")]
    Io(#[from] std::io::Error),
}

impl Serialize for HandlerError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for handler operations
pub type Result<T> = std::result::Result<T, HandlerError>;
