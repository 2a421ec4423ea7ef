//! Error types for the wgcrawl core
//!
//! [`CrawlError`] covers page-level failures (fetching, configuration).
//! [`FieldError`] covers a single field that could not be located or
//! converted; it never escapes the detail extractor.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for page-level crawl operations
#[derive(Error, Debug)]
pub enum CrawlError {
    /// HTTP request failed (connect, timeout, body decoding)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Unexpected HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// Page does not exist on the server
    #[error("Page not found: {0}")]
    NotFound(String),

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Client or crawl configuration is not usable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A CSS selector in the extraction rules failed to parse
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

impl Serialize for CrawlError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Failure to extract one field of a listing record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// No element matched the field's path
    #[error("no element matched for {0}")]
    Missing(&'static str),

    /// Captured text is not an integer
    #[error("{field}: {text:?} is not an integer")]
    NotANumber { field: &'static str, text: String },

    /// Captured text block holds no whitespace-delimited token
    #[error("{0}: text block is empty")]
    NoTokens(&'static str),

    /// Selector of the field's path does not parse
    #[error("{field}: invalid selector {selector:?}")]
    InvalidSelector {
        field: &'static str,
        selector: &'static str,
    },
}
