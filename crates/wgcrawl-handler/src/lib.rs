//! wgcrawl Request Handler
//!
//! Wraps the crawl pipeline as a request/response handler: a JSON body
//! `{"url": "<listing page>"}` goes in, a status code and a JSON array of
//! listing records come out.
//!
//! # Usage
//!
//! ```no_run
//! # async fn example() -> wgcrawl_handler::Result<()> {
//! use wgcrawl_core::Crawler;
//! use wgcrawl_handler::Handler;
//!
//! let handler = Handler::new(Crawler::new()?);
//! let response = handler
//!     .handle(r#"{"url": "https://www.wg-gesucht.de/wohnungen-in-Karlsruhe.68.2.1.0.html"}"#)
//!     .await;
//! println!("{} {}", response.status_code, response.body);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use wgcrawl_core::{Crawler, Fetcher, HttpFetcher};

mod error;

pub use error::{HandlerError, Result};

/// Status returned for malformed payloads unless configured otherwise
pub const DEFAULT_CLIENT_ERROR_STATUS: u16 = 400;

/// Status earlier deployments answered malformed payloads with
pub const LEGACY_CLIENT_ERROR_STATUS: u16 = 404;

/// Incoming request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRequest {
    /// Listing page to crawl
    pub url: String,
}

/// Outgoing response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerResponse {
    /// HTTP-style status code
    pub status_code: u16,
    /// JSON array of records on success, error text otherwise
    pub body: String,
}

impl HandlerResponse {
    /// Whether the status code is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Parses a request body and validates its URL
///
/// # Errors
/// - `InvalidPayload` if the body is not JSON or lacks a `url` string
/// - `InvalidUrl` if the URL is not an absolute http(s) URL
pub fn parse_request(body: &str) -> Result<CrawlRequest> {
    let request: CrawlRequest =
        serde_json::from_str(body).map_err(HandlerError::InvalidPayload)?;
    validate_url(&request.url)?;
    Ok(request)
}

/// Checks that a listing URL is absolute and uses http or https
///
/// # Errors
/// Returns `InvalidUrl` otherwise
pub fn validate_url(raw: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| HandlerError::InvalidUrl(format!("{raw:?}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(HandlerError::InvalidUrl(format!(
            "{raw:?}: unsupported scheme {scheme}"
        ))),
    }
}

/// Request handler around a [`Crawler`]
pub struct Handler<F: Fetcher = HttpFetcher> {
    crawler: Crawler<F>,
    client_error_status: u16,
}

impl<F: Fetcher> Handler<F> {
    /// Create a handler answering malformed payloads with 400
    pub fn new(crawler: Crawler<F>) -> Self {
        Self {
            crawler,
            client_error_status: DEFAULT_CLIENT_ERROR_STATUS,
        }
    }

    /// Override the status used for malformed payloads
    pub fn with_client_error_status(mut self, status: u16) -> Self {
        self.client_error_status = status;
        self
    }

    /// Status used for malformed payloads
    pub fn client_error_status(&self) -> u16 {
        self.client_error_status
    }

    /// Handles one request body
    ///
    /// Malformed payloads are answered with the client error status and the
    /// error text; the crawl is not attempted. Otherwise the crawl always
    /// runs to completion and answers 200, even with zero records.
    pub async fn handle(&self, body: &str) -> HandlerResponse {
        let request = match parse_request(body) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Rejecting request");
                return HandlerResponse {
                    status_code: self.client_error_status,
                    body: e.to_string(),
                };
            }
        };

        let records = self.crawler.crawl(request.url.trim()).await;
        info!(url = %request.url, records = records.len(), "Request handled");

        match serde_json::to_string(&records) {
            Ok(body) => HandlerResponse {
                status_code: 200,
                body,
            },
            Err(e) => {
                let e = HandlerError::Encode(e);
                warn!(error = %e, "Failed to encode records");
                HandlerResponse {
                    status_code: 500,
                    body: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_valid() {
        let body = r#"{"url": "https://www.wg-gesucht.de/wohnungen-in-Karlsruhe.68.2.1.0.html"}"#;
        let request = parse_request(body).unwrap();
        assert_eq!(
            request.url,
            "https://www.wg-gesucht.de/wohnungen-in-Karlsruhe.68.2.1.0.html"
        );
    }

    #[test]
    fn test_parse_request_not_json() {
        let result = parse_request("url=https://www.wg-gesucht.de");
        assert!(matches!(result, Err(HandlerError::InvalidPayload(_))));
    }

    #[test]
    fn test_parse_request_missing_url() {
        let result = parse_request(r#"{"link": "https://www.wg-gesucht.de"}"#);
        match result {
            Err(HandlerError::InvalidPayload(e)) => assert!(e.to_string().contains("url")),
            other => panic!("Expected InvalidPayload error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_request_url_not_string() {
        let result = parse_request(r#"{"url": 42}"#);
        assert!(matches!(result, Err(HandlerError::InvalidPayload(_))));
    }

    #[test]
    fn test_parse_request_empty_url() {
        let result = parse_request(r#"{"url": ""}"#);
        assert!(matches!(result, Err(HandlerError::InvalidUrl(_))));
    }

    #[test]
    fn test_validate_url_relative() {
        assert!(matches!(
            validate_url("/wohnungen-in-Karlsruhe.html"),
            Err(HandlerError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_validate_url_scheme() {
        let result = validate_url("ftp://www.wg-gesucht.de/");
        match result {
            Err(HandlerError::InvalidUrl(msg)) => assert!(msg.contains("ftp")),
            other => panic!("Expected InvalidUrl error, got {other:?}"),
        }
        assert!(validate_url("http://localhost:8080/x.html").is_ok());
    }

    #[test]
    fn test_handler_client_error_status() {
        let handler = Handler::new(Crawler::new().unwrap());
        assert_eq!(handler.client_error_status(), 400);
        let legacy = handler.with_client_error_status(LEGACY_CLIENT_ERROR_STATUS);
        assert_eq!(legacy.client_error_status(), 404);
    }

    #[tokio::test]
    async fn test_handle_malformed_payload() {
        let handler = Handler::new(Crawler::new().unwrap());
        let response = handler.handle("not json").await;
        assert_eq!(response.status_code, 400);
        assert!(response.body.starts_with("Invalid request payload"));
        assert!(!response.is_success());
    }

    #[test]
    fn test_response_serialization() {
        let response = HandlerResponse {
            status_code: 200,
            body: "[]".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"status_code":200,"body":"[]"}"#);
        assert!(response.is_success());
    }
}
