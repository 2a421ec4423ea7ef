//! wg-gesucht.de Crawler Core Library
//!
//! Extracts structured rental-listing records from a search results page
//! and every detail page it links to.
//!
//! # Overview
//!
//! This crate provides:
//! - A link discoverer for listing pages ([`discover_links`])
//! - A detail extractor with one independent rule per field ([`extract_listing`])
//! - A bounded-parallel crawl pipeline connecting both ([`Crawler`])
//!
//! A field that cannot be located or converted takes its zero value and
//! never aborts the rest of the record. A page that cannot be fetched
//! contributes no record.
//!
//! # Example
//!
//! ```no_run
//! use wgcrawl_core::{Crawler, DEFAULT_LISTING_URL, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let crawler = Crawler::new()?;
//!     let records = crawler.crawl(DEFAULT_LISTING_URL).await;
//!
//!     for record in &records {
//!         println!("{} | {} € | {} m²", record.title, record.rent_base, record.area_sqm);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod crawler;
mod error;
pub mod parser;
mod types;
pub mod url;

// Re-export client types
pub use client::{ClientConfig, Fetcher, HttpFetcher};

// Re-export crawl pipeline
pub use crawler::{CrawlConfig, Crawler};

// Re-export error types
pub use error::{CrawlError, FieldError, Result};

// Re-export parser functions
pub use parser::{Extraction, Field, discover_links, extract_listing, extract_report};

// Re-export data types
pub use types::ListingRecord;

// Re-export URL helpers for convenience
pub use url::{BASE_URL, DEFAULT_LISTING_URL, resolve_href};
