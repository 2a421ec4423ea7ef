//! HTML parsers for wg-gesucht.de
//!
//! Contains modules for parsing different page types.

pub mod detail;
pub mod listing;
pub mod text;

pub use detail::{Extraction, Field, extract_listing, extract_report};
pub use listing::discover_links;
