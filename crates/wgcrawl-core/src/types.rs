//! Core data types for wgcrawl
//!
//! Contains the listing record produced for each detail page.

use serde::{Deserialize, Serialize};

/// One rental offer extracted from a wg-gesucht.de detail page
///
/// Fields that could not be extracted hold their type's default value
/// (`""`, `0` or an empty list) so the serialized form never contains
/// `null` or omitted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingRecord {
    /// Detail page URL the record was extracted from
    pub source_url: String,

    /// Site-assigned offer identifier taken from the contact box
    pub external_id: String,

    /// Offer headline
    pub title: String,

    /// Base rent in euro
    pub rent_base: u32,

    /// Additional costs in euro
    pub rent_additional: u32,

    /// Deposit in euro
    pub deposit: u32,

    /// Street address, whitespace-normalized
    pub address: String,

    /// Raw "available from" date text (e.g., "01.11.2026")
    pub available_from: String,

    /// Raw "online since" text
    pub listed_on: String,

    /// Living area in square meters
    pub area_sqm: u32,

    /// Number of rooms
    pub room_count: u32,

    /// Amenity tags in page order (e.g., "Balkon", "möbliert")
    pub amenities: Vec<String>,

    /// Description blocks formatted as "heading: body"
    pub description_sections: Vec<String>,
}
