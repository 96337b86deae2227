// src/qiita/tags.rs
// =============================================================================
// Data types for the Qiita `/tags` endpoint.
//
// The same `Tag` struct is used on both ends of the pipeline:
// - serde_json reads it from each page body
// - csv writes it to the export file (field order = column order)
//
// Rust concepts:
// - serde derive with a custom `deserialize_with` helper
// - clap::ValueEnum so the sort key can be a CLI flag
// =============================================================================

use serde::{Deserialize, Deserializer, Serialize};

// Qiita refuses anything above this for `per_page`
pub const MAX_PER_PAGE: u32 = 100;

/// A single tag as returned by the API and written to the CSV file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// How many users follow the tag
    pub followers_count: i64,
    /// Icon image URL (empty when the tag has no icon)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub icon_url: String,
    /// Tag name, unique across Qiita
    pub id: String,
    /// How many articles carry the tag
    pub items_count: i64,
}

impl Tag {
    // Column names of the export, in field order
    pub const CSV_HEADERS: [&'static str; 4] =
        ["followers_count", "icon_url", "id", "items_count"];
}

// Tags without an icon come back as `"icon_url": null`
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Sort order understood by the `/tags` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Sort {
    /// Most used tags first
    #[default]
    Count,
    /// Alphabetical
    Name,
}

impl Sort {
    pub fn as_str(self) -> &'static str {
        match self {
            Sort::Count => "count",
            Sort::Name => "name",
        }
    }
}

/// Query parameters for one page of `/tags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagQuery {
    pub page: u32,
    pub per_page: u32,
    pub sort: Sort,
}

impl TagQuery {
    pub fn new(page: u32, per_page: u32, sort: Sort) -> Self {
        Self { page, per_page, sort }
    }

    // Rendered as `page=..&per_page=..&sort=..`
    pub fn to_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
            ("sort", self.sort.as_str().to_string()),
        ]
    }
}
