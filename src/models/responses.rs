//! Response DTOs for the proxy API
//!
//! Defines the structure of outgoing HTTP response bodies and how they are
//! built from Notion documents.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::notion::{first_plain_text, Block, Database, Page, PropertyValue};

// == Rumor Properties ==
pub const PROPS_KEY_TITLE: &str = "Title";
pub const PROPS_KEY_DATE: &str = "Date";
pub const PROPS_KEY_SOURCE: &str = "Source";
pub const PROPS_KEY_RELEASED: &str = "Released";

/// Select option marking a rumor as published.
pub const RELEASED: &str = "released";

/// Response body for a single subject
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectResponse {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SubjectResponse {
    /// Builds a subject from a database's title segments.
    ///
    /// The first segment is the title. A second segment is the description,
    /// but only when the title has exactly two segments.
    pub fn from_database(id: &str, database: &Database, updated_at: Option<DateTime<Utc>>) -> Self {
        let title = first_plain_text(&database.title).unwrap_or_default().to_string();
        let description = match database.title.as_slice() {
            [_, second] => Some(second.plain_text.clone()),
            _ => None,
        };

        Self {
            id: id.to_string(),
            title,
            description,
            updated_at,
        }
    }
}

/// Response body for one released rumor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RumorResponse {
    pub title: String,
    pub date: Option<DateTime<Utc>>,
    pub source: String,
    pub body: String,
}

impl RumorResponse {
    /// Builds a rumor from its row and the row's child blocks.
    ///
    /// The body joins the first text segment of each non-empty paragraph
    /// with newlines.
    pub fn from_page(page: &Page, children: &[Block]) -> Self {
        let text = |key: &str, read: fn(&PropertyValue) -> Option<&str>| {
            page.property(key)
                .and_then(read)
                .unwrap_or_default()
                .to_string()
        };

        let body = children
            .iter()
            .filter_map(Block::paragraph_text)
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            title: text(PROPS_KEY_TITLE, PropertyValue::title_text),
            date: page.property(PROPS_KEY_DATE).and_then(|p| p.date_start()),
            source: text(PROPS_KEY_SOURCE, PropertyValue::rich_text_text),
            body,
        }
    }
}

/// Whether a rumor row is marked released.
pub fn is_released(page: &Page) -> bool {
    page.property(PROPS_KEY_RELEASED)
        .and_then(|p| p.select_name())
        == Some(RELEASED)
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of entries dropped after their TTL elapsed
    pub expirations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
