//! Notion wire types
//!
//! Only the fields the proxy reads are modelled; everything else in the API
//! payloads is ignored during deserialization.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

/// Block type Notion reports for an inline database.
pub const BLOCK_TYPE_CHILD_DATABASE: &str = "child_database";
/// Block type older API versions report for inline databases.
pub const BLOCK_TYPE_UNSUPPORTED: &str = "unsupported";

// == Rich Text ==
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

/// First plain-text segment of a rich text array, if any.
pub fn first_plain_text(texts: &[RichText]) -> Option<&str> {
    texts.first().map(|t| t.plain_text.as_str())
}

// == Blocks ==
/// Response of `GET /v1/blocks/{id}/children`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockChildren {
    #[serde(default)]
    pub results: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub last_edited_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub paragraph: Option<Paragraph>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Paragraph {
    #[serde(default, alias = "text")]
    pub rich_text: Vec<RichText>,
}

impl Block {
    /// Whether this block is an inline database.
    pub fn is_child_database(&self) -> bool {
        self.kind == BLOCK_TYPE_CHILD_DATABASE || self.kind == BLOCK_TYPE_UNSUPPORTED
    }

    /// First plain-text segment of a paragraph block with text.
    pub fn paragraph_text(&self) -> Option<&str> {
        self.paragraph
            .as_ref()
            .and_then(|p| first_plain_text(&p.rich_text))
    }
}

// == Databases ==
/// Response of `GET /v1/databases/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Database {
    pub id: String,
    #[serde(default)]
    pub title: Vec<RichText>,
    #[serde(default)]
    pub last_edited_time: Option<DateTime<Utc>>,
}

/// Response of `POST /v1/databases/{id}/query`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatabaseQuery {
    #[serde(default)]
    pub results: Vec<Page>,
}

/// A database row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

impl Page {
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

// == Property Values ==
/// A typed page property. Only the slot matching its type is populated.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PropertyValue {
    #[serde(default)]
    pub title: Option<Vec<RichText>>,
    #[serde(default)]
    pub rich_text: Option<Vec<RichText>>,
    #[serde(default)]
    pub select: Option<SelectOption>,
    #[serde(default)]
    pub date: Option<DateValue>,
}

impl PropertyValue {
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_deref().and_then(first_plain_text)
    }

    pub fn rich_text_text(&self) -> Option<&str> {
        self.rich_text.as_deref().and_then(first_plain_text)
    }

    pub fn select_name(&self) -> Option<&str> {
        self.select.as_ref().map(|s| s.name.as_str())
    }

    pub fn date_start(&self) -> Option<DateTime<Utc>> {
        self.date.as_ref().and_then(DateValue::start_time)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DateValue {
    pub start: String,
}

impl DateValue {
    /// Parses `start` as RFC 3339, or as a bare date at midnight UTC.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.start) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(&self.start, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}
