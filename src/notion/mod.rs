//! Notion Module
//!
//! Typed access to the Notion API: the wire types, the HTTP client and the
//! cached front the handlers go through.

mod cached;
mod client;
mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use cached::{block_key, database_key, database_query_key, CachedDocument, CachedDocuments};
pub use client::{NotionClient, SORT_PROPERTY};
pub use types::{
    first_plain_text, Block, BlockChildren, Database, DatabaseQuery, DateValue, Page, Paragraph,
    PropertyValue, RichText, SelectOption, BLOCK_TYPE_CHILD_DATABASE, BLOCK_TYPE_UNSUPPORTED,
};

// == Document Source ==
/// The read operations the proxy performs against the document store.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Lists the children of a block or page.
    async fn block_children(&self, block_id: &str) -> Result<BlockChildren>;

    /// Fetches a database's metadata.
    async fn database(&self, database_id: &str) -> Result<Database>;

    /// Queries a database's rows, newest `Date` first.
    async fn query_database(&self, database_id: &str) -> Result<DatabaseQuery>;
}
