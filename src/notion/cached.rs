//! Cached document access
//!
//! Routes the three document reads through one shared read-through cache.
//! Keys are namespaced by call kind.

use std::sync::Arc;

use crate::cache::{ExpiringCache, ReadThrough};
use crate::error::{AppError, Result};
use crate::notion::{BlockChildren, Database, DatabaseQuery, DocumentSource};

// == Cached Document ==
/// The closed set of upstream results that share the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedDocument {
    BlockChildren(BlockChildren),
    Database(Database),
    DatabaseQuery(DatabaseQuery),
}

pub fn block_key(block_id: &str) -> String {
    format!("block-{block_id}")
}

pub fn database_key(database_id: &str) -> String {
    format!("database-{database_id}")
}

pub fn database_query_key(database_id: &str) -> String {
    format!("database-query-{database_id}")
}

/// A cached value under `key` holds another call's result.
///
/// Keys are prefixed per call kind, but the prefixes overlap: the database
/// `query-x` and the rows of database `x` both live under `database-query-x`.
fn kind_mismatch(key: &str) -> AppError {
    AppError::Internal(format!("cached value under {key} has the wrong kind"))
}

// == Cached Documents ==
/// A [`DocumentSource`] fronted by a read-through cache.
#[derive(Clone)]
pub struct CachedDocuments {
    source: Arc<dyn DocumentSource>,
    loader: ReadThrough<CachedDocument>,
}

impl CachedDocuments {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        cache: Arc<ExpiringCache<CachedDocument>>,
    ) -> Self {
        Self {
            source,
            loader: ReadThrough::new(cache),
        }
    }

    pub fn cache(&self) -> &Arc<ExpiringCache<CachedDocument>> {
        self.loader.cache()
    }

    pub async fn block_children(&self, block_id: &str) -> Result<BlockChildren> {
        let key = block_key(block_id);
        let doc = self
            .loader
            .load(&key, move || async move {
                self.source
                    .block_children(block_id)
                    .await
                    .map(CachedDocument::BlockChildren)
            })
            .await?;

        match doc {
            CachedDocument::BlockChildren(children) => Ok(children),
            _ => Err(kind_mismatch(&key)),
        }
    }

    pub async fn database(&self, database_id: &str) -> Result<Database> {
        let key = database_key(database_id);
        let doc = self
            .loader
            .load(&key, move || async move {
                self.source
                    .database(database_id)
                    .await
                    .map(CachedDocument::Database)
            })
            .await?;

        match doc {
            CachedDocument::Database(database) => Ok(database),
            _ => Err(kind_mismatch(&key)),
        }
    }

    pub async fn query_database(&self, database_id: &str) -> Result<DatabaseQuery> {
        let key = database_query_key(database_id);
        let doc = self
            .loader
            .load(&key, move || async move {
                self.source
                    .query_database(database_id)
                    .await
                    .map(CachedDocument::DatabaseQuery)
            })
            .await?;

        match doc {
            CachedDocument::DatabaseQuery(query) => Ok(query),
            _ => Err(kind_mismatch(&key)),
        }
    }
}
