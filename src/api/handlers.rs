//! API Handlers
//!
//! HTTP request handlers for each proxy endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::ExpiringCache;
use crate::config::Config;
use crate::error::Result;
use crate::models::{is_released, HealthResponse, RumorResponse, StatsResponse, SubjectResponse};
use crate::notion::{CachedDocument, CachedDocuments, DocumentSource, NotionClient};

/// Application state shared across all handlers.
///
/// Built once at startup; the cache inside is shared with the cleanup task.
#[derive(Clone)]
pub struct AppState {
    /// Notion reads behind the read-through cache
    pub documents: CachedDocuments,
    /// Block whose child databases are the subjects
    pub root_block_id: Arc<str>,
}

impl AppState {
    /// Creates a new AppState over `source` with an empty cache.
    pub fn new(source: Arc<dyn DocumentSource>, root_block_id: impl Into<Arc<str>>) -> Self {
        Self {
            documents: CachedDocuments::new(source, Arc::new(ExpiringCache::new())),
            root_block_id: root_block_id.into(),
        }
    }

    /// Creates a new AppState backed by the Notion API.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = NotionClient::from_config(config)?;
        Ok(Self::new(Arc::new(client), config.root_block_id.as_str()))
    }

    /// The shared document cache.
    pub fn cache(&self) -> Arc<ExpiringCache<CachedDocument>> {
        Arc::clone(self.documents.cache())
    }
}

/// Handler for GET /subjects
///
/// Lists every inline database under the root block.
pub async fn subjects_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubjectResponse>>> {
    let root = state.documents.block_children(&state.root_block_id).await?;

    let mut subjects = Vec::new();
    for block in root.results.iter().filter(|b| b.is_child_database()) {
        let database = state.documents.database(&block.id).await?;
        subjects.push(SubjectResponse::from_database(
            &block.id,
            &database,
            block.last_edited_time,
        ));
    }

    Ok(Json(subjects))
}

/// Handler for GET /subjects/:id
pub async fn subject_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SubjectResponse>> {
    let database = state.documents.database(&id).await?;

    Ok(Json(SubjectResponse::from_database(
        &database.id,
        &database,
        database.last_edited_time,
    )))
}

/// Handler for GET /subjects/:id/rumors
///
/// Returns released rumors in the order the query sorted them (newest first).
pub async fn rumors_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<RumorResponse>>> {
    let query = state.documents.query_database(&id).await?;

    let mut rumors = Vec::new();
    for page in query.results.iter().filter(|p| is_released(p)) {
        let children = state.documents.block_children(&page.id).await?;
        rumors.push(RumorResponse::from_page(page, &children.results));
    }

    Ok(Json(rumors))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.documents.cache().stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
