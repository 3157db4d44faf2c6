//! Notion HTTP client
//!
//! Issues the three read calls the proxy needs against the Notion REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::notion::{BlockChildren, Database, DatabaseQuery, DocumentSource};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const NOTION_VERSION_HEADER: &str = "notion-version";
const USER_AGENT: &str = concat!("rumor_proxy/", env!("CARGO_PKG_VERSION"));

/// Property rumors are sorted by, newest first.
pub const SORT_PROPERTY: &str = "Date";

/// Notion API client authenticated with a static integration key.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: reqwest::Client,
    base_url: Url,
}

impl NotionClient {
    /// Creates a client for `base_url` that sends `api_key` as the bearer
    /// token and `version` as the `Notion-Version` header.
    pub fn new(base_url: &str, api_key: &str, version: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            AppError::Internal(format!("invalid Notion base URL {base_url}: {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Internal(format!("Notion base URL {base_url} has no path")));
        }

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| AppError::Internal(format!("invalid API key header: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            HeaderName::from_static(NOTION_VERSION_HEADER),
            HeaderValue::from_str(version)
                .map_err(|e| AppError::Internal(format!("invalid Notion-Version header: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.notion_base_url, &config.api_key, &config.notion_version)
    }

    /// Builds an API URL from path segments.
    ///
    /// Each segment is percent-encoded as a single segment, so an id carrying
    /// `/` stays inside its segment. Empty and dot segments are rejected.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(AppError::Internal(format!("invalid Notion path segment {bad:?}")));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Notion base URL has no path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Notion API returned an error status");
            return Err(AppError::UpstreamStatus { status, body });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DocumentSource for NotionClient {
    async fn block_children(&self, block_id: &str) -> Result<BlockChildren> {
        let url = self.endpoint(&["v1", "blocks", block_id, "children"])?;
        debug!(block_id, "fetching block children");

        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }

    async fn database(&self, database_id: &str) -> Result<Database> {
        let url = self.endpoint(&["v1", "databases", database_id])?;
        debug!(database_id, "fetching database");

        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }

    async fn query_database(&self, database_id: &str) -> Result<DatabaseQuery> {
        let url = self.endpoint(&["v1", "databases", database_id, "query"])?;
        debug!(database_id, "querying database");

        let body = json!({
            "sorts": [{ "property": SORT_PROPERTY, "direction": "descending" }]
        });
        let response = self.client.post(url).json(&body).send().await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> NotionClient {
        NotionClient::new(base_url, "secret", "2022-06-28").unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let url = client("http://localhost:9000/").endpoint(&["v1", "blocks", "root", "children"]);
        assert_eq!(url.unwrap().as_str(), "http://localhost:9000/v1/blocks/root/children");

        let url = client("http://localhost:9000").endpoint(&["v1", "databases", "abc"]);
        assert_eq!(url.unwrap().as_str(), "http://localhost:9000/v1/databases/abc");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = client("http://localhost:9000/notion/").endpoint(&["v1", "databases", "abc"]);
        assert_eq!(url.unwrap().as_str(), "http://localhost:9000/notion/v1/databases/abc");
    }

    #[test]
    fn test_endpoint_encodes_id_as_one_segment() {
        let url = client("http://localhost:9000")
            .endpoint(&["v1", "databases", "../users/user-42", "query"])
            .unwrap();

        assert_eq!(url.path(), "/v1/databases/..%2Fusers%2Fuser-42/query");
    }

    #[test]
    fn test_endpoint_rejects_dot_segments() {
        let client = client("http://localhost:9000");
        for id in ["", ".", ".."] {
            let err = client.endpoint(&["v1", "databases", id]).unwrap_err();
            assert!(matches!(err, AppError::Internal(_)), "id {id:?}");
        }
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        assert!(NotionClient::new("not a url", "secret", "2022-06-28").is_err());
        assert!(NotionClient::new("mailto:ops@example.com", "secret", "2022-06-28").is_err());
    }

    #[test]
    fn test_client_rejects_unprintable_key() {
        let err = NotionClient::new("http://localhost", "bad\nkey", "2022-06-28").unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_client_from_config() {
        let config = Config {
            api_key: "secret".to_string(),
            root_block_id: "root".to_string(),
            server_port: 8080,
            cleanup_interval: 600,
            notion_base_url: "https://api.notion.com".to_string(),
            notion_version: "2022-06-28".to_string(),
        };
        let client = NotionClient::from_config(&config).unwrap();
        assert_eq!(client.base_url.as_str(), "https://api.notion.com/");
    }
}
