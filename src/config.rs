//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

use thiserror::Error;

/// Default Notion API endpoint.
pub const DEFAULT_NOTION_BASE_URL: &str = "https://api.notion.com";
/// API version sent in the `Notion-Version` header.
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Startup configuration failures.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret sent as the bearer token to the Notion API
    pub api_key: String,
    /// Block whose child databases are listed as subjects
    pub root_block_id: String,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Notion API base URL, without a trailing slash
    pub notion_base_url: String,
    /// Value of the `Notion-Version` header
    pub notion_version: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `NOTION_API_KEY` - Notion integration secret (required)
    /// - `ROOT_BLOCK_ID` - Root block holding the subject databases (required)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 600)
    /// - `NOTION_BASE_URL` - API endpoint (default: https://api.notion.com)
    /// - `NOTION_VERSION` - API version header (default: 2022-06-28)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        Ok(Self {
            api_key: required("NOTION_API_KEY")?,
            root_block_id: required("ROOT_BLOCK_ID")?,
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            cleanup_interval: parse_or(&lookup, "CLEANUP_INTERVAL", 600)?,
            notion_base_url: lookup("NOTION_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_NOTION_BASE_URL.to_string()),
            notion_version: lookup("NOTION_VERSION")
                .unwrap_or_else(|| DEFAULT_NOTION_VERSION.to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
