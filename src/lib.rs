//! Rumor Proxy - A read-only JSON front for Notion databases
//!
//! Lists subjects and their released rumors from a Notion workspace, serving
//! repeated reads from a short-TTL read-through cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod notion;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
