//! Response models for the proxy API
//!
//! This module defines the JSON shapes served to the frontend and the
//! reshaping from Notion documents into them.

pub mod responses;

// Re-export commonly used types
pub use responses::{
    is_released, HealthResponse, RumorResponse, StatsResponse, SubjectResponse, PROPS_KEY_DATE,
    PROPS_KEY_RELEASED, PROPS_KEY_SOURCE, PROPS_KEY_TITLE, RELEASED,
};
