//! Error types for the proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

// == App Error Enum ==
/// Failure to produce a response from upstream data.
#[derive(Error, Debug)]
pub enum AppError {
    /// Transport or decode failure talking to the document API
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// The document API answered with a non-success status
    #[error("upstream returned {status}: {body}")]
    UpstreamStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
/// Every failure is logged and surfaced as a bare 500 with no body.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the proxy.
pub type Result<T> = std::result::Result<T, AppError>;
