//! API Module
//!
//! HTTP handlers and routing for the proxy REST API.
//!
//! # Endpoints
//! - `GET /subjects` - List subjects
//! - `GET /subjects/:id` - Fetch one subject
//! - `GET /subjects/:id/rumors` - Released rumors of a subject
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
