//! Cache Module
//!
//! In-memory expiring cache and the read-through loader built on top of it.

mod entry;
mod loader;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use loader::{ReadThrough, LOAD_TTL};
pub use stats::CacheStats;
pub use store::ExpiringCache;
