//! Query-cache context.
//!
//! Pages fetch chain data through a [`QueryClient`] instead of calling the
//! gateway directly. The client:
//! - de-duplicates concurrent fetches of the same [`QueryKey`]
//! - keeps the last successful value per key for `stale_time`
//! - reports every failed fetch exactly once to the cache's `on_error` sink
//!
//! A failed query is handed back to its callers as a [`QueryError`] value;
//! it never escapes as a panic.

mod cache;
mod key;

pub use cache::{QueryCache, QueryClient, QueryDefaults};
pub use key::QueryKey;

use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum QueryError {
    /// The fetcher returned an error
    #[error("Query {key} failed: {message}")]
    Failed {
        key: QueryKey,
        message: String,
        report: Arc<eyre::Report>,
    },

    /// The fetch this caller joined was dropped before finishing
    #[error("Query {0} was cancelled")]
    Cancelled(QueryKey),

    /// Cached data under this key has another type
    #[error("Query {0} holds data of a different type")]
    TypeMismatch(QueryKey),
}

impl QueryError {
    pub const fn key(&self) -> &QueryKey {
        match self {
            Self::Failed { key, .. } | Self::Cancelled(key) | Self::TypeMismatch(key) => key,
        }
    }
}
