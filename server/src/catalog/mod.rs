//! Catalog Core
//!
//! The storage-agnostic subsystem shared by every list-returning and
//! mutating endpoint:
//!
//! - [`cursor`] - opaque keyset-pagination cursor codec
//! - [`query`] - filter predicate tree + SURQL composition
//! - [`tree`] - bounded category ancestor→descendant expansion
//! - [`page`] - offset / cursor paginated listing
//! - [`upsert`] - race-safe unique (user, product) relation upserts
//!
//! Components here hold no mutable state and talk to storage only
//! through the port traits they declare, so request handlers can call
//! them concurrently and tests can substitute in-memory fakes.

pub mod cursor;
pub mod page;
pub mod query;
pub mod tree;
pub mod upsert;

pub use cursor::PageCursor;
pub use page::{Page, PageInfo, PageRequest, RecordPage};
pub use query::{Filter, ProductFilterParams, SortKey};
pub use tree::CategoryLookup;
pub use upsert::RelationStore;

use crate::db::repository::RepoError;

/// Catalog error taxonomy
///
/// Every expected failure is a typed variant; handlers map these to
/// HTTP responses without inspecting message strings.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Malformed or contradictory request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cursor token failed to decode or references malformed data
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    /// Referenced entity absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Quantity would exceed available stock
    #[error("Capacity exceeded: requested quantity {requested}")]
    CapacityExceeded { requested: u32 },

    /// Backing store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Storage invariant violated
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepoError> for CatalogError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => CatalogError::NotFound(msg),
            RepoError::Validation(msg) => CatalogError::InvalidRequest(msg),
            RepoError::Database(msg) => CatalogError::Storage(msg),
            // Duplicate-key conflicts are consumed by the upserter's
            // retry; one escaping to here is an invariant violation.
            RepoError::Duplicate(msg) => {
                CatalogError::Internal(format!("unexpected duplicate-key conflict: {msg}"))
            }
        }
    }
}
