//! Repository Module
//!
//! CRUD and query access to the SurrealDB tables. Repositories are
//! thin, parameterized-SURQL adapters; everything order- and
//! uniqueness-sensitive goes through the catalog core's ports which
//! these types implement.

pub mod cart;
pub mod category;
pub mod product;
pub mod wishlist;

// Re-exports
pub use cart::CartRepository;
pub use category::CategoryRepository;
pub use product::ProductRepository;
pub use wishlist::WishlistRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::sql::Thing;
use thiserror::Error;

/// Repository error types
///
/// `Duplicate` is the distinguishable unique-index violation the
/// upserter's retry protocol keys on.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Classify a write failure: unique-index violations become
/// [`RepoError::Duplicate`], everything else stays a database error.
pub fn map_write_err(err: surrealdb::Error) -> RepoError {
    let msg = err.to_string();
    if msg.contains("already contains") {
        RepoError::Duplicate(msg)
    } else {
        RepoError::Database(msg)
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Strip a "table:" prefix so ids can arrive in either form
pub fn strip_table_prefix<'a>(table: &str, id: &'a str) -> &'a str {
    id.strip_prefix(format!("{table}:").as_str()).unwrap_or(id)
}

/// Build a Thing from a bare key or "table:key" string
pub fn make_thing(table: &str, id: &str) -> Thing {
    Thing::from((table, strip_table_prefix(table, id)))
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
