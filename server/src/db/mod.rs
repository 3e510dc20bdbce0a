//! Database Module
//!
//! Embedded SurrealDB storage: connection bootstrap and schema.

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "storefront";
const DATABASE: &str = "main";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the RocksDB-backed database at `path` and
    /// apply the schema.
    pub async fn open(path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        apply_schema(&db).await?;
        tracing::info!("Database ready at {path}");

        Ok(Self { db })
    }
}

/// Idempotent schema: tables plus the indexes the core relies on.
///
/// The UNIQUE `(user, product)` indexes are the uniqueness constraint
/// the upserter's conflict-retry protocol depends on.
pub async fn apply_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        "
        DEFINE TABLE IF NOT EXISTS category SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS category_name ON TABLE category COLUMNS name UNIQUE;

        DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS product_created_at ON TABLE product COLUMNS created_at;
        DEFINE INDEX IF NOT EXISTS product_category ON TABLE product COLUMNS category;

        DEFINE TABLE IF NOT EXISTS cart_item SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS cart_item_user_product ON TABLE cart_item COLUMNS user, product UNIQUE;

        DEFINE TABLE IF NOT EXISTS wishlist_entry SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS wishlist_entry_user_product ON TABLE wishlist_entry COLUMNS user, product UNIQUE;
        ",
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?
    .check()
    .map_err(|e| AppError::database(format!("Schema statement failed: {e}")))?;
    Ok(())
}

#[cfg(test)]
pub async fn memory_db() -> Surreal<Db> {
    use surrealdb::engine::local::Mem;

    let db = Surreal::new::<Mem>(()).await.expect("in-memory db");
    db.use_ns("test").use_db("test").await.expect("ns/db");
    apply_schema(&db).await.expect("schema");
    db
}
