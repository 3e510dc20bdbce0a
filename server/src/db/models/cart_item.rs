//! Cart Item Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

pub type CartItemId = Thing;

/// Cart line, unique per (user, product)
///
/// The `(user, product)` pair carries a UNIQUE index; the upserter
/// relies on the index rejecting concurrent duplicate inserts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: Option<CartItemId>,
    pub user: String,
    /// Record link to product
    pub product: Thing,
    pub quantity: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartAdd {
    pub product_id: String,
    /// Defaults to 1
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartItemUpdate {
    pub quantity: u32,
}
