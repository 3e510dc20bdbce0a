//! Wishlist Entry Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

pub type WishlistEntryId = Thing;

/// Wishlist entry, unique per (user, product)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub id: Option<WishlistEntryId>,
    pub user: String,
    /// Record link to product
    pub product: Thing,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WishlistAdd {
    pub product_id: String,
}
