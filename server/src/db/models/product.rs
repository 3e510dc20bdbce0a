//! Product Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

pub type ProductId = Thing;

/// Product model
///
/// `created_at` is stored as epoch milliseconds so that keyset
/// pagination can compare it numerically in queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Image filename or URL (empty when no image is attached)
    #[serde(default)]
    pub image: String,
    /// Record link to category
    pub category: Thing,
    pub price: f64,
    #[serde(default)]
    pub stock: u32,
    /// Average review rating, 0..=5
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub num_reviews: u32,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Category id, "category:xyz" or bare key
    pub category: String,
    pub price: f64,
    pub stock: Option<u32>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<u32>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
}
