//! 类型转换模块
//!
//! 将数据库模型 (db::models) 转换为 API 响应模型。数据库里的
//! record link (Thing) 对外统一呈现为 "table:key" 字符串。

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::models as db;

// ============ Helper ============

pub fn thing_to_string(thing: &surrealdb::sql::Thing) -> String {
    thing.to_string()
}

pub fn option_thing_to_string(thing: &Option<surrealdb::sql::Thing>) -> Option<String> {
    thing.as_ref().map(thing_to_string)
}

// ============ Product ============

#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub image: String,
    pub category: String,
    pub price: f64,
    pub stock: u32,
    pub rating: f64,
    pub num_reviews: u32,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<db::Product> for ProductView {
    fn from(p: db::Product) -> Self {
        Self {
            id: option_thing_to_string(&p.id),
            name: p.name,
            description: p.description,
            image: p.image,
            category: thing_to_string(&p.category),
            price: p.price,
            stock: p.stock,
            rating: p.rating,
            num_reviews: p.num_reviews,
            is_featured: p.is_featured,
            is_active: p.is_active,
            created_at: p.created_at,
        }
    }
}

// ============ Category ============

#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: Option<String>,
    pub name: String,
    pub parent: Option<String>,
}

impl From<db::Category> for CategoryView {
    fn from(c: db::Category) -> Self {
        Self {
            id: option_thing_to_string(&c.id),
            name: c.name,
            parent: option_thing_to_string(&c.parent),
        }
    }
}

// ============ Cart ============

#[derive(Debug, Serialize)]
pub struct CartItemView {
    pub id: Option<String>,
    pub product: String,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
}

impl From<db::CartItem> for CartItemView {
    fn from(i: db::CartItem) -> Self {
        Self {
            id: option_thing_to_string(&i.id),
            product: thing_to_string(&i.product),
            quantity: i.quantity,
            created_at: i.created_at,
        }
    }
}

// ============ Wishlist ============

#[derive(Debug, Serialize)]
pub struct WishlistEntryView {
    pub id: Option<String>,
    pub product: String,
    pub created_at: DateTime<Utc>,
}

impl From<db::WishlistEntry> for WishlistEntryView {
    fn from(e: db::WishlistEntry) -> Self {
        Self {
            id: option_thing_to_string(&e.id),
            product: thing_to_string(&e.product),
            created_at: e.created_at,
        }
    }
}
