//! Database Models

// Catalog
pub mod category;
pub mod product;

// Per-user relations
pub mod cart_item;
pub mod wishlist;

// Re-exports
pub use cart_item::{CartAdd, CartItem, CartItemId, CartItemUpdate};
pub use category::{Category, CategoryCreate, CategoryId, CategoryUpdate};
pub use product::{Product, ProductCreate, ProductId, ProductUpdate};
pub use wishlist::{WishlistAdd, WishlistEntry, WishlistEntryId};
