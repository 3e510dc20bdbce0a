//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`products`] - 商品目录接口
//! - [`categories`] - 分类管理接口
//! - [`cart`] - 购物车接口
//! - [`wishlist`] - 收藏清单接口
//! - [`upload`] - 图片上传与读取接口

pub mod convert;

pub mod cart;
pub mod categories;
pub mod health;
pub mod products;
pub mod upload;
pub mod wishlist;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
