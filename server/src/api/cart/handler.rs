//! Cart API Handlers
//!
//! 每个用户对同一商品只有一行购物车记录。并发加购由 `(user,
//! product)` 唯一索引和一次性的冲突重试收敛，而不是事务。

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::api::convert::CartItemView;
use crate::auth::CurrentUser;
use crate::catalog::upsert;
use crate::core::ServerState;
use crate::db::models::{CartAdd, CartItemUpdate, Product};
use crate::db::repository::{CartRepository, ProductRepository};
use crate::utils::{AppError, AppResult, validation};

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: u64,
}

/// GET /api/cart - 当前用户的购物车
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<CartItemView>>> {
    let repo = CartRepository::new(state.db.clone());
    let items = repo.find_all_for_user(&user.id).await?;
    Ok(Json(items.into_iter().map(CartItemView::from).collect()))
}

/// POST /api/cart/items - 加购 (存在则累加数量)
pub async fn add(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CartAdd>,
) -> AppResult<Json<CartItemView>> {
    let quantity = payload.quantity.unwrap_or(1);
    validation::validate_quantity(quantity, "quantity")?;

    let product = require_active_product(&state, &payload.product_id).await?;
    let stock = product.stock;

    let repo = CartRepository::new(state.db.clone());
    let item = upsert::add_or_increment(&repo, &user.id, &payload.product_id, quantity, |q| {
        q <= stock && q <= validation::MAX_QUANTITY
    })
    .await?;
    Ok(Json(item.into()))
}

/// PUT /api/cart/items/:id - 直接设置数量
pub async fn set_quantity(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CartItemUpdate>,
) -> AppResult<Json<CartItemView>> {
    validation::validate_quantity(payload.quantity, "quantity")?;

    let repo = CartRepository::new(state.db.clone());
    let item = repo
        .find_by_id_for_user(&id, &user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Cart item {id} not found")))?;

    let products = ProductRepository::new(state.db.clone());
    let product = products
        .find_by_id(&item.product.to_string())
        .await?
        .ok_or_else(|| AppError::not_found("Product no longer exists"))?;
    if payload.quantity > product.stock {
        return Err(AppError::BusinessRule(format!(
            "Requested quantity {} exceeds available stock",
            payload.quantity
        )));
    }

    let updated = repo
        .set_quantity(&id, &user.id, payload.quantity)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Cart item {id} not found")))?;
    Ok(Json(updated.into()))
}

/// DELETE /api/cart/items/:id - 移除一项
pub async fn remove(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = CartRepository::new(state.db.clone());
    let removed = repo.delete_for_user(&id, &user.id).await?;
    if !removed {
        return Err(AppError::not_found(format!("Cart item {id} not found")));
    }
    Ok(Json(true))
}

/// DELETE /api/cart - 清空购物车
pub async fn clear(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ClearResponse>> {
    let repo = CartRepository::new(state.db.clone());
    let removed = repo.clear(&user.id).await?;
    Ok(Json(ClearResponse { removed }))
}

async fn require_active_product(state: &ServerState, id: &str) -> Result<Product, AppError> {
    let products = ProductRepository::new(state.db.clone());
    let product = products
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id} not found")))?;
    if !product.is_active {
        return Err(AppError::not_found(format!("Product {id} not found")));
    }
    Ok(product)
}
