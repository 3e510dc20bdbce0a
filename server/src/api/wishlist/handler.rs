//! Wishlist API Handlers
//!
//! 收藏是幂等的：重复添加返回已有记录。

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::convert::WishlistEntryView;
use crate::auth::CurrentUser;
use crate::catalog::upsert;
use crate::core::ServerState;
use crate::db::models::WishlistAdd;
use crate::db::repository::{ProductRepository, WishlistRepository};
use crate::utils::{AppError, AppResult};

/// GET /api/wishlist - 当前用户的收藏
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<WishlistEntryView>>> {
    let repo = WishlistRepository::new(state.db.clone());
    let entries = repo.find_all_for_user(&user.id).await?;
    Ok(Json(
        entries.into_iter().map(WishlistEntryView::from).collect(),
    ))
}

/// POST /api/wishlist - 添加收藏 (幂等)
pub async fn add(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<WishlistAdd>,
) -> AppResult<Json<WishlistEntryView>> {
    let products = ProductRepository::new(state.db.clone());
    let product = products
        .find_by_id(&payload.product_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", payload.product_id)))?;
    if !product.is_active {
        return Err(AppError::not_found(format!(
            "Product {} not found",
            payload.product_id
        )));
    }

    let repo = WishlistRepository::new(state.db.clone());
    let entry = upsert::add_unique(&repo, &user.id, &payload.product_id).await?;
    Ok(Json(entry.into()))
}

/// DELETE /api/wishlist/:id - 移除收藏
pub async fn remove(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = WishlistRepository::new(state.db.clone());
    let removed = repo.delete_for_user(&id, &user.id).await?;
    if !removed {
        return Err(AppError::not_found(format!("Wishlist entry {id} not found")));
    }
    Ok(Json(true))
}
