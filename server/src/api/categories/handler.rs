//! Category API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::convert::CategoryView;
use crate::auth::CurrentUser;
use crate::catalog::tree;
use crate::core::ServerState;
use crate::db::models::{CategoryCreate, CategoryUpdate};
use crate::db::repository::CategoryRepository;
use crate::utils::{AppError, AppResult, validation};

/// GET /api/categories - 获取所有分类
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<CategoryView>>> {
    let repo = CategoryRepository::new(state.db.clone());
    let categories = repo.find_all().await?;
    Ok(Json(categories.into_iter().map(CategoryView::from).collect()))
}

/// GET /api/categories/:id - 获取单个分类
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<CategoryView>> {
    let repo = CategoryRepository::new(state.db.clone());
    let category = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;
    Ok(Json(category.into()))
}

/// POST /api/categories - 创建分类
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<CategoryView>> {
    validation::validate_required_text(&payload.name, "name", validation::MAX_NAME_LEN)?;

    let repo = CategoryRepository::new(state.db.clone());
    let category = repo.create(payload).await?;
    tracing::info!(user = %user.id, category = ?category.id, "category created");
    Ok(Json(category.into()))
}

/// PUT /api/categories/:id - 更新分类
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<CategoryView>> {
    if let Some(name) = &payload.name {
        validation::validate_required_text(name, "name", validation::MAX_NAME_LEN)?;
    }

    let repo = CategoryRepository::new(state.db.clone());
    let category = repo.update(&id, payload).await?;
    tracing::info!(user = %user.id, category = %id, "category updated");
    Ok(Json(category.into()))
}

/// DELETE /api/categories/:id - 删除分类
///
/// 仍被商品引用的分类拒绝删除。
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<CategoryView>> {
    let repo = CategoryRepository::new(state.db.clone());
    let category = repo.delete(&id).await?;
    tracing::info!(user = %user.id, category = %id, "category deleted");
    Ok(Json(category.into()))
}

#[derive(Debug, Deserialize)]
pub struct DescendantsQuery {
    pub max_depth: Option<u32>,
    #[serde(default)]
    pub include_self: bool,
}

/// GET /api/categories/:id/descendants - 展开子孙分类集合
pub async fn descendants(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<DescendantsQuery>,
) -> AppResult<Json<Vec<String>>> {
    let repo = CategoryRepository::new(state.db.clone());
    let category = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;

    // walk from the canonical "category:key" form so the result set is
    // uniformly prefixed
    let ancestor = category
        .id
        .as_ref()
        .map(|t| t.to_string())
        .ok_or_else(|| AppError::internal("stored category has no id"))?;
    let set = tree::descendants(&repo, &ancestor, query.max_depth, query.include_self).await?;
    let mut ids: Vec<String> = set.into_iter().collect();
    ids.sort();
    Ok(Json(ids))
}
