//! Product API Handlers
//!
//! 商品列表支持两种分页模式：
//! - offset: `?mode=offset&page=2&limit=10`，返回总数和总页数
//! - cursor: `?mode=cursor&cursor=...&limit=10`，稳定分页，写入不会
//!   造成跨页重复或遗漏
//!
//! 带 `cursor` 参数的请求默认进入 cursor 模式。

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::convert::ProductView;
use crate::auth::CurrentUser;
use crate::catalog::page::{self, Page, PageRequest};
use crate::catalog::query::{self, ProductFilterParams, SortKey};
use crate::catalog::tree;
use crate::core::ServerState;
use crate::db::models::{ProductCreate, ProductUpdate};
use crate::db::repository::{CategoryRepository, ProductRepository};
use crate::utils::{AppError, AppResult, validation};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageMode {
    #[default]
    Offset,
    Cursor,
}

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub mode: Option<PageMode>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub cursor: Option<String>,
    #[serde(default)]
    pub sort: SortKey,

    pub category: Option<String>,
    /// Expand this category's subtree and match any of it
    pub ancestor: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
    pub featured: Option<bool>,
    pub search: Option<String>,
}

/// GET /api/products - 商品列表 (过滤 + 排序 + 分页)
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ProductListQuery>,
) -> AppResult<Json<Page<ProductView>>> {
    if q.category.is_some() && q.ancestor.is_some() {
        return Err(AppError::validation(
            "category and ancestor filters are mutually exclusive",
        ));
    }
    validation::validate_optional_text(&q.search, "search", validation::MAX_SEARCH_LEN)?;

    // ancestor expansion runs before filter composition
    let category_descendants = match &q.ancestor {
        Some(ancestor) => {
            let categories = CategoryRepository::new(state.db.clone());
            let root = categories
                .find_by_id(ancestor)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Category {ancestor} not found")))?;
            let root_id = root
                .id
                .as_ref()
                .map(|t| t.to_string())
                .ok_or_else(|| AppError::internal("stored category has no id"))?;
            let set = tree::descendants(&categories, &root_id, None, true).await?;
            Some(set.into_iter().collect())
        }
        None => None,
    };

    let base = query::compose(&ProductFilterParams {
        category: q.category.clone(),
        category_descendants,
        min_price: q.min_price,
        max_price: q.max_price,
        min_rating: q.min_rating,
        featured: q.featured,
        search: q.search.clone(),
    })?;

    let mode = match q.mode {
        Some(mode) => mode,
        None if q.cursor.is_some() => PageMode::Cursor,
        None => PageMode::Offset,
    };
    let request = match mode {
        PageMode::Offset => {
            if q.cursor.is_some() {
                return Err(AppError::validation("cursor is only valid in cursor mode"));
            }
            PageRequest::Offset {
                page: q.page.unwrap_or(1),
                limit: q.limit.unwrap_or(0),
            }
        }
        PageMode::Cursor => {
            if q.page.is_some() {
                return Err(AppError::validation("page is only valid in offset mode"));
            }
            PageRequest::Cursor {
                cursor: q.cursor.clone(),
                limit: q.limit.unwrap_or(0),
            }
        }
    };

    let repo = ProductRepository::new(state.db.clone());
    let page = page::list(&repo, &base, q.sort, request).await?;
    Ok(Json(page.map(ProductView::from)))
}

/// GET /api/products/:id - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductView>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id} not found")))?;
    Ok(Json(product.into()))
}

/// POST /api/products - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<ProductView>> {
    validation::validate_required_text(&payload.name, "name", validation::MAX_NAME_LEN)?;
    validation::validate_optional_text(
        &payload.description,
        "description",
        validation::MAX_DESCRIPTION_LEN,
    )?;
    validation::validate_optional_text(&payload.image, "image", validation::MAX_URL_LEN)?;
    validation::validate_price(payload.price, "price")?;

    let categories = CategoryRepository::new(state.db.clone());
    if categories.find_by_id(&payload.category).await?.is_none() {
        return Err(AppError::validation(format!(
            "Category {} not found",
            payload.category
        )));
    }

    let repo = ProductRepository::new(state.db.clone());
    let product = repo.create(payload).await?;
    tracing::info!(user = %user.id, product = ?product.id, "product created");
    Ok(Json(product.into()))
}

/// PUT /api/products/:id - 更新商品
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<ProductView>> {
    if let Some(name) = &payload.name {
        validation::validate_required_text(name, "name", validation::MAX_NAME_LEN)?;
    }
    validation::validate_optional_text(
        &payload.description,
        "description",
        validation::MAX_DESCRIPTION_LEN,
    )?;
    validation::validate_optional_text(&payload.image, "image", validation::MAX_URL_LEN)?;
    if let Some(price) = payload.price {
        validation::validate_price(price, "price")?;
    }
    if let Some(category) = &payload.category {
        let categories = CategoryRepository::new(state.db.clone());
        if categories.find_by_id(category).await?.is_none() {
            return Err(AppError::validation(format!("Category {category} not found")));
        }
    }

    let repo = ProductRepository::new(state.db.clone());
    let product = repo.update(&id, payload).await?;
    tracing::info!(user = %user.id, product = %id, "product updated");
    Ok(Json(product.into()))
}

/// DELETE /api/products/:id - 删除商品并清理图片文件
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ProductView>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo.delete(&id).await?;

    // external URLs are not ours to delete
    if !product.image.is_empty() && !product.image.contains("://") {
        if let Err(e) = state.image_store.delete(&product.image).await {
            tracing::warn!(product = %id, error = %e, "failed to remove product image");
        }
    }

    tracing::info!(user = %user.id, product = %id, "product deleted");
    Ok(Json(product.into()))
}
