//! Product Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{BaseRepository, RepoError, RepoResult, make_thing, strip_table_prefix};
use crate::catalog::page::{PageAnchor, RecordPage};
use crate::catalog::query::{Filter, SortKey};
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let product: Option<Product> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(product)
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let product = Product {
            id: None,
            name: data.name,
            description: data.description.unwrap_or_default(),
            image: data.image.unwrap_or_default(),
            category: make_thing("category", &data.category),
            price: data.price,
            stock: data.stock.unwrap_or(0),
            rating: 0.0,
            num_reviews: 0,
            is_featured: data.is_featured.unwrap_or(false),
            is_active: true,
            created_at: Utc::now(),
        };

        let created: Option<Product> = self.base.db().create(TABLE).content(product).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let pure_id = strip_table_prefix(TABLE, id);
        let thing = make_thing(TABLE, pure_id);

        // Build dynamic SET clauses with proper type bindings
        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.description.is_some() {
            set_parts.push("description = $description");
        }
        if data.image.is_some() {
            set_parts.push("image = $image");
        }
        if data.category.is_some() {
            set_parts.push("category = $category");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if data.stock.is_some() {
            set_parts.push("stock = $stock");
        }
        if data.is_featured.is_some() {
            set_parts.push("is_featured = $is_featured");
        }
        if data.is_active.is_some() {
            set_parts.push("is_active = $is_active");
        }

        if set_parts.is_empty() {
            // No fields to update
            return self
                .find_by_id(pure_id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")));
        }

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));

        let mut query = self.base.db().query(query_str).bind(("thing", thing));
        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.description {
            query = query.bind(("description", v));
        }
        if let Some(v) = data.image {
            query = query.bind(("image", v));
        }
        if let Some(v) = data.category {
            query = query.bind(("category", make_thing("category", &v)));
        }
        if let Some(v) = data.price {
            query = query.bind(("price", v));
        }
        if let Some(v) = data.stock {
            query = query.bind(("stock", v));
        }
        if let Some(v) = data.is_featured {
            query = query.bind(("is_featured", v));
        }
        if let Some(v) = data.is_active {
            query = query.bind(("is_active", v));
        }

        let products: Vec<Product> = query.await?.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
    }

    /// Hard delete a product; returns the deleted row so callers can
    /// clean up attached assets.
    pub async fn delete(&self, id: &str) -> RepoResult<Product> {
        let pure_id = strip_table_prefix(TABLE, id);
        let deleted: Option<Product> = self.base.db().delete((TABLE, pure_id)).await?;
        deleted.ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
    }
}

impl PageAnchor for Product {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn anchor_id(&self) -> Option<String> {
        self.id.as_ref().map(|t| t.to_string())
    }
}

#[async_trait]
impl RecordPage for ProductRepository {
    type Item = Product;

    async fn find(
        &self,
        filter: &Filter,
        sort: SortKey,
        start: Option<u64>,
        limit: u64,
    ) -> RepoResult<Vec<Product>> {
        let rendered = filter.to_surql(TABLE);

        let mut sql = String::from("SELECT * FROM product");
        if !rendered.clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&rendered.clause);
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(sort.order_clause());
        sql.push_str(" LIMIT $limit");
        if start.is_some() {
            sql.push_str(" START $start");
        }

        let mut query = self.base.db().query(sql).bind(("limit", limit));
        if let Some(start) = start {
            query = query.bind(("start", start));
        }
        for (name, value) in rendered.binds {
            query = query.bind((name, value));
        }

        let products: Vec<Product> = query.await?.take(0)?;
        Ok(products)
    }

    async fn count(&self, filter: &Filter) -> RepoResult<u64> {
        let rendered = filter.to_surql(TABLE);

        let mut sql = String::from("SELECT count() FROM product");
        if !rendered.clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&rendered.clause);
        }
        sql.push_str(" GROUP ALL");

        let mut query = self.base.db().query(sql);
        for (name, value) in rendered.binds {
            query = query.bind((name, value));
        }

        let count: Option<i64> = query.await?.take((0, "count"))?;
        Ok(count.unwrap_or(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::page::{self, PageInfo, PageRequest};
    use crate::catalog::query::{self, ProductFilterParams};
    use crate::db::memory_db;

    async fn seed(db: &Surreal<Db>, key: &str, name: &str, price: f64, created_ms: i64) {
        let product = Product {
            id: None,
            name: name.to_string(),
            description: String::new(),
            image: String::new(),
            category: make_thing("category", "drinks"),
            price,
            stock: 10,
            rating: 4.0,
            num_reviews: 1,
            is_featured: false,
            is_active: true,
            created_at: DateTime::<Utc>::from_timestamp_millis(created_ms).unwrap(),
        };
        let created: Option<Product> = db
            .create((TABLE, key))
            .content(product)
            .await
            .expect("seed product");
        assert!(created.is_some());
    }

    async fn seeded_repo() -> ProductRepository {
        let db = memory_db().await;
        // two created_at collisions on purpose
        seed(&db, "a1", "Filter Coffee", 2.0, 1_000).await;
        seed(&db, "a2", "Mocha", 3.5, 1_000).await;
        seed(&db, "a3", "Mo.ka Pot", 30.0, 2_000).await;
        seed(&db, "a4", "Espresso", 2.5, 3_000).await;
        seed(&db, "a5", "Latte", 3.0, 3_000).await;
        ProductRepository::new(db)
    }

    fn keys(products: &[Product]) -> Vec<String> {
        products
            .iter()
            .map(|p| p.id.as_ref().unwrap().id.to_string())
            .collect()
    }

    #[tokio::test]
    async fn cursor_walk_over_real_store_visits_all_rows_once() {
        let repo = seeded_repo().await;
        let base = query::compose(&ProductFilterParams::default()).unwrap();

        let mut seen = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let result = page::list(
                &repo,
                &base,
                SortKey::Newest,
                PageRequest::Cursor {
                    cursor: token.clone(),
                    limit: 2,
                },
            )
            .await
            .unwrap();
            seen.extend(keys(&result.items));
            let PageInfo::Cursor {
                next_cursor,
                has_next_page,
                ..
            } = result.pagination
            else {
                panic!("expected cursor page info")
            };
            if !has_next_page {
                break;
            }
            token = next_cursor;
        }

        assert_eq!(seen, vec!["a5", "a4", "a3", "a2", "a1"]);
    }

    #[tokio::test]
    async fn offset_mode_counts_and_pages() {
        let repo = seeded_repo().await;
        let base = query::compose(&ProductFilterParams {
            min_price: Some(2.5),
            ..Default::default()
        })
        .unwrap();

        let result = page::list(
            &repo,
            &base,
            SortKey::PriceAsc,
            PageRequest::Offset { page: 1, limit: 2 },
        )
        .await
        .unwrap();

        // a4 (2.5), a5 (3.0) of the 4 matching rows
        assert_eq!(keys(&result.items), vec!["a4", "a5"]);
        assert_eq!(
            result.pagination,
            PageInfo::Offset {
                total: 4,
                page: 1,
                limit: 2,
                total_pages: 2,
            }
        );
    }

    #[tokio::test]
    async fn search_matches_literally_and_case_insensitively() {
        let repo = seeded_repo().await;
        let base = query::compose(&ProductFilterParams {
            search: Some("mo.ka".to_string()),
            ..Default::default()
        })
        .unwrap();

        let items = repo.find(&base, SortKey::Newest, None, 10).await.unwrap();
        // "Mocha" must not match the escaped dot
        assert_eq!(keys(&items), vec!["a3"]);
    }

    #[tokio::test]
    async fn inactive_products_are_hidden_from_listings() {
        let repo = seeded_repo().await;
        repo.update(
            "a5",
            ProductUpdate {
                name: None,
                description: None,
                image: None,
                category: None,
                price: None,
                stock: None,
                is_featured: None,
                is_active: Some(false),
            },
        )
        .await
        .unwrap();

        let base = query::compose(&ProductFilterParams::default()).unwrap();
        assert_eq!(repo.count(&base).await.unwrap(), 4);
    }
}
