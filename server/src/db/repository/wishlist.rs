//! Wishlist Repository
//!
//! Same unique `(user, product)` shape as the cart, without a
//! quantity: adds are idempotent.

use async_trait::async_trait;
use chrono::Utc;

use super::{BaseRepository, RepoError, RepoResult, make_thing, map_write_err};
use crate::catalog::upsert::RelationStore;
use crate::db::models::WishlistEntry;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "wishlist_entry";

#[derive(Clone)]
pub struct WishlistRepository {
    base: BaseRepository,
}

impl WishlistRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all_for_user(&self, user: &str) -> RepoResult<Vec<WishlistEntry>> {
        let entries: Vec<WishlistEntry> = self
            .base
            .db()
            .query(
                "SELECT * FROM wishlist_entry WHERE user = $user \
                 ORDER BY created_at DESC, id DESC",
            )
            .bind(("user", user.to_string()))
            .await?
            .take(0)?;
        Ok(entries)
    }

    pub async fn delete_for_user(&self, id: &str, user: &str) -> RepoResult<bool> {
        let thing = make_thing(TABLE, id);
        let mut result = self
            .base
            .db()
            .query("DELETE wishlist_entry WHERE id = $thing AND user = $user RETURN BEFORE")
            .bind(("thing", thing))
            .bind(("user", user.to_string()))
            .await?;
        let deleted: Vec<WishlistEntry> = result.take(0)?;
        Ok(!deleted.is_empty())
    }
}

#[async_trait]
impl RelationStore for WishlistRepository {
    type Rel = WishlistEntry;

    async fn find_for_user(
        &self,
        user: &str,
        product: &str,
    ) -> Result<Option<WishlistEntry>, RepoError> {
        let product = make_thing("product", product);
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM wishlist_entry WHERE user = $user AND product = $product LIMIT 1")
            .bind(("user", user.to_string()))
            .bind(("product", product))
            .await?;
        let entries: Vec<WishlistEntry> = result.take(0)?;
        Ok(entries.into_iter().next())
    }

    async fn insert(
        &self,
        user: &str,
        product: &str,
        _quantity: u32,
    ) -> Result<WishlistEntry, RepoError> {
        let entry = WishlistEntry {
            id: None,
            user: user.to_string(),
            product: make_thing("product", product),
            created_at: Utc::now(),
        };
        let created: Result<Option<WishlistEntry>, surrealdb::Error> =
            self.base.db().create(TABLE).content(entry).await;
        created
            .map_err(map_write_err)?
            .ok_or_else(|| RepoError::Database("Failed to create wishlist entry".to_string()))
    }

    async fn add_quantity(
        &self,
        user: &str,
        product: &str,
        _delta: u32,
    ) -> Result<Option<WishlistEntry>, RepoError> {
        // quantity-less relation: an increment is a no-op re-read
        self.find_for_user(user, product).await
    }

    fn quantity_of(_rel: &WishlistEntry) -> u32 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::upsert;
    use crate::db::memory_db;

    #[tokio::test]
    async fn add_is_idempotent_over_the_real_store() {
        let repo = WishlistRepository::new(memory_db().await);
        let first = upsert::add_unique(&repo, "u1", "p1").await.unwrap();
        let second = upsert::add_unique(&repo, "u1", "p1").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(repo.find_all_for_user("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn remove_is_scoped_to_the_owner() {
        let repo = WishlistRepository::new(memory_db().await);
        let entry = upsert::add_unique(&repo, "u1", "p1").await.unwrap();
        let id = entry.id.as_ref().unwrap().to_string();

        assert!(!repo.delete_for_user(&id, "u2").await.unwrap());
        assert!(repo.delete_for_user(&id, "u1").await.unwrap());
        assert!(repo.find_all_for_user("u1").await.unwrap().is_empty());
    }
}
