//! Cart Repository
//!
//! One row per `(user, product)` enforced by a UNIQUE index; the
//! quantity increment runs inside the database so concurrent adds
//! never lose updates.

use async_trait::async_trait;
use chrono::Utc;

use super::{BaseRepository, RepoError, RepoResult, make_thing, map_write_err};
use crate::catalog::upsert::RelationStore;
use crate::db::models::CartItem;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "cart_item";

#[derive(Clone)]
pub struct CartRepository {
    base: BaseRepository,
}

impl CartRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all_for_user(&self, user: &str) -> RepoResult<Vec<CartItem>> {
        let items: Vec<CartItem> = self
            .base
            .db()
            .query("SELECT * FROM cart_item WHERE user = $user ORDER BY created_at DESC, id DESC")
            .bind(("user", user.to_string()))
            .await?
            .take(0)?;
        Ok(items)
    }

    pub async fn find_by_id_for_user(&self, id: &str, user: &str) -> RepoResult<Option<CartItem>> {
        let thing = make_thing(TABLE, id);
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cart_item WHERE id = $thing AND user = $user LIMIT 1")
            .bind(("thing", thing))
            .bind(("user", user.to_string()))
            .await?;
        let items: Vec<CartItem> = result.take(0)?;
        Ok(items.into_iter().next())
    }

    /// Set an item's quantity; scoped to the owning user so one user
    /// cannot address another's rows.
    pub async fn set_quantity(
        &self,
        id: &str,
        user: &str,
        quantity: u32,
    ) -> RepoResult<Option<CartItem>> {
        let thing = make_thing(TABLE, id);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE cart_item SET quantity = $quantity \
                 WHERE id = $thing AND user = $user RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("user", user.to_string()))
            .bind(("quantity", quantity))
            .await?;
        let items: Vec<CartItem> = result.take(0)?;
        Ok(items.into_iter().next())
    }

    /// Remove a single item; false when no row matched
    pub async fn delete_for_user(&self, id: &str, user: &str) -> RepoResult<bool> {
        let thing = make_thing(TABLE, id);
        let mut result = self
            .base
            .db()
            .query("DELETE cart_item WHERE id = $thing AND user = $user RETURN BEFORE")
            .bind(("thing", thing))
            .bind(("user", user.to_string()))
            .await?;
        let deleted: Vec<CartItem> = result.take(0)?;
        Ok(!deleted.is_empty())
    }

    /// Empty the user's cart, returning the number of removed rows
    pub async fn clear(&self, user: &str) -> RepoResult<u64> {
        let mut result = self
            .base
            .db()
            .query("DELETE cart_item WHERE user = $user RETURN BEFORE")
            .bind(("user", user.to_string()))
            .await?;
        let deleted: Vec<CartItem> = result.take(0)?;
        Ok(deleted.len() as u64)
    }
}

#[async_trait]
impl RelationStore for CartRepository {
    type Rel = CartItem;

    async fn find_for_user(&self, user: &str, product: &str) -> Result<Option<CartItem>, RepoError> {
        let product = make_thing("product", product);
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cart_item WHERE user = $user AND product = $product LIMIT 1")
            .bind(("user", user.to_string()))
            .bind(("product", product))
            .await?;
        let items: Vec<CartItem> = result.take(0)?;
        Ok(items.into_iter().next())
    }

    async fn insert(&self, user: &str, product: &str, quantity: u32) -> Result<CartItem, RepoError> {
        let item = CartItem {
            id: None,
            user: user.to_string(),
            product: make_thing("product", product),
            quantity,
            created_at: Utc::now(),
        };
        let created: Result<Option<CartItem>, surrealdb::Error> =
            self.base.db().create(TABLE).content(item).await;
        created
            .map_err(map_write_err)?
            .ok_or_else(|| RepoError::Database("Failed to create cart item".to_string()))
    }

    async fn add_quantity(
        &self,
        user: &str,
        product: &str,
        delta: u32,
    ) -> Result<Option<CartItem>, RepoError> {
        let product = make_thing("product", product);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE cart_item SET quantity += $delta \
                 WHERE user = $user AND product = $product RETURN AFTER",
            )
            .bind(("delta", delta))
            .bind(("user", user.to_string()))
            .bind(("product", product))
            .await?;
        let items: Vec<CartItem> = result.take(0)?;
        Ok(items.into_iter().next())
    }

    fn quantity_of(rel: &CartItem) -> u32 {
        rel.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::upsert;
    use crate::db::memory_db;

    async fn repo() -> CartRepository {
        CartRepository::new(memory_db().await)
    }

    #[tokio::test]
    async fn unique_index_violation_maps_to_duplicate() {
        let repo = repo().await;
        repo.insert("u1", "p1", 1).await.unwrap();
        let err = repo.insert("u1", "p1", 1).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn add_or_increment_converges_on_one_row() {
        let repo = repo().await;
        let first = upsert::add_or_increment(&repo, "u1", "p1", 2, |_| true)
            .await
            .unwrap();
        assert_eq!(first.quantity, 2);

        let second = upsert::add_or_increment(&repo, "u1", "p1", 3, |_| true)
            .await
            .unwrap();
        assert_eq!(second.quantity, 5);
        assert_eq!(first.id, second.id);

        let items = repo.find_all_for_user("u1").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
    }

    #[tokio::test]
    async fn items_are_scoped_to_their_owner() {
        let repo = repo().await;
        let mine = repo.insert("u1", "p1", 1).await.unwrap();
        let id = mine.id.as_ref().unwrap().to_string();

        // another user cannot update or delete it
        assert!(repo.set_quantity(&id, "u2", 9).await.unwrap().is_none());
        assert!(!repo.delete_for_user(&id, "u2").await.unwrap());

        let updated = repo.set_quantity(&id, "u1", 9).await.unwrap().unwrap();
        assert_eq!(updated.quantity, 9);
        assert!(repo.delete_for_user(&id, "u1").await.unwrap());
    }

    #[tokio::test]
    async fn clear_removes_only_that_users_rows() {
        let repo = repo().await;
        repo.insert("u1", "p1", 1).await.unwrap();
        repo.insert("u1", "p2", 2).await.unwrap();
        repo.insert("u2", "p1", 3).await.unwrap();

        assert_eq!(repo.clear("u1").await.unwrap(), 2);
        assert!(repo.find_all_for_user("u1").await.unwrap().is_empty());
        assert_eq!(repo.find_all_for_user("u2").await.unwrap().len(), 1);
    }
}
