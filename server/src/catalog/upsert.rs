//! Unique-Relation Upserter
//!
//! Idempotent add-or-increment for user↔product relations (cart
//! lines, wishlist entries) that are unique per `(user, product)`.
//! The only concurrency-correctness mechanism is the store's unique
//! index: a lost creation race surfaces as
//! [`RepoError::Duplicate`] and is retried exactly once as an
//! increment.
//!
//! The capacity check is an advisory point-in-time read. It is not
//! transactionally consistent with stock decrements happening
//! elsewhere (order placement), so a concurrent decrement can still
//! oversell; that soft invariant is inherited from the data model,
//! not patched over with transactions here.

use async_trait::async_trait;

use crate::catalog::CatalogError;
use crate::db::repository::RepoError;

/// Storage port for unique `(user, product)` relations
///
/// `insert` must report a unique-index violation as
/// [`RepoError::Duplicate`], distinguishable from other write
/// failures. `add_quantity` must apply the increment atomically in
/// the store (not read-modify-write) so concurrent increments sum.
/// Quantity-less relations (wishlists) ignore the quantity argument.
#[async_trait]
pub trait RelationStore: Send + Sync {
    type Rel: Send;

    async fn find_for_user(
        &self,
        user: &str,
        product: &str,
    ) -> Result<Option<Self::Rel>, RepoError>;

    async fn insert(&self, user: &str, product: &str, quantity: u32)
    -> Result<Self::Rel, RepoError>;

    /// Atomically add `delta` to the relation's quantity; None when
    /// the relation does not exist.
    async fn add_quantity(
        &self,
        user: &str,
        product: &str,
        delta: u32,
    ) -> Result<Option<Self::Rel>, RepoError>;

    fn quantity_of(rel: &Self::Rel) -> u32;
}

/// Add `delta` to the user's relation with `product`, creating it if
/// absent.
///
/// `capacity` receives the prospective new quantity and returns
/// whether it is admissible; on rejection nothing is mutated. N
/// concurrent callers converge to a single relation whose quantity is
/// the sum of all admitted deltas: the unique index collapses
/// duplicate creations into one row plus `Duplicate` conflicts, and
/// each conflicted caller retries once as an atomic increment. A
/// missing row after a duplicate conflict is an invariant violation
/// reported as [`CatalogError::Internal`], never retried again.
pub async fn add_or_increment<S: RelationStore>(
    store: &S,
    user: &str,
    product: &str,
    delta: u32,
    capacity: impl Fn(u32) -> bool + Send,
) -> Result<S::Rel, CatalogError> {
    if let Some(existing) = store.find_for_user(user, product).await? {
        let new_quantity = S::quantity_of(&existing).saturating_add(delta);
        if !capacity(new_quantity) {
            return Err(CatalogError::CapacityExceeded {
                requested: new_quantity,
            });
        }
        return store
            .add_quantity(user, product, delta)
            .await?
            .ok_or_else(|| {
                CatalogError::Internal("relation disappeared during increment".to_string())
            });
    }

    if !capacity(delta) {
        return Err(CatalogError::CapacityExceeded { requested: delta });
    }

    match store.insert(user, product, delta).await {
        Ok(rel) => Ok(rel),
        Err(RepoError::Duplicate(_)) => {
            // lost the creation race; the row exists now
            let existing = store.find_for_user(user, product).await?.ok_or_else(|| {
                CatalogError::Internal(
                    "duplicate-key conflict but relation not found on re-read".to_string(),
                )
            })?;
            let new_quantity = S::quantity_of(&existing).saturating_add(delta);
            if !capacity(new_quantity) {
                return Err(CatalogError::CapacityExceeded {
                    requested: new_quantity,
                });
            }
            store
                .add_quantity(user, product, delta)
                .await?
                .ok_or_else(|| {
                    CatalogError::Internal("relation disappeared during retry".to_string())
                })
        }
        Err(e) => Err(e.into()),
    }
}

/// Quantity-less idempotent add (wishlist semantics): a duplicate add
/// returns the existing relation unchanged.
pub async fn add_unique<S: RelationStore>(
    store: &S,
    user: &str,
    product: &str,
) -> Result<S::Rel, CatalogError> {
    if let Some(existing) = store.find_for_user(user, product).await? {
        return Ok(existing);
    }
    match store.insert(user, product, 1).await {
        Ok(rel) => Ok(rel),
        Err(RepoError::Duplicate(_)) => {
            store.find_for_user(user, product).await?.ok_or_else(|| {
                CatalogError::Internal(
                    "duplicate-key conflict but relation not found on re-read".to_string(),
                )
            })
        }
        Err(e) => Err(e.into()),
    }
}
