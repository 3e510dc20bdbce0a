//! Category Repository

use async_trait::async_trait;

use super::{BaseRepository, RepoError, RepoResult, make_thing, map_write_err, strip_table_prefix};
use crate::catalog::tree::CategoryLookup;
use crate::db::models::{Category, CategoryCreate, CategoryUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::sql::Thing;

const TABLE: &str = "category";

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .base
            .db()
            .query("SELECT * FROM category ORDER BY name ASC")
            .await?
            .take(0)?;
        Ok(categories)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Category>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let category: Option<Category> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(category)
    }

    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Category>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM category WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?;
        let categories: Vec<Category> = result.take(0)?;
        Ok(categories.into_iter().next())
    }

    /// Create a category; the parent, when given, must exist
    pub async fn create(&self, data: CategoryCreate) -> RepoResult<Category> {
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Category '{}' already exists",
                data.name
            )));
        }

        let parent = match data.parent {
            Some(parent_id) => Some(self.require_parent(&parent_id).await?),
            None => None,
        };

        let category = Category::new(data.name, parent);
        let created: Result<Option<Category>, surrealdb::Error> =
            self.base.db().create(TABLE).content(category).await;
        // the unique name index backstops the pre-check under races
        created
            .map_err(map_write_err)?
            .ok_or_else(|| RepoError::Database("Failed to create category".to_string()))
    }

    /// Update a category. An empty-string parent clears the parent
    /// link; a non-empty one must exist and differ from the category
    /// itself.
    pub async fn update(&self, id: &str, data: CategoryUpdate) -> RepoResult<Category> {
        let pure_id = strip_table_prefix(TABLE, id);
        let thing = make_thing(TABLE, pure_id);

        let existing = self
            .find_by_id(pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))?;

        // Check duplicate name if changing
        if let Some(ref new_name) = data.name
            && new_name != &existing.name
            && self.find_by_name(new_name).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Category '{new_name}' already exists"
            )));
        }

        // None = leave unchanged, Some(None) = clear the link
        let parent = match data.parent {
            None => None,
            Some(parent_id) if parent_id.is_empty() => Some(None),
            Some(parent_id) => {
                let parent = self.require_parent(&parent_id).await?;
                if Some(&parent) == existing.id.as_ref() {
                    return Err(RepoError::Validation(
                        "Category cannot be its own parent".to_string(),
                    ));
                }
                Some(Some(parent))
            }
        };

        #[derive(serde::Serialize)]
        struct CategoryUpdateDb {
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            parent: Option<Option<Thing>>,
        }

        let update_data = CategoryUpdateDb {
            name: data.name,
            parent,
        };

        // MERGE skips absent fields, so untouched columns survive
        self.base
            .db()
            .query("UPDATE $thing MERGE $data")
            .bind(("thing", thing))
            .bind(("data", update_data))
            .await
            .map_err(map_write_err)?
            .check()
            .map_err(map_write_err)?;

        self.find_by_id(pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
    }

    /// Delete a category; refused while products still reference it
    pub async fn delete(&self, id: &str) -> RepoResult<Category> {
        let pure_id = strip_table_prefix(TABLE, id);
        let thing = make_thing(TABLE, pure_id);

        let in_use = self.product_count(&thing).await?;
        if in_use > 0 {
            return Err(RepoError::Validation(format!(
                "Category is referenced by {in_use} product(s)"
            )));
        }

        let deleted: Option<Category> = self.base.db().delete((TABLE, pure_id)).await?;
        deleted.ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
    }

    async fn require_parent(&self, parent_id: &str) -> RepoResult<Thing> {
        let parent = make_thing(TABLE, parent_id);
        let found: Option<Category> = self
            .base
            .db()
            .select((TABLE, parent.id.to_string()))
            .await?;
        match found {
            Some(_) => Ok(parent),
            None => Err(RepoError::Validation(format!(
                "Parent category {parent_id} not found"
            ))),
        }
    }

    async fn product_count(&self, category: &Thing) -> RepoResult<u64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM product WHERE category = $category GROUP ALL")
            .bind(("category", category.clone()))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;
        Ok(count.unwrap_or(0) as u64)
    }
}

#[async_trait]
impl CategoryLookup for CategoryRepository {
    async fn children_of(&self, parents: &[String]) -> Result<Vec<String>, RepoError> {
        let parent_things: Vec<Thing> = parents.iter().map(|p| make_thing(TABLE, p)).collect();
        let mut result = self
            .base
            .db()
            .query("SELECT VALUE id FROM category WHERE parent IN $parents")
            .bind(("parents", parent_things))
            .await?;
        let children: Vec<Thing> = result.take(0)?;
        Ok(children.into_iter().map(|t| t.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tree;
    use crate::db::memory_db;

    async fn repo() -> CategoryRepository {
        CategoryRepository::new(memory_db().await)
    }

    async fn create(repo: &CategoryRepository, name: &str, parent: Option<&str>) -> Category {
        repo.create(CategoryCreate {
            name: name.to_string(),
            parent: parent.map(str::to_string),
        })
        .await
        .expect("create category")
    }

    fn key(category: &Category) -> String {
        category.id.as_ref().unwrap().id.to_string()
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let repo = repo().await;
        create(&repo, "Drinks", None).await;
        let err = repo
            .create(CategoryCreate {
                name: "Drinks".to_string(),
                parent: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn missing_parent_is_rejected() {
        let repo = repo().await;
        let err = repo
            .create(CategoryCreate {
                name: "Orphan".to_string(),
                parent: Some("nope".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn category_cannot_become_its_own_parent() {
        let repo = repo().await;
        let drinks = create(&repo, "Drinks", None).await;
        let err = repo
            .update(
                &key(&drinks),
                CategoryUpdate {
                    name: None,
                    parent: Some(key(&drinks)),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn empty_parent_clears_the_link() {
        let repo = repo().await;
        let drinks = create(&repo, "Drinks", None).await;
        let coffee = create(&repo, "Coffee", Some(&key(&drinks))).await;
        assert!(coffee.parent.is_some());

        let updated = repo
            .update(
                &key(&coffee),
                CategoryUpdate {
                    name: None,
                    parent: Some(String::new()),
                },
            )
            .await
            .unwrap();
        assert!(updated.parent.is_none());
    }

    #[tokio::test]
    async fn descendants_resolve_through_real_lookup() {
        let repo = repo().await;
        let drinks = create(&repo, "Drinks", None).await;
        let coffee = create(&repo, "Coffee", Some(&key(&drinks))).await;
        let espresso = create(&repo, "Espresso", Some(&key(&coffee))).await;
        create(&repo, "Snacks", None).await;

        let result = tree::descendants(&repo, &key(&drinks), None, false)
            .await
            .unwrap();
        let expected: std::collections::HashSet<String> = [&coffee, &espresso]
            .iter()
            .map(|c| c.id.as_ref().unwrap().to_string())
            .collect();
        assert_eq!(result, expected);
    }

    #[tokio::test]
    async fn delete_is_refused_while_products_reference_it() {
        let repo = repo().await;
        let drinks = create(&repo, "Drinks", None).await;

        let products = crate::db::repository::ProductRepository::new(repo.base.db().clone());
        products
            .create(crate::db::models::ProductCreate {
                name: "Latte".to_string(),
                description: None,
                image: None,
                category: key(&drinks),
                price: 3.0,
                stock: Some(5),
                is_featured: None,
            })
            .await
            .unwrap();

        let err = repo.delete(&key(&drinks)).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }
}
