//! Category Model

use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

pub type CategoryId = Thing;

/// Category model
///
/// Categories form a forest: `parent` is None for roots. Parent
/// existence is checked on write; deeper cycle prevention is not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<CategoryId>,
    pub name: String,
    /// Record link to the parent category
    pub parent: Option<CategoryId>,
}

impl Category {
    pub fn new(name: String, parent: Option<CategoryId>) -> Self {
        Self {
            id: None,
            name,
            parent,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    /// Parent category id, "category:xyz" or bare key
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    /// Some("") clears the parent link
    pub parent: Option<String>,
}
