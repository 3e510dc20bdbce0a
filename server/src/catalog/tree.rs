//! Category Tree Resolver
//!
//! Expands a category id into its descendant set with a frontier
//! breadth-first walk over the parent-child forest. The result set
//! deduplicates as it grows, so cyclic or self-referential parent
//! links (which writes do not prevent) still terminate: a frontier
//! that produces no unseen ids ends the walk.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::catalog::CatalogError;
use crate::db::repository::RepoError;

/// Hard bound on unbounded walks. Only reachable if the lookup keeps
/// producing novel ids past any realistic tree depth.
pub const MAX_TREE_DEPTH: u32 = 128;

/// Read-only adjacency query over the category forest
#[async_trait]
pub trait CategoryLookup: Send + Sync {
    /// Ids of all categories whose parent is in `parents`
    async fn children_of(&self, parents: &[String]) -> Result<Vec<String>, RepoError>;
}

/// Resolve the descendant set of `ancestor`.
///
/// `max_depth` bounds the walk (depth 1 = direct children);
/// `include_self` seeds the result with the ancestor itself. A leaf
/// resolves to the empty set, not an error.
pub async fn descendants(
    lookup: &dyn CategoryLookup,
    ancestor: &str,
    max_depth: Option<u32>,
    include_self: bool,
) -> Result<HashSet<String>, CatalogError> {
    let mut result = HashSet::new();
    if include_self {
        result.insert(ancestor.to_string());
    }

    let mut frontier = vec![ancestor.to_string()];
    let mut depth = 0u32;

    loop {
        if let Some(limit) = max_depth
            && depth >= limit
        {
            break;
        }
        if depth >= MAX_TREE_DEPTH {
            return Err(CatalogError::Internal(format!(
                "category expansion for {ancestor} exceeded depth {MAX_TREE_DEPTH}"
            )));
        }

        let children = lookup.children_of(&frontier).await?;

        let mut fresh = Vec::new();
        for child in children {
            // already-seen ids (cycles, diamond links) stay out of the
            // next frontier
            if child != ancestor && result.insert(child.clone()) {
                fresh.push(child);
            }
        }

        if fresh.is_empty() {
            break;
        }
        frontier = fresh;
        depth += 1;
    }

    Ok(result)
}
