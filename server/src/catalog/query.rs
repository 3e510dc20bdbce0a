//! Query Composer
//!
//! Builds a storage filter from whitelisted, user-supplied predicates
//! plus an optional keyset (cursor) predicate, and renders the result
//! to a parameterized SURQL `WHERE` clause. User text never reaches
//! the query string directly; every value travels as a bind parameter
//! and substring search terms are regex-escaped so they match
//! literally.

use serde::Deserialize;
use surrealdb::sql::{Thing, Value};

use crate::catalog::{CatalogError, PageCursor};

/// Sort key for product listings
///
/// Cursor pagination is only defined for the time-ordered keys; the
/// other keys have no total order compatible with the `(created_at,
/// id)` tie-break.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    RatingDesc,
}

impl SortKey {
    pub fn supports_cursor(&self) -> bool {
        matches!(self, SortKey::Newest | SortKey::Oldest)
    }

    /// ORDER BY clause; `id` is always the final tie-break so that
    /// ties on the primary key cannot skip or duplicate rows across
    /// pages.
    pub fn order_clause(&self) -> &'static str {
        match self {
            SortKey::Newest => "created_at DESC, id DESC",
            SortKey::Oldest => "created_at ASC, id ASC",
            SortKey::PriceAsc => "price ASC, id ASC",
            SortKey::PriceDesc => "price DESC, id DESC",
            SortKey::RatingDesc => "rating DESC, id DESC",
        }
    }
}

/// Whitelisted product listing predicates
///
/// `category` and `category_descendants` (the resolved
/// ancestor-expansion set) are mutually exclusive filter strategies.
#[derive(Debug, Clone, Default)]
pub struct ProductFilterParams {
    /// Single category id ("category:xyz" or bare key)
    pub category: Option<String>,
    /// Resolved descendant-id set from an ancestor filter
    pub category_descendants: Option<Vec<String>>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
    pub featured: Option<bool>,
    /// Case-insensitive literal substring match on name
    pub search: Option<String>,
}

/// Filter predicate tree
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    And(Vec<Filter>),
    /// Only active (non-archived) rows
    ActiveOnly,
    /// category = one id (bare key)
    Category(String),
    /// category IN a resolved descendant set (bare keys)
    CategoryIn(Vec<String>),
    PriceAtLeast(f64),
    PriceAtMost(f64),
    MinRating(f64),
    Featured(bool),
    /// Pre-escaped, case-insensitive regex pattern
    NameContains(String),
    /// Keyset predicate for cursor pagination; `before` walks
    /// descending (newest), `!before` ascending (oldest)
    Keyset {
        created_at_ms: i64,
        id_key: String,
        before: bool,
    },
}

impl Filter {
    /// Combine with another predicate by logical AND, never replacing
    /// the existing predicate.
    pub fn and(self, other: Filter) -> Filter {
        match self {
            Filter::And(mut parts) => {
                parts.push(other);
                Filter::And(parts)
            }
            first => Filter::And(vec![first, other]),
        }
    }
}

/// Rendered WHERE clause with bind parameters
#[derive(Debug)]
pub struct SurqlWhere {
    pub clause: String,
    pub binds: Vec<(String, Value)>,
}

/// Build the base filter from listing parameters.
///
/// Rejects combining a single-category filter with an
/// ancestor-expansion set: they are alternative strategies, not
/// composable predicates.
pub fn compose(params: &ProductFilterParams) -> Result<Filter, CatalogError> {
    if params.category.is_some() && params.category_descendants.is_some() {
        return Err(CatalogError::InvalidRequest(
            "category and ancestor filters are mutually exclusive".to_string(),
        ));
    }

    let mut parts = vec![Filter::ActiveOnly];

    if let Some(category) = &params.category {
        parts.push(Filter::Category(strip_category_prefix(category)));
    }
    if let Some(ids) = &params.category_descendants {
        parts.push(Filter::CategoryIn(
            ids.iter().map(|id| strip_category_prefix(id)).collect(),
        ));
    }
    if let Some(min) = params.min_price {
        parts.push(Filter::PriceAtLeast(min));
    }
    if let Some(max) = params.max_price {
        parts.push(Filter::PriceAtMost(max));
    }
    if let Some(rating) = params.min_rating {
        parts.push(Filter::MinRating(rating));
    }
    if let Some(featured) = params.featured {
        parts.push(Filter::Featured(featured));
    }
    if let Some(term) = &params.search {
        let pattern = format!("(?i){}", escape_regex(term));
        parts.push(Filter::NameContains(pattern));
    }

    Ok(Filter::And(parts))
}

/// Build the keyset predicate for a decoded cursor.
///
/// Descending (`newest`): rows strictly before the cursor position,
/// `created_at < t OR (created_at = t AND id < cursor.id)`; ascending
/// (`oldest`) is the mirrored form.
pub fn keyset(cursor: &PageCursor, sort: SortKey) -> Result<Filter, CatalogError> {
    let before = match sort {
        SortKey::Newest => true,
        SortKey::Oldest => false,
        _ => {
            return Err(CatalogError::InvalidRequest(
                "cursor pagination requires newest or oldest sort".to_string(),
            ));
        }
    };

    let id_key = cursor
        .id
        .split_once(':')
        .map(|(_, key)| key.to_string())
        .unwrap_or_else(|| cursor.id.clone());

    Ok(Filter::Keyset {
        created_at_ms: cursor.created_at.timestamp_millis(),
        id_key,
        before,
    })
}

/// Escape every regex metacharacter so the term matches literally.
pub fn escape_regex(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(
            c,
            '\\' | '.' | '^' | '$' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn strip_category_prefix(id: &str) -> String {
    id.strip_prefix("category:").unwrap_or(id).to_string()
}

impl Filter {
    /// Render to a parameterized SURQL condition for `table`.
    ///
    /// Returns an empty clause for an empty predicate tree; callers
    /// omit the WHERE keyword in that case.
    pub fn to_surql(&self, table: &str) -> SurqlWhere {
        let mut binds = Vec::new();
        let mut counter = 0usize;
        let clause = self.render(table, &mut counter, &mut binds);
        SurqlWhere { clause, binds }
    }

    fn render(&self, table: &str, counter: &mut usize, binds: &mut Vec<(String, Value)>) -> String {
        let mut next = |value: Value, binds: &mut Vec<(String, Value)>| -> String {
            let name = format!("p{}", *counter);
            *counter += 1;
            binds.push((name.clone(), value));
            format!("${name}")
        };

        match self {
            Filter::And(parts) => {
                let rendered: Vec<String> = parts
                    .iter()
                    .map(|p| p.render(table, counter, binds))
                    .filter(|c| !c.is_empty())
                    .collect();
                rendered.join(" AND ")
            }
            Filter::ActiveOnly => "is_active = true".to_string(),
            Filter::Category(key) => {
                let p = next(Value::from(key.clone()), binds);
                format!("category = type::thing('category', {p})")
            }
            Filter::CategoryIn(keys) => {
                let things: Vec<Value> = keys
                    .iter()
                    .map(|k| Value::from(Thing::from(("category", k.as_str()))))
                    .collect();
                let p = next(Value::from(things), binds);
                format!("category IN {p}")
            }
            Filter::PriceAtLeast(min) => {
                let p = next(Value::from(*min), binds);
                format!("price >= {p}")
            }
            Filter::PriceAtMost(max) => {
                let p = next(Value::from(*max), binds);
                format!("price <= {p}")
            }
            Filter::MinRating(rating) => {
                let p = next(Value::from(*rating), binds);
                format!("rating >= {p}")
            }
            Filter::Featured(featured) => {
                let p = next(Value::from(*featured), binds);
                format!("is_featured = {p}")
            }
            Filter::NameContains(pattern) => {
                let p = next(Value::from(pattern.clone()), binds);
                format!("string::matches(name, {p})")
            }
            Filter::Keyset {
                created_at_ms,
                id_key,
                before,
            } => {
                let op = if *before { "<" } else { ">" };
                let t = next(Value::from(*created_at_ms), binds);
                let t_eq = next(Value::from(*created_at_ms), binds);
                let id = next(Value::from(id_key.clone()), binds);
                format!(
                    "(created_at {op} {t} OR (created_at = {t_eq} AND id {op} type::thing('{table}', {id})))"
                )
            }
        }
    }
}
