//! Paginated Lister
//!
//! Orchestrates offset-mode and cursor-mode listing for any
//! collection reachable through the [`RecordPage`] port. Cursor mode
//! is keyset pagination over the `(created_at, id)` total order;
//! offset mode is skip/limit with a parallel count.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::query::{Filter, SortKey};
use crate::catalog::{CatalogError, cursor, query};
use crate::db::repository::RepoError;

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Position of an item in the `(created_at, id)` total order
pub trait PageAnchor {
    fn created_at(&self) -> DateTime<Utc>;
    /// Full record id ("table:key"); None only for unsaved values
    fn anchor_id(&self) -> Option<String>;
}

/// Storage port for paginated reads
#[async_trait]
pub trait RecordPage: Send + Sync {
    type Item: PageAnchor + Send;

    async fn find(
        &self,
        filter: &Filter,
        sort: SortKey,
        start: Option<u64>,
        limit: u64,
    ) -> Result<Vec<Self::Item>, RepoError>;

    async fn count(&self, filter: &Filter) -> Result<u64, RepoError>;
}

/// Requested page, already parsed from transport parameters
#[derive(Debug, Clone)]
pub enum PageRequest {
    Offset { page: u64, limit: u64 },
    Cursor { cursor: Option<String>, limit: u64 },
}

/// Page metadata returned alongside the items
///
/// Cursor mode deliberately omits `total`/`page`: computing them
/// would require the full count that keyset pagination exists to
/// avoid.
#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum PageInfo {
    Offset {
        total: u64,
        page: u64,
        limit: u64,
        total_pages: u64,
    },
    Cursor {
        limit: u64,
        next_cursor: Option<String>,
        has_next_page: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Page<T> {
    /// Convert the items while keeping the pagination metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// Execute a paginated listing.
///
/// Offset mode clamps `page` to ≥ 1 and `limit` to 1..=100 (default
/// 10) and runs `find` and `count` concurrently. Cursor mode is only
/// valid for the time-ordered sort keys; it fetches one sentinel row
/// past the limit to learn whether a next page exists.
pub async fn list<S: RecordPage>(
    source: &S,
    base: &Filter,
    sort: SortKey,
    request: PageRequest,
) -> Result<Page<S::Item>, CatalogError> {
    match request {
        PageRequest::Offset { page, limit } => {
            let page = page.max(1);
            let limit = clamp_limit(limit);
            // saturate: a huge client-supplied page must not overflow
            let start = page.saturating_sub(1).saturating_mul(limit);

            let (items, total) = tokio::try_join!(
                source.find(base, sort, Some(start), limit),
                source.count(base)
            )?;

            Ok(Page {
                items,
                pagination: PageInfo::Offset {
                    total,
                    page,
                    limit,
                    total_pages: total.div_ceil(limit),
                },
            })
        }
        PageRequest::Cursor { cursor: token, limit } => {
            if !sort.supports_cursor() {
                return Err(CatalogError::InvalidRequest(
                    "cursor pagination requires newest or oldest sort".to_string(),
                ));
            }
            let limit = clamp_limit(limit);

            let filter = match token {
                Some(token) => {
                    let position = cursor::decode(&token)?;
                    base.clone().and(query::keyset(&position, sort)?)
                }
                None => base.clone(),
            };

            let mut items = source.find(&filter, sort, None, limit + 1).await?;
            let has_next_page = items.len() as u64 > limit;
            items.truncate(limit as usize);

            let next_cursor = if has_next_page {
                match items.last() {
                    Some(last) => {
                        let id = last.anchor_id().ok_or_else(|| {
                            CatalogError::Internal("listed record has no id".to_string())
                        })?;
                        Some(cursor::encode(last.created_at(), &id))
                    }
                    None => None,
                }
            } else {
                None
            };

            Ok(Page {
                items,
                pagination: PageInfo::Cursor {
                    limit,
                    next_cursor,
                    has_next_page,
                },
            })
        }
    }
}

fn clamp_limit(limit: u64) -> u64 {
    if limit == 0 {
        DEFAULT_LIMIT
    } else {
        limit.min(MAX_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::query::ProductFilterParams;

    #[derive(Debug, Clone, PartialEq)]
    struct Rec {
        id: String,
        created_ms: i64,
        rating: f64,
    }

    impl Rec {
        fn new(key: &str, created_ms: i64) -> Self {
            Self {
                id: format!("product:{key}"),
                created_ms,
                rating: 0.0,
            }
        }
    }

    impl PageAnchor for Rec {
        fn created_at(&self) -> DateTime<Utc> {
            DateTime::<Utc>::from_timestamp_millis(self.created_ms).unwrap()
        }
        fn anchor_id(&self) -> Option<String> {
            Some(self.id.clone())
        }
    }

    /// In-memory source that evaluates the filter tree directly
    struct VecSource {
        rows: Vec<Rec>,
    }

    fn matches(rec: &Rec, filter: &Filter) -> bool {
        match filter {
            Filter::And(parts) => parts.iter().all(|p| matches(rec, p)),
            Filter::ActiveOnly => true,
            Filter::MinRating(min) => rec.rating >= *min,
            Filter::Keyset {
                created_at_ms,
                id_key,
                before,
            } => {
                let anchor_id = format!("product:{id_key}");
                let key = (rec.created_ms, rec.id.clone());
                let bound = (*created_at_ms, anchor_id);
                if *before { key < bound } else { key > bound }
            }
            other => panic!("fake source cannot evaluate {other:?}"),
        }
    }

    #[async_trait]
    impl RecordPage for VecSource {
        type Item = Rec;

        async fn find(
            &self,
            filter: &Filter,
            sort: SortKey,
            start: Option<u64>,
            limit: u64,
        ) -> Result<Vec<Rec>, RepoError> {
            let mut rows: Vec<Rec> = self
                .rows
                .iter()
                .filter(|r| matches(r, filter))
                .cloned()
                .collect();
            rows.sort_by(|a, b| {
                let ka = (a.created_ms, a.id.clone());
                let kb = (b.created_ms, b.id.clone());
                match sort {
                    SortKey::Newest => kb.cmp(&ka),
                    SortKey::Oldest => ka.cmp(&kb),
                    _ => unimplemented!("fake source only sorts by time"),
                }
            });
            let start = start.unwrap_or(0) as usize;
            Ok(rows.into_iter().skip(start).take(limit as usize).collect())
        }

        async fn count(&self, filter: &Filter) -> Result<u64, RepoError> {
            Ok(self.rows.iter().filter(|r| matches(r, filter)).count() as u64)
        }
    }

    /// 25 rows with deliberate created_at collisions (groups of 5)
    fn collision_source() -> VecSource {
        let rows = (0..25)
            .map(|i| Rec::new(&format!("r{i:02}"), 1_000 + (i / 5) as i64))
            .collect();
        VecSource { rows }
    }

    fn base() -> Filter {
        query::compose(&ProductFilterParams::default()).unwrap()
    }

    #[tokio::test]
    async fn cursor_walk_visits_every_row_exactly_once() {
        let source = collision_source();
        let mut seen = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let page = list(
                &source,
                &base(),
                SortKey::Newest,
                PageRequest::Cursor {
                    cursor: token.clone(),
                    limit: 7,
                },
            )
            .await
            .unwrap();

            seen.extend(page.items.iter().map(|r| r.id.clone()));
            match page.pagination {
                PageInfo::Cursor {
                    next_cursor,
                    has_next_page,
                    ..
                } => {
                    if !has_next_page {
                        break;
                    }
                    token = next_cursor;
                }
                _ => panic!("expected cursor page info"),
            }
        }

        // full descending order, no duplicates or omissions, even with
        // equal created_at values
        let mut expected: Vec<String> = source.rows.iter().map(|r| r.id.clone()).collect();
        expected.sort();
        expected.reverse();
        // rows sort primarily by created_ms which tracks the id order here
        assert_eq!(seen.len(), 25);
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn offset_and_cursor_pages_agree_on_static_data() {
        // unique timestamps
        let rows: Vec<Rec> = (0..23)
            .map(|i| Rec::new(&format!("u{i:02}"), 5_000 + i as i64))
            .collect();
        let source = VecSource { rows };

        let mut offset_ids = Vec::new();
        let mut page_no = 1;
        loop {
            let page = list(
                &source,
                &base(),
                SortKey::Newest,
                PageRequest::Offset {
                    page: page_no,
                    limit: 5,
                },
            )
            .await
            .unwrap();
            if page.items.is_empty() {
                break;
            }
            offset_ids.extend(page.items.iter().map(|r| r.id.clone()));
            page_no += 1;
        }

        let mut cursor_ids = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = list(
                &source,
                &base(),
                SortKey::Newest,
                PageRequest::Cursor {
                    cursor: token.clone(),
                    limit: 5,
                },
            )
            .await
            .unwrap();
            cursor_ids.extend(page.items.iter().map(|r| r.id.clone()));
            let PageInfo::Cursor {
                next_cursor,
                has_next_page,
                ..
            } = page.pagination
            else {
                panic!("expected cursor page info")
            };
            if !has_next_page {
                break;
            }
            token = next_cursor;
        }

        assert_eq!(offset_ids, cursor_ids);
    }

    #[tokio::test]
    async fn offset_mode_reports_totals_and_clamps() {
        let source = collision_source();
        let page = list(
            &source,
            &base(),
            SortKey::Newest,
            PageRequest::Offset {
                page: 0,
                limit: 1000,
            },
        )
        .await
        .unwrap();

        assert_eq!(
            page.pagination,
            PageInfo::Offset {
                total: 25,
                page: 1,
                limit: MAX_LIMIT,
                total_pages: 1,
            }
        );
        assert_eq!(page.items.len(), 25);
    }

    #[tokio::test]
    async fn absurdly_large_page_yields_empty_not_overflow() {
        let source = collision_source();
        let page = list(
            &source,
            &base(),
            SortKey::Newest,
            PageRequest::Offset {
                page: u64::MAX,
                limit: 100,
            },
        )
        .await
        .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(
            page.pagination,
            PageInfo::Offset {
                total: 25,
                page: u64::MAX,
                limit: MAX_LIMIT,
                total_pages: 1,
            }
        );
    }

    #[tokio::test]
    async fn zero_limit_falls_back_to_default() {
        let source = collision_source();
        let page = list(
            &source,
            &base(),
            SortKey::Oldest,
            PageRequest::Cursor {
                cursor: None,
                limit: 0,
            },
        )
        .await
        .unwrap();
        assert_eq!(page.items.len(), DEFAULT_LIMIT as usize);
    }

    #[tokio::test]
    async fn cursor_mode_rejects_incompatible_sort() {
        let source = collision_source();
        let err = list(
            &source,
            &base(),
            SortKey::PriceAsc,
            PageRequest::Cursor {
                cursor: None,
                limit: 10,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn invalid_cursor_is_rejected_not_ignored() {
        let source = collision_source();
        let err = list(
            &source,
            &base(),
            SortKey::Newest,
            PageRequest::Cursor {
                cursor: Some("garbage!!".to_string()),
                limit: 10,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidCursor(_)));
    }

    #[tokio::test]
    async fn last_full_page_reports_no_next() {
        let rows: Vec<Rec> = (0..10)
            .map(|i| Rec::new(&format!("x{i}"), 100 + i as i64))
            .collect();
        let source = VecSource { rows };
        let page = list(
            &source,
            &base(),
            SortKey::Newest,
            PageRequest::Cursor {
                cursor: None,
                limit: 10,
            },
        )
        .await
        .unwrap();
        let PageInfo::Cursor {
            has_next_page,
            next_cursor,
            ..
        } = page.pagination
        else {
            panic!("expected cursor page info")
        };
        assert!(!has_next_page);
        assert!(next_cursor.is_none());
    }
}
