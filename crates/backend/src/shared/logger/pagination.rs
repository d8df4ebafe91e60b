use contracts::shared::logger::LogEntry;
use contracts::shared::paging::PageResult;
use serde::Deserialize;

use super::store::{LevelFilter, LogStore, StoreError};

pub const DEFAULT_PAGE: u64 = 1;
pub const MAX_PAGE_SIZE: u64 = 500;

/// Raw query string of GET /api/logs/entries.
///
/// Values are kept as strings so a non-numeric `page` behaves like a missing one.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: u64,
    pub limit: u64,
    pub level: Option<LevelFilter>,
}

impl ListParams {
    pub fn from_query(query: &ListQuery, default_limit: u64) -> Self {
        let page = parse_positive(query.page.as_deref()).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(query.limit.as_deref())
            .unwrap_or(default_limit)
            .min(MAX_PAGE_SIZE);
        let level = query.level.as_deref().and_then(LevelFilter::parse);
        Self { page, limit, level }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok().filter(|v| *v > 0)
}

/// One page of log rows, newest first.
///
/// Store unavailability yields an empty page; any other store failure is returned.
pub async fn list_entries(
    store: &dyn LogStore,
    params: &ListParams,
) -> Result<PageResult<LogEntry>, StoreError> {
    match store
        .query_log_page(params.page, params.limit, params.level.as_ref())
        .await
    {
        Ok((entries, total)) => Ok(PageResult {
            entries,
            total,
            page: params.page,
            limit: params.limit,
        }),
        Err(e) if e.kind.is_unavailability() => {
            tracing::warn!(kind = ?e.kind, "Log store unavailable, returning empty page: {}", e.message);
            Ok(PageResult::empty(params.page, params.limit))
        }
        Err(e) => {
            tracing::error!("Failed to fetch log entries: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::logger::store::testing::{entry, FakeLogStore};
    use crate::shared::logger::store::StoreErrorKind;
    use contracts::shared::logger::LogBucket;
    use std::collections::HashSet;

    fn query(page: Option<&str>, limit: Option<&str>, level: Option<&str>) -> ListQuery {
        ListQuery {
            page: page.map(String::from),
            limit: limit.map(String::from),
            level: level.map(String::from),
        }
    }

    fn store_with(n: i64) -> FakeLogStore {
        let levels = ["info", "error", "success", "warning"];
        FakeLogStore::with_entries(
            (1..=n)
                .map(|id| entry(id, levels[id as usize % levels.len()], "Row", "msg"))
                .collect(),
        )
    }

    #[test]
    fn test_params_fall_back_to_defaults() {
        let params = ListParams::from_query(&query(None, None, None), 50);
        assert_eq!((params.page, params.limit, params.level), (1, 50, None));

        let params = ListParams::from_query(&query(Some("abc"), Some("-3"), Some("")), 50);
        assert_eq!((params.page, params.limit, params.level), (1, 50, None));

        let params = ListParams::from_query(&query(Some("0"), Some("0"), None), 50);
        assert_eq!((params.page, params.limit), (1, 50));
    }

    #[test]
    fn test_params_parse_and_cap() {
        let params = ListParams::from_query(&query(Some("3"), Some("10000"), Some("Error")), 50);
        assert_eq!(params.page, 3);
        assert_eq!(params.limit, MAX_PAGE_SIZE);
        assert_eq!(params.level, Some(LevelFilter::Bucket(LogBucket::Error)));
    }

    #[tokio::test]
    async fn test_page_never_exceeds_limit() {
        let store = store_with(37);
        for limit in [1, 5, 10, 37, 100] {
            for page in 1..=5 {
                let params = ListParams { page, limit, level: None };
                let result = list_entries(&store, &params).await.unwrap();
                assert!(result.entries.len() as u64 <= limit);
                assert_eq!(result.total, 37);
            }
        }
    }

    #[tokio::test]
    async fn test_consecutive_pages_do_not_overlap() {
        let store = store_with(25);
        let limit = 10;
        let first = list_entries(&store, &ListParams { page: 1, limit, level: None })
            .await
            .unwrap();
        let second = list_entries(&store, &ListParams { page: 2, limit, level: None })
            .await
            .unwrap();

        let joined: Vec<&LogEntry> = first.entries.iter().chain(second.entries.iter()).collect();
        let ids: HashSet<i64> = joined.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), joined.len());
        assert!(joined
            .windows(2)
            .all(|w| (w[0].timestamp, w[0].id) > (w[1].timestamp, w[1].id)));
    }

    #[tokio::test]
    async fn test_level_filter_restricts_page_and_total() {
        let store = store_with(40);
        let params = ListParams {
            page: 1,
            limit: 50,
            level: Some(LevelFilter::Bucket(LogBucket::Error)),
        };
        let result = list_entries(&store, &params).await.unwrap();
        assert_eq!(result.total, 10);
        assert!(result.entries.iter().all(|e| e.level == "error"));
    }

    #[tokio::test]
    async fn test_unavailable_store_yields_empty_page() {
        for kind in [
            StoreErrorKind::Unavailable,
            StoreErrorKind::Timeout,
            StoreErrorKind::AuthFailure,
        ] {
            let store = FakeLogStore::failing(kind);
            let params = ListParams { page: 2, limit: 25, level: None };
            let result = list_entries(&store, &params).await.unwrap();
            assert_eq!(result, PageResult::empty(2, 25));
        }
    }

    #[tokio::test]
    async fn test_other_store_failure_is_surfaced() {
        let store = FakeLogStore::failing(StoreErrorKind::Other);
        let params = ListParams { page: 1, limit: 50, level: None };
        let err = list_entries(&store, &params).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::Other);
    }
}
