//! Pagination query parameters and response envelopes.
//!
//! Two styles coexist, mirroring the two API generations: `limit`/`offset`
//! with an `{items, count}` envelope (customers, basket), and
//! `page`/`page_size` with a `{data, meta}` envelope (feedback).

use serde::{Deserialize, Deserializer, Serialize};

/// Default page size for both pagination styles.
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Hard ceiling on a single page, either style.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Resolved `?limit=&offset=` pagination window.
///
/// Query structs carry the raw `Option<i64>` parameters (flattening a
/// nested struct breaks numeric fields under urlencoded deserialization)
/// and resolve them here.
#[derive(Debug, Clone, Copy)]
pub struct LimitOffset {
    pub limit: i64,
    pub offset: i64,
}

impl Default for LimitOffset {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl LimitOffset {
    /// Resolve raw query parameters: defaults applied, offset made
    /// non-negative, limit bounded.
    #[must_use]
    pub fn from_params(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(0, MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

/// `{items, count}` listing envelope; `count` is the total match count,
/// not the page length.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub count: i64,
}

/// Resolve raw `?page=&page_size=` parameters (1-based pages) into a SQL
/// `(limit, offset)` pair; out-of-range input is clamped.
#[must_use]
pub fn page_limit_offset(page: Option<i64>, page_size: Option<i64>) -> (i64, i64) {
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let page = page.unwrap_or(1).max(1);
    (page_size, (page - 1) * page_size)
}

/// `{data, meta}` listing envelope.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub per_page: i64,
}

/// Deserialize a comma-separated id list (`?id=1,2,3`) into a vector.
/// A missing or empty parameter yields an empty vector.
///
/// # Errors
///
/// Fails if any element is not a valid integer.
pub fn comma_separated<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().map_err(serde::de::Error::custom))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct IdQuery {
        #[serde(default, deserialize_with = "comma_separated")]
        id: Vec<i64>,
    }

    #[test]
    fn test_comma_separated_parses_list() {
        let q: IdQuery = serde_json::from_str(r#"{"id": "1, 2,3"}"#).unwrap();
        assert_eq!(q.id, vec![1, 2, 3]);
    }

    #[test]
    fn test_comma_separated_missing_is_empty() {
        let q: IdQuery = serde_json::from_str("{}").unwrap();
        assert!(q.id.is_empty());

        let q: IdQuery = serde_json::from_str(r#"{"id": ""}"#).unwrap();
        assert!(q.id.is_empty());
    }

    #[test]
    fn test_comma_separated_rejects_garbage() {
        assert!(serde_json::from_str::<IdQuery>(r#"{"id": "1,x"}"#).is_err());
    }

    #[test]
    fn test_limit_offset_defaults() {
        let q = LimitOffset::from_params(None, None);
        assert_eq!(q.limit, 100);
        assert_eq!(q.offset, 0);
    }

    #[test]
    fn test_limit_offset_clamped() {
        let q = LimitOffset::from_params(Some(100_000), Some(-5));
        assert_eq!(q.limit, MAX_PAGE_SIZE);
        assert_eq!(q.offset, 0);
    }

    #[test]
    fn test_page_limit_offset() {
        assert_eq!(page_limit_offset(Some(3), Some(20)), (20, 40));
        assert_eq!(page_limit_offset(None, None), (100, 0));
        assert_eq!(page_limit_offset(Some(0), Some(5000)), (MAX_PAGE_SIZE, 0));
    }
}
