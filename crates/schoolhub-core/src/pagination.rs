//! Page-based pagination for list endpoints.
//!
//! Query parameters:
//! - `page`: 1-indexed page number (default: 1)
//! - `limit`: items per page (1-100, default: 10)
//!
//! Empty strings are treated as absent so `?page=&limit=` behaves like no
//! parameters at all.
//!
//! # Example
//!
//! ```ignore
//! async fn list_classes(
//!     Query(params): Query<PaginationParams>,
//! ) -> Result<Json<Paginated<ClassRecord>>, AppError> {
//!     let classes = fetch_classes(params.limit(), params.offset()).await?;
//!     let total = count_classes().await?;
//!     Ok(Json(Paginated::new(classes, total, &params)))
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Rows to skip for a 1-indexed `page` of `limit` rows. Saturates instead of
/// overflowing, so an absurd page number just yields an empty page.
#[must_use]
pub fn page_offset(page: i64, limit: i64) -> i64 {
    page.max(1).saturating_sub(1).saturating_mul(limit.max(0))
}

/// Deserializes an optional string into an optional i64.
///
/// Query strings carry numbers as text, and a present-but-empty value
/// should be treated as `None`.
pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        Text(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Query parameters for pagination.
///
/// `limit` is clamped to [1, 100] and `page` to a minimum of 1.
#[derive(Debug, Clone, Default, Hash, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Items per page (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Returns the effective limit, clamped to [1, 100].
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit_or(DEFAULT_PAGE_SIZE)
    }

    /// Like [`limit`](Self::limit) with a caller supplied default.
    #[must_use]
    pub fn limit_or(&self, default: i64) -> i64 {
        self.limit.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        page_offset(self.page(), self.limit())
    }
}

/// Metadata about a paginated response.
///
/// ```json
/// { "total": 42, "page": 2, "limit": 10, "totalPages": 5, "hasPrev": true, "hasNext": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total = total.max(0);
        let limit = limit.max(1);
        let total_pages = (total + limit - 1) / limit;

        Self {
            total,
            page,
            limit,
            total_pages,
            has_prev: page > 1,
            has_next: page < total_pages,
        }
    }

    pub fn from_params(total: i64, params: &PaginationParams) -> Self {
        Self::new(total, params.page(), params.limit())
    }
}

/// A page of items together with its pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, params: &PaginationParams) -> Self {
        Self {
            data,
            pagination: PaginationMeta::from_params(total, params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_pagination_params_offset_from_page() {
        let params = PaginationParams::new(3, 20);
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn test_pagination_params_limit_boundary_cases() {
        let test_cases = vec![
            (Some(1), 1),
            (Some(50), 50),
            (Some(100), 100),
            (Some(101), 100),
            (Some(0), 1),
            (Some(-1), 1),
            (None, 10),
        ];

        for (input, expected) in test_cases {
            let params = PaginationParams {
                page: None,
                limit: input,
            };
            assert_eq!(params.limit(), expected);
        }
    }

    #[test]
    fn test_offset_saturates_for_huge_pages() {
        assert_eq!(PaginationParams::new(i64::MAX, 10).offset(), i64::MAX);
        assert_eq!(page_offset(i64::MAX, 100), i64::MAX);
        assert_eq!(page_offset(2, 100), 100);

        let meta = PaginationMeta::new(5, i64::MAX, 10);
        assert!(meta.has_prev);
        assert!(!meta.has_next);
    }

    #[test]
    fn test_pagination_params_page_clamped() {
        let params = PaginationParams {
            page: Some(-4),
            limit: None,
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_limit_or_uses_custom_default() {
        let params = PaginationParams::default();
        assert_eq!(params.limit_or(20), 20);

        let params = PaginationParams {
            page: None,
            limit: Some(500),
        };
        assert_eq!(params.limit_or(20), 100);
    }

    #[test]
    fn test_pagination_params_deserialize_empty_strings() {
        let json = r#"{"page":"","limit":""}"#;
        let params: PaginationParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 10);
    }

    #[test]
    fn test_pagination_params_deserialize_strings_and_numbers() {
        let json = r#"{"page":"2","limit":25}"#;
        let params: PaginationParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.page(), 2);
        assert_eq!(params.limit(), 25);
    }

    #[test]
    fn test_pagination_params_deserialize_garbage_fails() {
        let json = r#"{"page":"two"}"#;
        assert!(serde_json::from_str::<PaginationParams>(json).is_err());
    }

    #[test]
    fn test_pagination_meta_middle_page() {
        let meta = PaginationMeta::new(42, 2, 10);
        assert_eq!(meta.total_pages, 5);
        assert!(meta.has_prev);
        assert!(meta.has_next);
    }

    #[test]
    fn test_pagination_meta_last_page() {
        let meta = PaginationMeta::new(40, 4, 10);
        assert_eq!(meta.total_pages, 4);
        assert!(meta.has_prev);
        assert!(!meta.has_next);
    }

    #[test]
    fn test_pagination_meta_empty() {
        let meta = PaginationMeta::new(0, 1, 10);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_prev);
        assert!(!meta.has_next);
    }

    #[test]
    fn test_pagination_meta_serializes_camel_case() {
        let meta = PaginationMeta::new(15, 1, 10);
        let serialized = serde_json::to_string(&meta).unwrap();
        assert!(serialized.contains(r#""totalPages":2"#));
        assert!(serialized.contains(r#""hasPrev":false"#));
        assert!(serialized.contains(r#""hasNext":true"#));
    }

    #[test]
    fn test_paginated_wraps_data() {
        let params = PaginationParams::new(1, 2);
        let page = Paginated::new(vec!["a", "b"], 5, &params);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.pagination.total_pages, 3);
    }
}
