//! Page-number pagination.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

/// A validated, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Build a request for `page` (defaults to the first page).
    ///
    /// Page numbers below 1 do not exist and are reported as not found.
    pub fn new(page: Option<i64>, per_page: i64) -> Result<Self, CoreError> {
        let page = page.unwrap_or(1);
        if page < 1 {
            return Err(CoreError::NotFound { entity: "Page", id: page });
        }
        Ok(Self { page, per_page })
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    /// Reject pages past the last one. The first page always exists, even
    /// for an empty result set.
    pub fn ensure_in_range(&self, total: i64) -> Result<(), CoreError> {
        if self.page > num_pages(total, self.per_page) {
            return Err(CoreError::NotFound {
                entity: "Page",
                id: self.page,
            });
        }
        Ok(())
    }
}

/// Query-string `page` value: blank or absent means the first page.
///
/// Use with `#[serde(default, deserialize_with = "deserialize_page")]`.
pub fn deserialize_page<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Number of pages needed for `total` rows; never less than one.
pub fn num_pages(total: i64, per_page: i64) -> i64 {
    if total <= 0 || per_page <= 0 {
        return 1;
    }
    (total + per_page - 1) / per_page
}

/// One page of results plus the navigation data a list view needs.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub num_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        let pages = num_pages(total, request.per_page);
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
            num_pages: pages,
            has_next: request.page < pages,
            has_previous: request.page > 1,
        }
    }
}
