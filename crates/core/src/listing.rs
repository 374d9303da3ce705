//! Blueprint listing filters.
//!
//! The index page accepts several filter parameters but applies at most one
//! of them, in a fixed order of precedence:
//!
//! 1. `tag`      -- exact tag name
//! 2. `liked`    -- blueprints liked by the viewer (authenticated viewers only)
//! 3. `username` -- exact author username
//! 4. `query`    -- case-insensitive substring over author, title and tag names
//!
//! With none of them present the whole catalogue is listed, newest first.

use serde::Deserialize;

use crate::pagination::deserialize_page;
use crate::types::DbId;

/// Blueprints shown per index page.
pub const BLUEPRINTS_PER_PAGE: i64 = 8;

/// Query parameters accepted by the index page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingParams {
    pub query: Option<String>,
    pub tag: Option<String>,
    pub username: Option<String>,
    pub liked: Option<String>,
    #[serde(default, deserialize_with = "deserialize_page")]
    pub page: Option<i64>,
}

/// The single filter applied to a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingFilter {
    All,
    Tag(String),
    LikedBy(DbId),
    Author(String),
    Search(String),
}

/// Pick the filter to apply for `params` as seen by `viewer`.
///
/// Blank parameters count as absent. `liked` is ignored for anonymous
/// viewers, so the next parameter in line applies instead.
pub fn resolve_filter(params: &ListingParams, viewer: Option<DbId>) -> ListingFilter {
    if let Some(tag) = present(&params.tag) {
        return ListingFilter::Tag(tag.to_string());
    }

    if let (Some(liked), Some(user_id)) = (present(&params.liked), viewer) {
        if is_truthy(liked) {
            return ListingFilter::LikedBy(user_id);
        }
    }

    if let Some(username) = present(&params.username) {
        return ListingFilter::Author(username.to_string());
    }

    if let Some(query) = present(&params.query) {
        return ListingFilter::Search(query.trim().to_string());
    }

    ListingFilter::All
}

/// Build an `ILIKE` pattern matching `text` as a literal substring.
///
/// `%`, `_` and the escape character itself are escaped with `\`, which is
/// PostgreSQL's default `LIKE` escape.
pub fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// The raw value, unless it is absent or blank.
///
/// Values are not trimmed here: tag and author names match exactly.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}
