//! Page-number pagination envelope.
//!
//! Listings respond with `{"count", "next", "previous", "results"}`.
//! `next`/`previous` are relative URLs that preserve the request's other
//! query parameters. Page size defaults to 5 and is capped at 50; an
//! unparseable `page_size` falls back to the default, while an invalid or
//! out-of-range `page` is a 404.

use axum::http::Uri;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const DEFAULT_PAGE_SIZE: i64 = 5;
pub const MAX_PAGE_SIZE: i64 = 50;

/// Raw pagination parameters. Kept as strings so a garbage value reaches our
/// own fallback rules instead of the deserializer's rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// A resolved page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub number: i64,
    pub size: i64,
}

impl Page {
    /// Resolve the raw query into a page number and size.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when `page` is not a positive integer.
    pub fn resolve(query: &PageQuery) -> Result<Self, ApiError> {
        let number = match &query.page {
            None => 1,
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(invalid_page)?,
        };

        let size = query
            .page_size
            .as_ref()
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|n| *n >= 1)
            .map_or(DEFAULT_PAGE_SIZE, |n| n.min(MAX_PAGE_SIZE));

        Ok(Self { number, size })
    }

    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.size
    }

    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }
}

/// The pagination envelope serialized to the client.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Wrap one page of results in the envelope.
///
/// `uri` is the request URI; its query string is carried into the
/// `next`/`previous` links with only the `page` parameter rewritten.
///
/// # Errors
///
/// Returns `ApiError::NotFound` when the page number is past the last page.
pub fn paginate<T>(
    uri: &Uri,
    page: Page,
    count: i64,
    results: Vec<T>,
) -> Result<Paginated<T>, ApiError> {
    // Ceiling division by hand: i64::div_ceil is not on stable.
    let total_pages = ((count + page.size - 1) / page.size).max(1);
    if page.number > total_pages {
        return Err(invalid_page());
    }

    let next = (page.number < total_pages).then(|| page_url(uri, page.number + 1));
    let previous = (page.number > 1).then(|| page_url(uri, page.number - 1));

    Ok(Paginated {
        count,
        next,
        previous,
        results,
    })
}

fn invalid_page() -> ApiError {
    ApiError::NotFound("Invalid page.".to_owned())
}

/// Rebuild the request URL pointing at `page`, keeping every other query
/// parameter as-is.
fn page_url(uri: &Uri, page: i64) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    if let Some(query) = uri.query() {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key != "page" {
                serializer.append_pair(&key, &value);
            }
        }
    }
    serializer.append_pair("page", &page.to_string());

    format!("{}?{}", uri.path(), serializer.finish())
}
