//! Pagination for list endpoints
//!
//! Two styles are used by the API:
//! - limit/offset for the recipe feed
//! - page number for user listings and subscriptions
//!
//! Both produce a [`Paginated`] envelope whose `next`/`previous` links are
//! built by rewriting the current request's query string.

use serde::{Deserialize, Serialize};

/// Upper bound for any requested page size
pub const MAX_PAGE_SIZE: i64 = 100;

/// Largest accepted offset; `offset + limit` stays representable
pub const MAX_OFFSET: i64 = i64::MAX - MAX_PAGE_SIZE;

/// Largest accepted page number; `page * limit` stays representable
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE - 1;

/// Paginated response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Query parameter overrides: `Some` sets a value, `None` removes the key
pub type ParamOverrides = Vec<(&'static str, Option<String>)>;

/// Normalized limit/offset window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitOffset {
    pub limit: i64,
    pub offset: i64,
}

impl LimitOffset {
    pub fn new(limit: Option<i64>, offset: Option<i64>, default_limit: i64) -> Self {
        Self {
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0).clamp(0, MAX_OFFSET),
        }
    }

    pub fn next_params(&self, count: i64) -> Option<ParamOverrides> {
        if self.offset + self.limit >= count {
            return None;
        }
        Some(vec![
            ("limit", Some(self.limit.to_string())),
            ("offset", Some((self.offset + self.limit).to_string())),
        ])
    }

    pub fn previous_params(&self) -> Option<ParamOverrides> {
        if self.offset <= 0 {
            return None;
        }
        let previous = self.offset - self.limit;
        let offset = (previous > 0).then(|| previous.to_string());
        Some(vec![("limit", Some(self.limit.to_string())), ("offset", offset)])
    }
}

/// Normalized page-number window (pages start at 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNumber {
    pub page: i64,
    pub limit: i64,
}

impl PageNumber {
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// A page past the end is an error, except page 1 of an empty list
    pub fn is_out_of_range(&self, count: i64) -> bool {
        self.page > 1 && self.offset() >= count
    }

    pub fn next_params(&self, count: i64) -> Option<ParamOverrides> {
        if self.page * self.limit >= count {
            return None;
        }
        Some(vec![("page", Some((self.page + 1).to_string()))])
    }

    pub fn previous_params(&self) -> Option<ParamOverrides> {
        match self.page {
            1 => None,
            2 => Some(vec![("page", None)]),
            page => Some(vec![("page", Some((page - 1).to_string()))]),
        }
    }
}

/// Rebuild `base` + `query` with the given parameter overrides applied.
///
/// Existing parameters keep their position and raw encoding; overridden
/// keys are replaced in place, removed keys dropped, new keys appended.
pub fn build_link(base: &str, query: Option<&str>, overrides: &[(&'static str, Option<String>)]) -> String {
    let mut pairs: Vec<(String, String)> = query
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect();

    for (key, value) in overrides {
        match value {
            Some(value) => {
                if let Some(existing) = pairs.iter_mut().find(|(k, _)| k == key) {
                    existing.1 = value.clone();
                } else {
                    pairs.push((key.to_string(), value.clone()));
                }
            }
            None => pairs.retain(|(k, _)| k != key),
        }
    }

    if pairs.is_empty() {
        return base.to_string();
    }

    let query = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", base, query)
}
