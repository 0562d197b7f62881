//! Cursor pagination for repository listings.
//!
//! Page tokens are opaque to callers: URL-safe base64 over a small versioned
//! JSON document holding an offset into the ordered, filtered collection.
//!
//! Consistency is weak. A token only remembers a position, so records created
//! or deleted between two page requests can shift later pages (an item may be
//! skipped or seen twice). On a collection that does not change, walking every
//! page yields each matching record exactly once.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use warden_core::{DomainError, DomainResult};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

const CURSOR_VERSION: u8 = 1;

/// List request as received from callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// `0` selects the default page size.
    pub page_size: u32,
    /// Empty for the first page.
    pub page_token: String,
    /// Exact-match filter; empty matches everything.
    pub filter: String,
}

impl PageRequest {
    pub fn first(page_size: u32) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = token.into();
        self
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Empty when there are no further pages.
    pub next_page_token: String,
    /// Number of records matching the filter, across all pages.
    pub total_size: u32,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.next_page_token.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_page_token: self.next_page_token,
            total_size: self.total_size,
        }
    }
}

/// Page size policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLimits {
    pub default_size: u32,
    pub max_size: u32,
}

impl PageLimits {
    pub fn new(default_size: u32, max_size: u32) -> Self {
        let max_size = max_size.max(1);
        Self {
            default_size: default_size.clamp(1, max_size),
            max_size,
        }
    }

    /// Effective size for a requested page size.
    pub fn resolve(&self, requested: u32) -> usize {
        let size = if requested == 0 {
            self.default_size
        } else {
            requested.min(self.max_size)
        };
        size as usize
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cursor
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct PageCursor {
    v: u8,
    offset: usize,
}

impl PageCursor {
    fn encode(offset: usize) -> String {
        let cursor = PageCursor {
            v: CURSOR_VERSION,
            offset,
        };
        // Serializing two integers cannot fail.
        let json = serde_json::to_vec(&cursor).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    fn decode(token: &str) -> DomainResult<usize> {
        if token.is_empty() {
            return Ok(0);
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| DomainError::validation("invalid page token"))?;
        let cursor: PageCursor = serde_json::from_slice(&bytes)
            .map_err(|_| DomainError::validation("invalid page token"))?;

        if cursor.v != CURSOR_VERSION {
            return Err(DomainError::validation(format!(
                "unsupported page token version {}",
                cursor.v
            )));
        }
        Ok(cursor.offset)
    }
}

/// Cut one page out of an already filtered and ordered collection.
pub fn paginate<T>(
    items: Vec<T>,
    request: &PageRequest,
    limits: PageLimits,
) -> DomainResult<Page<T>> {
    let offset = PageCursor::decode(&request.page_token)?;
    let size = limits.resolve(request.page_size);
    let total = items.len();
    let total_size = u32::try_from(total).unwrap_or(u32::MAX);

    if offset >= total {
        return Ok(Page {
            items: Vec::new(),
            next_page_token: String::new(),
            total_size,
        });
    }

    let end = offset.saturating_add(size).min(total);
    let next_page_token = if end < total {
        PageCursor::encode(end)
    } else {
        String::new()
    };

    let page = items.into_iter().skip(offset).take(end - offset).collect();

    Ok(Page {
        items: page,
        next_page_token,
        total_size,
    })
}
