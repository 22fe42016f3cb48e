//! Data models
//!
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY, snowflake generated).

pub mod customer;
pub mod estimate;
pub mod invoice;
pub mod item;
pub mod line_item;
pub mod organization;
pub mod payment;
pub mod signature;
pub mod webhook_event;

// Re-exports
pub use customer::*;
pub use estimate::*;
pub use invoice::*;
pub use item::*;
pub use line_item::*;
pub use organization::*;
pub use payment::*;
pub use signature::*;
pub use webhook_event::*;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// List query (`?org_id=&search=&page=&limit=`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub org_id: i64,
    /// Case-insensitive substring filter
    pub search: Option<String>,
    /// 1-based page number
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit())
    }

    /// `%search%` LIKE pattern, or `None` when no filter applies.
    ///
    /// Wildcards in the search text are escaped with `\`; queries using it
    /// must say `ESCAPE '\'`.
    pub fn like_pattern(&self) -> Option<String> {
        let search = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let mut pattern = String::with_capacity(search.len() + 2);
        pattern.push('%');
        for ch in search.to_lowercase().chars() {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        Some(pattern)
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit > 0 {
            total.div_ceil(u64::from(limit)) as u32
        } else {
            1
        };
        Self {
            data,
            total,
            page,
            limit,
            total_pages,
        }
    }
}
