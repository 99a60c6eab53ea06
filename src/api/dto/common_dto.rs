//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl PaginationParams {
    /// Clamps `page` to at least 1 and `per_page` to 1..=100.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }

    /// Builds the response metadata for `total` items.
    #[must_use]
    pub fn meta(&self, total: u32) -> PaginationMeta {
        let total_pages = if total == 0 {
            0
        } else {
            total.div_ceil(self.per_page.max(1))
        };
        PaginationMeta {
            page: self.page,
            per_page: self.per_page,
            total,
            total_pages,
        }
    }

    /// Number of items skipped before this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        let skipped = self.page.saturating_sub(1).saturating_mul(self.per_page);
        usize::try_from(skipped).unwrap_or(usize::MAX)
    }
}
