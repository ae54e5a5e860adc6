//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

impl Pagination {
    /// Zero-based offset of the first item on this page
    pub fn offset(&self) -> usize {
        let page = self.page.max(1);
        (page as usize - 1) * self.per_page as usize
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PaginationMeta {
    /// Build metadata for a page over `total_items` items
    pub fn new(pagination: &Pagination, total_items: u64) -> Self {
        let per_page = pagination.per_page.max(1);
        let total_pages = ((total_items + per_page as u64 - 1) / per_page as u64) as u32;
        Self {
            page: pagination.page.max(1),
            per_page,
            total_items,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offset() {
        let p = Pagination {
            page: 1,
            per_page: 20,
        };
        assert_eq!(p.offset(), 0);
        let p = Pagination {
            page: 3,
            per_page: 10,
        };
        assert_eq!(p.offset(), 20);
        // Page 0 is treated as page 1
        let p = Pagination {
            page: 0,
            per_page: 10,
        };
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_pagination_meta_total_pages() {
        let p = Pagination {
            page: 1,
            per_page: 10,
        };
        assert_eq!(PaginationMeta::new(&p, 0).total_pages, 0);
        assert_eq!(PaginationMeta::new(&p, 10).total_pages, 1);
        assert_eq!(PaginationMeta::new(&p, 11).total_pages, 2);
    }
}
