//! Pagination bookkeeping.
//!
//! Client state is 0-based; the wire is 1-based.

pub const PAGE_SIZE_OPTIONS: [u32; 3] = [10, 25, 50];
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Current page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Zero-based page index.
    pub page_index: u32,
    /// Rows per page.
    pub page_size: u32,
}

impl Pagination {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_index: 0,
            page_size: normalize_page_size(page_size),
        }
    }

    /// 1-based page number sent as `page=`.
    pub fn wire_page(&self) -> u32 {
        self.page_index.saturating_add(1)
    }

    /// Row range `[start, end)` of this page inside a longer sequence.
    pub fn window(&self) -> (usize, usize) {
        let size = self.page_size as usize;
        let start = (self.page_index as usize).saturating_mul(size);
        (start, start.saturating_add(size))
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Zero falls back to the default size; anything else is kept.
pub fn normalize_page_size(page_size: u32) -> u32 {
    if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_page_size, Pagination};

    #[test]
    fn wire_page_is_one_based() {
        let mut pagination = Pagination::new(25);
        assert_eq!(pagination.wire_page(), 1);
        pagination.page_index = 4;
        assert_eq!(pagination.wire_page(), 5);
    }

    #[test]
    fn window_covers_one_page() {
        let pagination = Pagination {
            page_index: 2,
            page_size: 10,
        };
        assert_eq!(pagination.window(), (20, 30));
    }

    #[test]
    fn zero_page_size_uses_default() {
        assert_eq!(normalize_page_size(0), 10);
        assert_eq!(Pagination::new(0).page_size, 10);
        assert_eq!(normalize_page_size(50), 50);
    }
}
