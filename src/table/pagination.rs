//! Pagination descriptor for the data grid.
//!
//! Pages are 1-based. In manual mode every field is host-supplied and the
//! grid never computes page math itself; [`PageInfo::client`] does the
//! ceiling division for client mode.

/// Pagination state: current page, page size, and totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Current page, 1-based.
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
    /// Total rows across all pages.
    pub total_items: u64,
    /// Total number of pages.
    pub total_pages: u32,
}

impl PageInfo {
    /// Build from host-supplied values (manual mode).
    pub fn new(page: u32, page_size: u32, total_items: u64, total_pages: u32) -> Self {
        Self {
            page: page.max(1),
            page_size,
            total_items,
            total_pages,
        }
    }

    /// Build for client mode, computing the page count.
    pub fn client(page: u32, page_size: u32, total_items: u64) -> Self {
        Self::new(page, page_size, total_items, total_pages(total_items, page_size))
    }

    /// Check whether a previous page exists.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Check whether a next page exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// The previous page number, unless already at the first page.
    pub fn prev(&self) -> Option<u32> {
        self.has_prev().then(|| self.page - 1)
    }

    /// The next page number, unless already at the last page.
    pub fn next(&self) -> Option<u32> {
        self.has_next().then(|| self.page + 1)
    }

    /// Change the page size.
    ///
    /// Resets to page 1 so the grid can never present an out-of-range page.
    pub fn with_page_size(&self, page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            total_items: self.total_items,
            total_pages: total_pages(self.total_items, page_size),
        }
    }

    /// The zero-based row offset of the first row on the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

impl Default for PageInfo {
    fn default() -> Self {
        Self::new(1, 10, 0, 0)
    }
}

/// Ceiling division of items into pages.
pub fn total_pages(total_items: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let size = u64::from(page_size);
    ((total_items + size - 1) / size) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_ceiling_division() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(30, 10), 3);
        assert_eq!(total_pages(31, 10), 4);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 0), 0);
    }

    #[test]
    fn test_prev_disabled_on_first_page() {
        let info = PageInfo::client(1, 10, 25);
        assert!(!info.has_prev());
        assert_eq!(info.prev(), None);
        assert!(info.has_next());
        assert_eq!(info.next(), Some(2));
    }

    #[test]
    fn test_next_disabled_on_last_page() {
        // 25 items, page size 10: three pages, five rows on the last.
        let info = PageInfo::client(3, 10, 25);
        assert_eq!(info.total_pages, 3);
        assert!(!info.has_next());
        assert_eq!(info.next(), None);
        assert!(info.has_prev());
        assert_eq!(info.prev(), Some(2));
    }

    #[test]
    fn test_middle_page_has_both_neighbors() {
        let info = PageInfo::client(2, 10, 25);
        assert_eq!(info.prev(), Some(1));
        assert_eq!(info.next(), Some(3));
    }

    #[test]
    fn test_empty_set_disables_both() {
        let info = PageInfo::client(1, 10, 0);
        assert_eq!(info.total_pages, 0);
        assert!(!info.has_prev());
        assert!(!info.has_next());
    }

    #[test]
    fn test_page_size_change_resets_to_first_page() {
        let info = PageInfo::client(3, 10, 25);
        let resized = info.with_page_size(20);

        assert_eq!(resized.page, 1);
        assert_eq!(resized.page_size, 20);
        assert_eq!(resized.total_pages, 2);
        assert_eq!(resized.total_items, 25);
    }

    #[test]
    fn test_page_clamped_to_at_least_one() {
        let info = PageInfo::new(0, 10, 100, 10);
        assert_eq!(info.page, 1);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageInfo::client(1, 10, 25).offset(), 0);
        assert_eq!(PageInfo::client(3, 10, 25).offset(), 20);
    }

    #[test]
    fn test_manual_values_taken_verbatim() {
        // Manual mode trusts the host's totals even when odd.
        let info = PageInfo::new(2, 10, 5, 7);
        assert_eq!(info.total_pages, 7);
        assert!(info.has_next());
    }
}
