//! Fixed-size page window over a result list.

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Number of pages needed for `count` items. Zero for an empty list.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// The items on 1-based page `page_number`. Out-of-range requests yield an
/// empty slice.
pub fn page<T>(records: &[T], page_number: usize, page_size: usize) -> &[T] {
    if page_number == 0 || page_size == 0 {
        return &[];
    }
    let Some(start) = (page_number - 1).checked_mul(page_size) else {
        return &[];
    };
    if start >= records.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(records.len());
    &records[start..end]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self, count: usize) -> usize {
        total_pages(count, self.page_size)
    }

    pub fn slice<'r, T>(&self, records: &'r [T]) -> &'r [T] {
        page(records, self.page, self.page_size)
    }

    pub fn can_prev(&self, count: usize) -> bool {
        count > 0 && self.page > 1
    }

    pub fn can_next(&self, count: usize) -> bool {
        count > 0 && self.page < self.total_pages(count)
    }

    /// Returns true when the page changed.
    pub fn prev(&mut self, count: usize) -> bool {
        if !self.can_prev(count) {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Returns true when the page changed.
    pub fn next(&mut self, count: usize) -> bool {
        if !self.can_next(count) {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Pull the current page back into `[1, max(total, 1)]`.
    pub fn clamp(&mut self, count: usize) {
        let last = self.total_pages(count).max(1);
        self.page = self.page.clamp(1, last);
    }

    /// Jump to `page`, clamped to the pages `count` items fill.
    pub fn go_to(&mut self, page: usize, count: usize) {
        self.page = page;
        self.clamp(count);
    }

    /// "Page P of T" as shown under the results table.
    pub fn label(&self, count: usize) -> String {
        format!("Page {} of {}", self.page, self.total_pages(count))
    }
}
