use crate::models::Page;

/// Accumulates consecutive pages of a listing for "load more" style
/// browsing.
///
/// Page 1 replaces whatever was loaded before; later pages are appended.
/// A page request that completes for a page other than the one requested
/// (for example after the filter changed) is ignored.
#[derive(Debug, Clone)]
pub struct PageAccumulator<T> {
    items: Vec<T>,
    current_page: u32,
    total_pages: u32,
    total_count: u32,
    pending_page: Option<u32>,
    error: Option<String>,
}

impl<T> Default for PageAccumulator<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_page: 0,
            total_pages: 0,
            total_count: 0,
            pending_page: None,
            error: None,
        }
    }
}

impl<T> PageAccumulator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything, e.g. when the filter changes
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// A request is in flight
    pub fn is_loading(&self) -> bool {
        self.pending_page.is_some()
    }

    /// Page 1 has been received at least once
    pub fn has_started(&self) -> bool {
        self.current_page > 0
    }

    pub fn has_more(&self) -> bool {
        !self.has_started() || self.current_page < self.total_pages
    }

    /// Page that "load more" would fetch, if any
    pub fn next_page(&self) -> Option<u32> {
        if self.is_loading() {
            return None;
        }
        if !self.has_started() {
            return Some(1);
        }
        if self.current_page < self.total_pages {
            Some(self.current_page + 1)
        } else {
            None
        }
    }

    /// Mark `page` as requested. Returns false if another request is in
    /// flight.
    pub fn begin(&mut self, page: u32) -> bool {
        if self.is_loading() {
            return false;
        }
        self.pending_page = Some(page);
        self.error = None;
        true
    }

    /// Apply a received page. Returns false if it was not the pending one.
    pub fn complete(&mut self, page_number: u32, page: Page<T>) -> bool {
        if self.pending_page != Some(page_number) {
            return false;
        }
        self.pending_page = None;

        if page_number <= 1 {
            self.items = page.results;
        } else {
            self.items.extend(page.results);
        }
        self.current_page = page_number;
        self.total_pages = page.info.pages;
        self.total_count = page.info.count;
        true
    }

    /// Record a failed request. A failed first page clears the list;
    /// later failures keep what was already loaded.
    pub fn fail(&mut self, page_number: u32, message: impl Into<String>) -> bool {
        if self.pending_page != Some(page_number) {
            return false;
        }
        self.pending_page = None;
        if page_number <= 1 {
            self.items.clear();
            self.current_page = 0;
            self.total_pages = 0;
            self.total_count = 0;
        }
        self.error = Some(message.into());
        true
    }
}
