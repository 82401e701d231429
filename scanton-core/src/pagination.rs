/// Page arithmetic for list views. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub total_items: usize,
    pub page_size: usize,
    pub current_page: usize,
}

impl Pagination {
    /// A zero page size is treated as one; the current page is clamped into
    /// range.
    pub fn new(total_items: usize, page_size: usize, current_page: usize) -> Self {
        let mut page = Self {
            total_items,
            page_size: page_size.max(1),
            current_page,
        };
        page.current_page = current_page.clamp(1, page.total_pages());
        page
    }

    /// Never less than one, even for an empty list.
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size.max(1)).max(1)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn previous(&self) -> Option<usize> {
        self.has_previous().then(|| self.current_page - 1)
    }

    pub fn next(&self) -> Option<usize> {
        self.has_next().then(|| self.current_page + 1)
    }

    pub fn offset(&self) -> usize {
        (self.current_page - 1) * self.page_size
    }

    /// 1-based inclusive bounds of the visible items.
    pub fn item_range(&self) -> Option<(usize, usize)> {
        if self.total_items == 0 {
            return None;
        }
        let first = self.offset() + 1;
        let last = (self.offset() + self.page_size).min(self.total_items);
        Some((first, last))
    }

    pub fn range_label(&self) -> String {
        match self.item_range() {
            Some((first, last)) => format!("{}–{} of {}", first, last, self.total_items),
            None => "No items".to_string(),
        }
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }
}
