//! The result of a paged search.

/// An ordered page of results plus scan diagnostics.
///
/// `entries` preserves the scan order of the backing item holder and never
/// exceeds `count` when one is set. `total_items_scanned` counts every item
/// pulled from the holder, matched or not; `last_processed_item` is the last
/// of them, kept for diagnostics only.
#[derive(Debug, Clone)]
pub struct PagedSearchResult<T> {
    pub entries: Vec<T>,
    pub start: Option<usize>,
    pub count: Option<usize>,
    pub total_items_scanned: u64,
    pub lookup_limit: Option<u64>,
    pub lookup_limit_reached: bool,
    pub last_processed_item: Option<T>,
}

impl<T> PagedSearchResult<T> {
    /// An empty result with no paging metadata.
    pub fn empty() -> Self {
        PagedSearchResult {
            entries: Vec::new(),
            start: None,
            count: None,
            total_items_scanned: 0,
            lookup_limit: None,
            lookup_limit_reached: false,
            last_processed_item: None,
        }
    }

    /// A one-element result with no paging metadata, for items resolved
    /// directly rather than scanned.
    pub fn single(item: T) -> Self {
        PagedSearchResult {
            entries: vec![item],
            start: None,
            count: None,
            total_items_scanned: 1,
            lookup_limit: None,
            lookup_limit_reached: false,
            last_processed_item: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
