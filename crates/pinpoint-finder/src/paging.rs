//! Start/count/lookup-limit bookkeeping around a filter.

use crate::filter::ItemFilter;
use crate::holder::ItemHolder;
use crate::result::PagedSearchResult;

/// Wraps a resolved filter with paging bounds and drives a scan.
///
/// - `start`: matched items to skip before the page begins (default 0).
/// - `count`: maximum matches to keep; `None` is unbounded.
/// - `lookup_limit`: maximum items pulled from the holder, matched or not;
///   `None` is unbounded. This is the engine's substitute for timeouts.
///
/// The scan stops as soon as the tighter bound trips: the page is full, the
/// lookup limit is reached, or the filter reports that no later item can
/// match.
pub struct PagingFilter<T> {
    filter: ItemFilter<T>,
    start: Option<usize>,
    count: Option<usize>,
    lookup_limit: Option<u64>,
}

impl<T: Clone> PagingFilter<T> {
    pub fn new(
        filter: ItemFilter<T>,
        start: Option<usize>,
        count: Option<usize>,
        lookup_limit: Option<u64>,
    ) -> Self {
        PagingFilter {
            filter,
            start,
            count,
            lookup_limit,
        }
    }

    /// Runs the holder to completion (or an early stop) and packages the
    /// page with scan diagnostics.
    pub fn scan(self, holder: &mut dyn ItemHolder<T>) -> PagedSearchResult<T> {
        let skip = self.start.unwrap_or(0);
        let mut entries: Vec<T> = Vec::new();
        let mut skipped = 0usize;
        let mut total: u64 = 0;
        let mut lookup_limit_reached = false;
        let mut last: Option<T> = None;

        holder.process(&mut |item| {
            total += 1;
            let stop_hint = self.filter.should_stop(&item);
            let included = self.filter.is_included(&item);
            last = Some(item.clone());
            if included {
                if skipped < skip {
                    skipped += 1;
                } else if self.count.map_or(true, |count| entries.len() < count) {
                    entries.push(item);
                }
            }
            if self.lookup_limit.is_some_and(|limit| total >= limit) {
                lookup_limit_reached = true;
                return false;
            }
            if self.count.is_some_and(|count| entries.len() >= count) {
                return false;
            }
            !stop_hint
        });

        PagedSearchResult {
            entries,
            start: self.start,
            count: self.count,
            total_items_scanned: total,
            lookup_limit: self.lookup_limit,
            lookup_limit_reached,
            last_processed_item: last,
        }
    }
}
