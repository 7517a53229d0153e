//! The finder engine: turns locator text plus a data binding into query
//! results.

use std::marker::PhantomData;

use pinpoint_locator::{Locator, LocatorError};
use tracing::{debug, warn};

use crate::binding::DataBinding;
use crate::error::{FinderError, Result};
use crate::filter::ItemFilter;
use crate::holder::{sequence_holder, DeduplicatingItemHolder, ItemHolder, UnionItemHolder};
use crate::paging::PagingFilter;
use crate::result::PagedSearchResult;

/// Disjunction over sub-locators: `or:(state:failed,state:hung)`.
pub const DIMENSION_OR: &str = "or";
/// Conjunction with a sub-locator: `and:(state:failed)`.
pub const DIMENSION_AND: &str = "and";
/// Negation of a sub-locator: `not:(id:3)`.
pub const DIMENSION_NOT: &str = "not";
/// Item-level union: each value is resolved as a full query and the result
/// sets are concatenated.
pub const DIMENSION_ITEM: &str = "item";
/// Forces deduplication on (`true`) or off (`false`); defaults to on when
/// `item` is present.
pub const DIMENSION_UNIQUE: &str = "unique";
/// Matched items to skip before the page begins.
pub const DIMENSION_START: &str = "start";
/// Maximum matched items to return.
pub const DIMENSION_COUNT: &str = "count";
/// Maximum items scanned, matched or not.
pub const DIMENSION_LOOKUP_LIMIT: &str = "lookupLimit";
/// Strict mode: an empty multi-item result becomes a not-found error.
pub const DIMENSION_STRICT: &str = "$strict";

// Sub-locators (`or`, `and`, `not`, `item`) re-enter the engine; nesting
// deeper than this is rejected rather than recursed into.
const MAX_SUB_LOCATOR_DEPTH: usize = 16;

// Scans pulling more items than this log a performance warning.
const LARGE_SCAN_WARNING: u64 = 10_000;

/// Executes locator queries against one entity kind.
///
/// The engine consumes the reserved dimensions above itself and hands
/// everything else to the [`DataBinding`]; whatever neither side consumed
/// fails the query before the backend is scanned.
///
/// # Example
///
/// ```no_run
/// use pinpoint_finder::{sequence_holder, DataBinding, Finder, ItemFilter, ItemHolder, Locator};
/// # struct Builds;
/// # impl DataBinding<u64> for Builds {
/// #     fn known_dimensions(&self) -> Vec<String> { vec!["state".into(), "id".into()] }
/// #     fn prefiltered_items(&self, _: &mut Locator) -> pinpoint_finder::Result<Box<dyn ItemHolder<u64>>> {
/// #         Ok(sequence_holder(Vec::<u64>::new()))
/// #     }
/// #     fn filter(&self, _: &mut Locator) -> pinpoint_finder::Result<ItemFilter<u64>> {
/// #         Ok(ItemFilter::accept_all())
/// #     }
/// #     fn item_locator(&self, item: &u64) -> String { format!("id:{item}") }
/// # }
///
/// let finder = Finder::new(Builds);
/// let page = finder.items(Some("state:failed,count:10")).unwrap();
/// let one = finder.item("id:42").unwrap();
/// ```
pub struct Finder<T, B> {
    binding: B,
    _items: PhantomData<fn() -> T>,
}

impl<T, B> Finder<T, B>
where
    T: Clone + 'static,
    B: DataBinding<T>,
{
    pub fn new(binding: B) -> Self {
        Finder {
            binding,
            _items: PhantomData,
        }
    }

    /// Canonical locator text for a resolved item; feeding it back to
    /// [`Finder::item`] yields the item again.
    pub fn canonical_locator(&self, item: &T) -> String {
        self.binding.item_locator(item)
    }

    /// Finds all items matching the locator. `None` runs an unfiltered
    /// query with the binding's default paging.
    ///
    /// A locator that directly identifies a missing item yields an empty
    /// result rather than an error, unless strict mode is requested.
    pub fn items(&self, locator_text: Option<&str>) -> Result<PagedSearchResult<T>> {
        self.items_with_defaults(locator_text, None)
    }

    /// Like [`Finder::items`], with defaults merged into the locator for
    /// any dimension the text does not set.
    pub fn items_with_defaults(
        &self,
        locator_text: Option<&str>,
        defaults: Option<&Locator>,
    ) -> Result<PagedSearchResult<T>> {
        let locator = match (locator_text, defaults) {
            (None, None) => None,
            _ => Some(self.create_locator(locator_text, defaults)?),
        };
        self.items_by_locator(locator, true, 0)
    }

    /// Resolves the locator to exactly one item.
    ///
    /// Zero matches is a not-found error (mentioning the lookup limit when
    /// the scan was truncated by it); several matches mean the binding
    /// violated the single-item contract and surface as
    /// [`FinderError::Ambiguous`].
    pub fn item(&self, locator_text: &str) -> Result<T> {
        let mut locator = self.create_locator(Some(locator_text), None)?;
        if !locator.is_single_value() {
            // only the first match is needed
            locator.set_dimension(DIMENSION_COUNT, "1");
            locator.add_hidden_dimensions([DIMENSION_COUNT]);
        }
        let display = locator.text();
        let result = self.items_by_locator(Some(locator), false, 0)?;
        let lookup_limit = result.lookup_limit;
        let lookup_limit_reached = result.lookup_limit_reached;
        let mut entries = result.entries;
        match entries.len() {
            0 => {
                if lookup_limit_reached {
                    Err(FinderError::not_found(format!(
                        "nothing is found by locator '{display}' while scanning the first {} \
                         items; set the '{DIMENSION_LOOKUP_LIMIT}' dimension to a larger value \
                         to scan more",
                        lookup_limit.unwrap_or_default()
                    )))
                } else {
                    Err(FinderError::not_found(format!(
                        "nothing is found by locator '{display}'"
                    )))
                }
            }
            1 => Ok(entries.remove(0)),
            found => Err(FinderError::ambiguous(format!(
                "found {found} items by locator '{display}' while a single item is expected"
            ))),
        }
    }

    /// Builds the full filter for a locator, including the logic-op
    /// dimensions, and verifies the locator was fully consumed.
    pub fn filter(&self, locator_text: &str) -> Result<ItemFilter<T>> {
        self.filter_at_depth(locator_text, 0)
    }

    // ========================================================================
    // Locator construction
    // ========================================================================

    fn create_locator(&self, text: Option<&str>, defaults: Option<&Locator>) -> Result<Locator> {
        let mut known = self.binding.known_dimensions();
        known.extend(
            [
                DIMENSION_START,
                DIMENSION_COUNT,
                DIMENSION_LOOKUP_LIMIT,
                DIMENSION_STRICT,
            ]
            .map(str::to_string),
        );
        let mut locator = match text {
            Some(text) => Locator::with_known_dimensions(text, &known)?,
            None => {
                let mut locator = Locator::empty();
                locator.add_known_dimensions(known);
                locator
            }
        };
        if let Some(defaults) = defaults {
            locator.apply_defaults(defaults);
        }
        locator.add_hidden_dimensions([
            DIMENSION_OR,
            DIMENSION_AND,
            DIMENSION_NOT,
            DIMENSION_ITEM,
            DIMENSION_UNIQUE,
            DIMENSION_STRICT,
            Locator::HELP,
        ]);
        locator.add_hidden_dimensions(self.binding.hidden_dimensions());
        locator.add_ignored_if_unused([DIMENSION_COUNT, DIMENSION_STRICT]);
        Ok(locator)
    }

    // ========================================================================
    // Query execution
    // ========================================================================

    fn items_by_locator(
        &self,
        locator: Option<Locator>,
        multi: bool,
        depth: usize,
    ) -> Result<PagedSearchResult<T>> {
        let locator = match locator {
            // No locator at all: scan everything with default paging.
            None => self.create_locator(None, None)?,
            Some(mut locator) => match self.binding.find_single_item(&mut locator) {
                Ok(Some(item)) => {
                    return self.finish_single_item(item, locator, multi, depth);
                }
                Ok(None) => {
                    // The fast path did not apply; whatever it read must not
                    // count as consumed.
                    locator.mark_all_unused();
                    locator
                }
                Err(err) if err.is_not_found() => {
                    if multi && !strict(&mut locator)? {
                        return Ok(PagedSearchResult::empty());
                    }
                    return Err(err);
                }
                Err(err) => return Err(with_help_details(err, &mut locator)),
            },
        };
        self.run_scan(locator, depth)
    }

    /// Finishes the single-item fast path: the remaining dimensions must
    /// all be consumed by the filter, and the found item must pass it.
    fn finish_single_item(
        &self,
        item: T,
        mut locator: Locator,
        multi: bool,
        depth: usize,
    ) -> Result<PagedSearchResult<T>> {
        let identifying = locator.used_dimensions();
        // An explicit start:0 is satisfied by a direct hit; any other start
        // contradicts it and must be reported as unused.
        let start = locator.i64_of(DIMENSION_START)?;
        if start != Some(0) {
            locator.mark_unused(DIMENSION_START);
        }
        let filter = match self.filter_with_logic_ops(&mut locator, depth + 1) {
            Ok(filter) => filter,
            Err(err) => return Err(single_item_filter_error(err)),
        };
        let _ = locator.single_value_of(DIMENSION_UNIQUE)?; // no effect on a single item
        locator.check_fully_processed()?;
        if filter.is_included(&item) {
            return Ok(PagedSearchResult::single(item));
        }
        let message = format!(
            "found a single item by dimension(s) {identifying:?} but the full locator \
             '{locator}' filtered it out"
        );
        if multi && !strict(&mut locator)? {
            debug!(locator = %locator, "single item filtered out, returning an empty result");
            Ok(PagedSearchResult::empty())
        } else {
            Err(FinderError::not_found(message))
        }
    }

    fn run_scan(&self, mut locator: Locator, depth: usize) -> Result<PagedSearchResult<T>> {
        let item_sub_locators = locator.values_of(DIMENSION_ITEM);
        let mut holder: Box<dyn ItemHolder<T>> = if item_sub_locators.is_empty() {
            self.binding.prefiltered_items(&mut locator)?
        } else {
            self.union_of_items(&item_sub_locators, depth)?
        };
        if let Some(seen) = self.binding.container_set() {
            let deduplicate =
                locator.strict_bool_of(DIMENSION_UNIQUE, !item_sub_locators.is_empty())?;
            if deduplicate {
                holder = Box::new(DeduplicatingItemHolder::new(holder, seen));
            }
        }

        let filter = self.filter_with_logic_ops(&mut locator, depth + 1)?;

        let start =
            non_negative(locator.i64_of(DIMENSION_START)?, DIMENSION_START)?.map(|v| v as usize);
        let count = match non_negative(locator.i64_of(DIMENSION_COUNT)?, DIMENSION_COUNT)? {
            Some(count) => Some(count as usize),
            None => self.binding.default_page_items_count(),
        };
        let explicit_limit = non_negative(
            locator.i64_of(DIMENSION_LOOKUP_LIMIT)?,
            DIMENSION_LOOKUP_LIMIT,
        )?;
        let mut lookup_limit = explicit_limit.or_else(|| self.binding.default_lookup_limit());
        // "Give me N items" must never under-scan because the default scan
        // cap happens to be smaller than N.
        if let (Some(count), Some(limit), None) = (count, lookup_limit, explicit_limit) {
            if limit < count as u64 {
                lookup_limit = Some(count as u64);
            }
        }

        // Fail on unconsumed dimensions before touching the backend.
        locator.check_fully_processed()?;

        let paging = PagingFilter::new(filter, start, count, lookup_limit);
        let result = paging.scan(holder.as_mut());

        debug!(
            locator = %locator,
            matched = result.entries.len(),
            scanned = result.total_items_scanned,
            lookup_limit_reached = result.lookup_limit_reached,
            "locator scan finished"
        );
        if result.total_items_scanned > LARGE_SCAN_WARNING {
            warn!(
                locator = %locator,
                scanned = result.total_items_scanned,
                matched = result.entries.len(),
                "locator scan processed a large number of items"
            );
        }

        if result.is_empty() && strict(&mut locator)? {
            return Err(FinderError::not_found(format!(
                "nothing is found by locator '{locator}'"
            )));
        }
        Ok(result)
    }

    /// Resolves each `item:` value as a complete query and unions the
    /// result sets in declaration order.
    fn union_of_items(
        &self,
        sub_locators: &[String],
        depth: usize,
    ) -> Result<Box<dyn ItemHolder<T>>> {
        let mut holders: Vec<Box<dyn ItemHolder<T>>> = Vec::new();
        for sub in sub_locators {
            let resolved = self.query_at_depth(sub, depth + 1)?;
            holders.push(sequence_holder(resolved.entries));
        }
        Ok(Box::new(UnionItemHolder::new(holders)))
    }

    fn query_at_depth(&self, locator_text: &str, depth: usize) -> Result<PagedSearchResult<T>> {
        check_depth(depth)?;
        let locator = self.create_locator(Some(locator_text), None)?;
        self.items_by_locator(Some(locator), true, depth)
    }

    // ========================================================================
    // Filter assembly
    // ========================================================================

    /// The binding's filter AND the `or`/`and`/`not` dimensions, each of
    /// which resolves its sub-locator through the engine recursively.
    fn filter_with_logic_ops(&self, locator: &mut Locator, depth: usize) -> Result<ItemFilter<T>> {
        let mut parts = vec![self.binding.filter(locator)?];
        if let Some(sub) = locator.single_value_of(DIMENSION_OR)? {
            let branches = self
                .sub_locator_list(&sub)?
                .iter()
                .map(|text| self.filter_at_depth(text, depth + 1))
                .collect::<Result<Vec<_>>>()?;
            parts.push(ItemFilter::any(branches));
        }
        if let Some(sub) = locator.single_value_of(DIMENSION_AND)? {
            parts.push(self.filter_at_depth(&sub, depth + 1)?);
        }
        if let Some(sub) = locator.single_value_of(DIMENSION_NOT)? {
            parts.push(self.filter_at_depth(&sub, depth + 1)?.negate());
        }
        Ok(if parts.len() == 1 {
            parts.remove(0)
        } else {
            ItemFilter::all(parts)
        })
    }

    fn filter_at_depth(&self, locator_text: &str, depth: usize) -> Result<ItemFilter<T>> {
        check_depth(depth)?;
        let mut locator = self.create_locator(Some(locator_text), None)?;
        let filter = match self.filter_with_logic_ops(&mut locator, depth) {
            Ok(filter) => filter,
            Err(err) => return Err(with_help_details(err, &mut locator)),
        };
        locator.check_fully_processed()?;
        Ok(filter)
    }

    /// Explodes an `or:` sub-locator into one branch per dimension value; a
    /// single-value sub-locator is one branch.
    fn sub_locator_list(&self, locator_text: &str) -> Result<Vec<String>> {
        let mut locator = Locator::new(locator_text)?;
        if locator.is_single_value() {
            return Ok(vec![locator.text()]);
        }
        let mut result = Vec::new();
        for name in locator.defined_dimensions() {
            for value in locator.values_of(&name) {
                result.push(Locator::text_from_pairs(&[(name.as_str(), value.as_str())]));
            }
        }
        Ok(result)
    }
}

fn check_depth(depth: usize) -> Result<()> {
    if depth > MAX_SUB_LOCATOR_DEPTH {
        return Err(FinderError::Locator(LocatorError::Parse {
            position: 1,
            message: format!(
                "sub-locators nest deeper than the supported maximum of {MAX_SUB_LOCATOR_DEPTH}"
            ),
        }));
    }
    Ok(())
}

/// Whether an empty result must be reported as not-found. Help requests are
/// always strict so the caller sees the dimension listing.
fn strict(locator: &mut Locator) -> Result<bool> {
    Ok(locator.strict_bool_of(DIMENSION_STRICT, false)? || locator.help_requested())
}

/// On a help request, failures carry the known-dimension listing.
fn with_help_details(err: FinderError, locator: &mut Locator) -> FinderError {
    if !locator.help_requested() {
        return err;
    }
    let mut options = locator.help_options();
    let include_hidden = options.strict_bool_of("hidden", false).unwrap_or(false);
    let details = format!("locator details: {}", locator.description(include_hidden));
    match err {
        FinderError::Locator(inner) => FinderError::Locator(inner.with_detail(&details)),
        FinderError::NotFound { message } => {
            FinderError::not_found(format!("{message}\n{details}"))
        }
        FinderError::Ambiguous { message } => {
            FinderError::ambiguous(format!("{message}\n{details}"))
        }
    }
}

/// A filter that rejects dimensions after an item was already uniquely
/// identified usually means the extra dimensions were a mistake.
fn single_item_filter_error(err: FinderError) -> FinderError {
    const HINT: &str = "invalid filter for the directly found item, try omitting extra dimensions";
    match err {
        FinderError::NotFound { message } => FinderError::not_found(format!("{HINT}: {message}")),
        FinderError::Locator(inner) => FinderError::Locator(inner.with_detail(HINT)),
        other => other,
    }
}

fn non_negative(value: Option<i64>, name: &str) -> Result<Option<u64>> {
    match value {
        Some(v) if v < 0 => Err(FinderError::Locator(LocatorError::InvalidValue {
            message: format!("dimension '{name}' must not be negative, got {v}"),
        })),
        Some(v) => Ok(Some(v as u64)),
        None => Ok(None),
    }
}
