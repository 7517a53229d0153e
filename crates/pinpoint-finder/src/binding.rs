//! The capability seam between the generic engine and an entity kind.

use pinpoint_locator::Locator;

use crate::error::Result;
use crate::filter::ItemFilter;
use crate::holder::{ContainerSet, ItemHolder};

/// What an entity kind must supply for the engine to execute locators
/// against it.
///
/// The engine owns all orchestration (logic-op dimensions, paging,
/// deduplication, usage checking); the binding only translates locator
/// dimensions into a coarse item supply and a fine predicate. Dimension
/// readers mark dimensions used, which is how the engine later tells a typo
/// from a consumed dimension, so a binding should read exactly the
/// dimensions it understands.
pub trait DataBinding<T> {
    /// Dimension names this binding understands, for diagnostics and help
    /// output. Reserved engine dimensions are added automatically.
    fn known_dimensions(&self) -> Vec<String>;

    /// Additional names to accept silently (not listed in help or errors).
    fn hidden_dimensions(&self) -> Vec<String> {
        Vec::new()
    }

    /// The cheap, coarse candidate supply for this locator. The fine
    /// [`DataBinding::filter`] predicate is applied on top by the engine.
    fn prefiltered_items(&self, locator: &mut Locator) -> Result<Box<dyn ItemHolder<T>>>;

    /// The fine-grained predicate for this locator.
    fn filter(&self, locator: &mut Locator) -> Result<ItemFilter<T>>;

    /// Optional fast path: resolve the locator directly to one item.
    ///
    /// Return `Ok(None)` when the locator does not identify a single item
    /// (the engine falls back to a scan), and a not-found error when it
    /// does but the item is absent.
    fn find_single_item(&self, _locator: &mut Locator) -> Result<Option<T>> {
        Ok(None)
    }

    /// Default page size when the locator has no `count`; `None` means
    /// unbounded.
    fn default_page_items_count(&self) -> Option<usize> {
        None
    }

    /// Default scan bound when the locator has no `lookupLimit`; `None`
    /// means unbounded.
    fn default_lookup_limit(&self) -> Option<u64> {
        None
    }

    /// A fresh uniqueness container, when this entity kind has an identity
    /// to deduplicate by. `None` disables deduplication.
    fn container_set(&self) -> Option<Box<dyn ContainerSet<T>>> {
        None
    }

    /// Canonical locator text that resolves back to `item`.
    fn item_locator(&self, item: &T) -> String;
}
