//! Generic find/filter/paginate engine driven by locator queries.
//!
//! A *locator* (see `pinpoint-locator`) selects a subset of in-memory items
//! with one compact string. This crate executes locators: a per-entity
//! [`DataBinding`] supplies the raw item stream and a base predicate, and the
//! [`Finder`] engine layers everything generic on top:
//!
//! - a single-item fast path for locators that identify one item directly
//! - logical composition via the `or`, `and` and `not` dimensions
//! - item-level unions via `item:`, deduplicated when the binding defines an
//!   identity (`unique` toggles this explicitly)
//! - paging via `start`, `count` and the scan-bounding `lookupLimit`
//! - used-dimension verification, so unknown dimensions fail fast instead of
//!   silently matching everything
//!
//! Execution is synchronous and single-threaded per query; scans over
//! unbounded backends terminate through the lookup limit and the filters'
//! early-stop hints rather than through timeouts.
//!
//! # Example
//!
//! ```no_run
//! use pinpoint_finder::{sequence_holder, DataBinding, Finder, ItemFilter, ItemHolder, Locator};
//! # struct Builds;
//! # impl DataBinding<u64> for Builds {
//! #     fn known_dimensions(&self) -> Vec<String> { vec!["state".into(), "id".into()] }
//! #     fn prefiltered_items(&self, _: &mut Locator) -> pinpoint_finder::Result<Box<dyn ItemHolder<u64>>> {
//! #         Ok(sequence_holder(Vec::<u64>::new()))
//! #     }
//! #     fn filter(&self, _: &mut Locator) -> pinpoint_finder::Result<ItemFilter<u64>> {
//! #         Ok(ItemFilter::accept_all())
//! #     }
//! #     fn item_locator(&self, item: &u64) -> String { format!("id:{item}") }
//! # }
//!
//! let finder = Finder::new(Builds);
//!
//! // Page through failed builds:
//! let failed = finder.items(Some("state:failed,start:20,count:10")).unwrap();
//!
//! // Either of two states, excluding one id:
//! let odd = finder.items(Some("or:(state:failed,state:hung),not:(id:7)")).unwrap();
//! ```

mod binding;
mod error;
mod filter;
mod finder;
mod holder;
mod paging;
mod result;

pub use binding::DataBinding;
pub use error::{FinderError, Result};
pub use filter::ItemFilter;
pub use finder::{
    Finder, DIMENSION_AND, DIMENSION_COUNT, DIMENSION_ITEM, DIMENSION_LOOKUP_LIMIT, DIMENSION_NOT,
    DIMENSION_OR, DIMENSION_START, DIMENSION_STRICT, DIMENSION_UNIQUE,
};
pub use holder::{
    sequence_holder, ContainerSet, DeduplicatingItemHolder, ItemHolder, KeyedContainerSet,
    SequenceItemHolder, UnionItemHolder,
};
pub use paging::PagingFilter;
pub use result::PagedSearchResult;

pub use pinpoint_locator::{Locator, LocatorError};
