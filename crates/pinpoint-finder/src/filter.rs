//! Filter primitives: a predicate plus an early-stop hint, composed with
//! AND/OR/NOT.
//!
//! The combinators form a closed variant tree evaluated by one dispatcher;
//! only the leaf predicates are open (any boxed function, usually built by a
//! data binding). `should_stop` is a hint that no later item in the holder's
//! order can match, allowing a scan over an unbounded backend to terminate:
//!
//! - `all`: stops only when every child stops (a single non-stopping child
//!   keeps the scan alive).
//! - `any`: stops only when every child stops.
//! - `negate`: never stops, since rejecting earlier items says nothing about
//!   later ones.

/// A filter over items of type `T`: an inclusion predicate and an early-stop
/// hint.
///
/// # Example
///
/// ```
/// use pinpoint_finder::ItemFilter;
///
/// let evens = ItemFilter::from_fn(|n: &i64| n % 2 == 0);
/// let big = ItemFilter::from_fn(|n: &i64| *n > 10);
/// let either = ItemFilter::any(vec![evens, big]);
/// assert!(either.is_included(&12));
/// assert!(either.is_included(&4));
/// assert!(!either.is_included(&7));
/// ```
pub struct ItemFilter<T> {
    node: FilterNode<T>,
}

enum FilterNode<T> {
    /// Accepts everything; never stops.
    True,
    /// A leaf predicate supplied by a data binding.
    Base {
        include: Box<dyn Fn(&T) -> bool>,
        stop: Option<Box<dyn Fn(&T) -> bool>>,
    },
    All(Vec<FilterNode<T>>),
    Any(Vec<FilterNode<T>>),
    Not(Box<FilterNode<T>>),
}

impl<T> ItemFilter<T> {
    /// A filter that accepts every item.
    pub fn accept_all() -> Self {
        ItemFilter {
            node: FilterNode::True,
        }
    }

    /// A leaf filter from an inclusion predicate; never signals stop.
    pub fn from_fn(include: impl Fn(&T) -> bool + 'static) -> Self {
        ItemFilter {
            node: FilterNode::Base {
                include: Box::new(include),
                stop: None,
            },
        }
    }

    /// A leaf filter with an explicit early-stop hint.
    pub fn with_stop(
        include: impl Fn(&T) -> bool + 'static,
        stop: impl Fn(&T) -> bool + 'static,
    ) -> Self {
        ItemFilter {
            node: FilterNode::Base {
                include: Box::new(include),
                stop: Some(Box::new(stop)),
            },
        }
    }

    /// The conjunction of `filters`. Empty input accepts everything.
    pub fn all(filters: Vec<ItemFilter<T>>) -> Self {
        ItemFilter {
            node: FilterNode::All(filters.into_iter().map(|f| f.node).collect()),
        }
    }

    /// The disjunction of `filters`. Empty input accepts nothing.
    pub fn any(filters: Vec<ItemFilter<T>>) -> Self {
        ItemFilter {
            node: FilterNode::Any(filters.into_iter().map(|f| f.node).collect()),
        }
    }

    /// The negation of this filter.
    pub fn negate(self) -> Self {
        ItemFilter {
            node: FilterNode::Not(Box::new(self.node)),
        }
    }

    /// Whether `item` satisfies the filter.
    pub fn is_included(&self, item: &T) -> bool {
        included(&self.node, item)
    }

    /// Whether no item after `item` can possibly match. Conservative:
    /// `false` unless every contributing leaf says otherwise.
    pub fn should_stop(&self, item: &T) -> bool {
        stops(&self.node, item)
    }
}

fn included<T>(node: &FilterNode<T>, item: &T) -> bool {
    match node {
        FilterNode::True => true,
        FilterNode::Base { include, .. } => include(item),
        FilterNode::All(children) => children.iter().all(|c| included(c, item)),
        FilterNode::Any(children) => children.iter().any(|c| included(c, item)),
        FilterNode::Not(inner) => !included(inner, item),
    }
}

fn stops<T>(node: &FilterNode<T>, item: &T) -> bool {
    match node {
        FilterNode::True => false,
        FilterNode::Base { stop, .. } => stop.as_ref().is_some_and(|s| s(item)),
        FilterNode::All(children) => !children.is_empty() && children.iter().all(|c| stops(c, item)),
        FilterNode::Any(children) => !children.is_empty() && children.iter().all(|c| stops(c, item)),
        FilterNode::Not(_) => false,
    }
}
