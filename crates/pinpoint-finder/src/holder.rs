//! Lazy, push-based item supplies.
//!
//! An [`ItemHolder`] pushes candidate items to a consumer until the consumer
//! asks it to stop, which lets a scan over an unbounded backend terminate as
//! soon as the paging bounds are satisfied. Holders compose: a union holder
//! concatenates sub-results, and a deduplicating holder drops repeated
//! sightings of the same logical item.

use std::collections::BTreeSet;
use std::marker::PhantomData;

/// A supply of candidate items, driven by pushing into a consumer.
///
/// `process` must call `consumer` for each item in order and return early as
/// soon as the consumer returns `false`. A holder is single-use: processing
/// it again yields nothing.
pub trait ItemHolder<T> {
    fn process(&mut self, consumer: &mut dyn FnMut(T) -> bool);
}

/// A holder over any finite (or lazily generated) sequence.
pub struct SequenceItemHolder<I> {
    items: Option<I>,
}

impl<I: Iterator> SequenceItemHolder<I> {
    pub fn new(items: impl IntoIterator<IntoIter = I>) -> Self {
        SequenceItemHolder {
            items: Some(items.into_iter()),
        }
    }
}

impl<T, I: Iterator<Item = T>> ItemHolder<T> for SequenceItemHolder<I> {
    fn process(&mut self, consumer: &mut dyn FnMut(T) -> bool) {
        if let Some(items) = self.items.take() {
            for item in items {
                if !consumer(item) {
                    return;
                }
            }
        }
    }
}

/// Boxes a sequence as a holder trait object.
pub fn sequence_holder<T, I>(items: I) -> Box<dyn ItemHolder<T>>
where
    T: 'static,
    I: IntoIterator<Item = T>,
    I::IntoIter: 'static,
{
    Box::new(SequenceItemHolder::new(items))
}

/// Concatenates sub-holders in declaration order. Duplicates are possible;
/// wrap in a [`DeduplicatingItemHolder`] to suppress them.
pub struct UnionItemHolder<T> {
    holders: Vec<Box<dyn ItemHolder<T>>>,
}

impl<T> UnionItemHolder<T> {
    pub fn new(holders: Vec<Box<dyn ItemHolder<T>>>) -> Self {
        UnionItemHolder { holders }
    }
}

impl<T> ItemHolder<T> for UnionItemHolder<T> {
    fn process(&mut self, consumer: &mut dyn FnMut(T) -> bool) {
        for holder in &mut self.holders {
            let mut keep_going = true;
            holder.process(&mut |item| {
                keep_going = consumer(item);
                keep_going
            });
            if !keep_going {
                return;
            }
        }
    }
}

/// Tracks which items were already seen, by whatever identity the entity
/// kind defines.
pub trait ContainerSet<T> {
    /// Records `item`; returns `true` the first time it is seen.
    fn insert(&mut self, item: &T) -> bool;
}

/// A [`ContainerSet`] keyed by a caller-derived ordered key.
pub struct KeyedContainerSet<T, K, F> {
    keys: BTreeSet<K>,
    key_fn: F,
    _marker: PhantomData<fn(&T)>,
}

impl<T, K: Ord, F: Fn(&T) -> K> KeyedContainerSet<T, K, F> {
    pub fn new(key_fn: F) -> Self {
        KeyedContainerSet {
            keys: BTreeSet::new(),
            key_fn,
            _marker: PhantomData,
        }
    }
}

impl<T, K: Ord, F: Fn(&T) -> K> ContainerSet<T> for KeyedContainerSet<T, K, F> {
    fn insert(&mut self, item: &T) -> bool {
        self.keys.insert((self.key_fn)(item))
    }
}

/// Forwards only the first sighting of each item to the consumer.
pub struct DeduplicatingItemHolder<T> {
    inner: Box<dyn ItemHolder<T>>,
    seen: Box<dyn ContainerSet<T>>,
}

impl<T> DeduplicatingItemHolder<T> {
    pub fn new(inner: Box<dyn ItemHolder<T>>, seen: Box<dyn ContainerSet<T>>) -> Self {
        DeduplicatingItemHolder { inner, seen }
    }
}

impl<T> ItemHolder<T> for DeduplicatingItemHolder<T> {
    fn process(&mut self, consumer: &mut dyn FnMut(T) -> bool) {
        let seen = &mut self.seen;
        self.inner.process(&mut |item| {
            if seen.insert(&item) {
                consumer(item)
            } else {
                true
            }
        });
    }
}
