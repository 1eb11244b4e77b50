//! Memoized selectors
//!
//! A [`Memo`] caches the output of a derivation keyed by the values of its
//! dependencies. Each dependency declares how it is compared against the
//! last-seen value:
//!
//! - [`ByRef`]: pointer identity of an `Arc`. Cheap, and correct whenever the
//!   reducers that produce the value always allocate a new `Arc` on change.
//! - [`ByValue`]: `PartialEq`. Use it for small values, or for values that may
//!   change without a new allocation.
//!
//! Keys are tuples of these wrappers, so a selector with several inputs names
//! one strategy per input.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use todo_dispatch_core::select::{ByRef, ByValue, Memo};
//!
//! type Key = (ByRef<Vec<u32>>, ByValue<u32>);
//!
//! fn above((ByRef(values), ByValue(min)): &Key) -> Arc<Vec<u32>> {
//!     Arc::new(values.iter().copied().filter(|v| v > min).collect())
//! }
//!
//! let values = Arc::new(vec![1, 5, 9]);
//! let mut memo: Memo<Key, Arc<Vec<u32>>> = Memo::new();
//!
//! let first = memo.get((ByRef(values.clone()), ByValue(4)), above);
//! let again = memo.get((ByRef(values.clone()), ByValue(4)), above);
//! assert!(Arc::ptr_eq(&first, &again));
//! assert_eq!(*first, vec![5, 9]);
//! assert_eq!(memo.recomputations(), 1);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// A cache key that knows how to compare itself with a previously seen key.
pub trait CacheKey {
    /// Returns `true` when a cached value computed for `other` may be reused for `self`.
    fn same(&self, other: &Self) -> bool;
}

/// Dependency compared by `Arc` pointer identity.
pub struct ByRef<T: ?Sized>(pub Arc<T>);

impl<T: ?Sized> Clone for ByRef<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> fmt::Debug for ByRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByRef").field(&Arc::as_ptr(&self.0)).finish()
    }
}

impl<T: ?Sized> CacheKey for ByRef<T> {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Dependency compared by value.
#[derive(Clone, Debug)]
pub struct ByValue<T>(pub T);

impl<T: PartialEq> CacheKey for ByValue<T> {
    fn same(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl CacheKey for () {
    fn same(&self, _other: &Self) -> bool {
        true
    }
}

macro_rules! tuple_cache_key {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: CacheKey),+> CacheKey for ($($name,)+) {
            fn same(&self, other: &Self) -> bool {
                $(self.$idx.same(&other.$idx))&&+
            }
        }
    };
}

tuple_cache_key!(A: 0);
tuple_cache_key!(A: 0, B: 1);
tuple_cache_key!(A: 0, B: 1, C: 2);
tuple_cache_key!(A: 0, B: 1, C: 2, D: 3);

/// Explicit memoization cache for one derivation.
///
/// Holds up to `capacity` entries, most recently used first. A lookup that
/// matches an entry returns a clone of the cached value (for `Arc` outputs,
/// the same allocation) and moves it to the front. A miss computes, inserts
/// at the front and evicts the least recently used entry.
pub struct Memo<K, V> {
    entries: VecDeque<(K, V)>,
    capacity: usize,
    recomputations: usize,
}

impl<K: CacheKey, V: Clone> Memo<K, V> {
    /// Cache that remembers only the last input combination.
    pub fn new() -> Self {
        Self::with_capacity(1)
    }

    /// Cache that remembers up to `capacity` input combinations (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            recomputations: 0,
        }
    }

    /// Return the cached value for `key`, computing it on a miss.
    pub fn get<F>(&mut self, key: K, compute: F) -> V
    where
        F: FnOnce(&K) -> V,
    {
        if let Some(pos) = self.entries.iter().position(|(seen, _)| seen.same(&key)) {
            if pos > 0 {
                if let Some(entry) = self.entries.remove(pos) {
                    self.entries.push_front(entry);
                }
            }
            if let Some((_, value)) = self.entries.front() {
                return value.clone();
            }
        }

        self.recomputations += 1;
        let value = compute(&key);
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front((key, value.clone()));
        value
    }

    /// How many times the derivation has run.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached entry. The recomputation count is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: CacheKey, V: Clone> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for Memo<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("entries", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("recomputations", &self.recomputations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Lengths = Memo<(ByRef<Vec<u32>>,), usize>;

    fn len_of((ByRef(v),): &(ByRef<Vec<u32>>,)) -> usize {
        v.len()
    }

    #[test]
    fn test_hit_returns_cached_without_recompute() {
        let data = Arc::new(vec![1, 2, 3]);
        let mut memo = Lengths::new();

        assert_eq!(memo.get((ByRef(data.clone()),), len_of), 3);
        assert_eq!(memo.get((ByRef(data.clone()),), len_of), 3);
        assert_eq!(memo.recomputations(), 1);
    }

    #[test]
    fn test_by_ref_misses_on_equal_but_new_allocation() {
        let mut memo = Lengths::new();

        memo.get((ByRef(Arc::new(vec![1])),), len_of);
        memo.get((ByRef(Arc::new(vec![1])),), len_of);
        assert_eq!(memo.recomputations(), 2);
    }

    #[test]
    fn test_by_value_hits_on_equal_values() {
        let mut memo: Memo<(ByValue<Vec<&str>>,), usize> = Memo::new();

        memo.get((ByValue(vec!["red"]),), |(ByValue(v),)| v.len());
        memo.get((ByValue(vec!["red"]),), |(ByValue(v),)| v.len());
        assert_eq!(memo.recomputations(), 1);

        memo.get((ByValue(vec!["red", "blue"]),), |(ByValue(v),)| v.len());
        assert_eq!(memo.recomputations(), 2);
    }

    #[test]
    fn test_any_dependency_change_invalidates() {
        let data = Arc::new(vec![1, 2, 3, 4]);
        let mut memo: Memo<(ByRef<Vec<u32>>, ByValue<u32>), Arc<Vec<u32>>> = Memo::new();
        let above = |(ByRef(v), ByValue(min)): &(ByRef<Vec<u32>>, ByValue<u32>)| {
            Arc::new(v.iter().copied().filter(|n| *n > *min).collect::<Vec<_>>())
        };

        let first = memo.get((ByRef(data.clone()), ByValue(2)), above);
        let same = memo.get((ByRef(data.clone()), ByValue(2)), above);
        assert!(Arc::ptr_eq(&first, &same));

        let other = memo.get((ByRef(data.clone()), ByValue(3)), above);
        assert_eq!(*other, vec![4]);
        assert_eq!(memo.recomputations(), 2);
    }

    #[test]
    fn test_empty_results_for_different_keys_do_not_collide() {
        let data = Arc::new(vec![1, 2]);
        let mut memo: Memo<(ByRef<Vec<u32>>, ByValue<u32>), Arc<Vec<u32>>> = Memo::new();
        let above = |(ByRef(v), ByValue(min)): &(ByRef<Vec<u32>>, ByValue<u32>)| {
            Arc::new(v.iter().copied().filter(|n| *n > *min).collect::<Vec<_>>())
        };

        let a = memo.get((ByRef(data.clone()), ByValue(10)), above);
        let b = memo.get((ByRef(data.clone()), ByValue(20)), above);
        assert!(a.is_empty() && b.is_empty());
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(memo.recomputations(), 2);
    }

    #[test]
    fn test_capacity_keeps_recent_entries() {
        let a = Arc::new(vec![1]);
        let b = Arc::new(vec![1, 2]);
        let c = Arc::new(vec![1, 2, 3]);
        let mut memo = Lengths::with_capacity(2);

        memo.get((ByRef(a.clone()),), len_of);
        memo.get((ByRef(b.clone()),), len_of);
        memo.get((ByRef(a.clone()),), len_of);
        assert_eq!(memo.recomputations(), 2);
        assert_eq!(memo.len(), 2);

        // b is now least recently used
        memo.get((ByRef(c.clone()),), len_of);
        memo.get((ByRef(a.clone()),), len_of);
        assert_eq!(memo.recomputations(), 3);
        memo.get((ByRef(b.clone()),), len_of);
        assert_eq!(memo.recomputations(), 4);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let data = Arc::new(vec![7]);
        let mut memo = Lengths::with_capacity(0);

        memo.get((ByRef(data.clone()),), len_of);
        memo.get((ByRef(data.clone()),), len_of);
        assert_eq!(memo.recomputations(), 1);
    }

    #[test]
    fn test_clear() {
        let data = Arc::new(vec![7]);
        let mut memo = Lengths::new();

        memo.get((ByRef(data.clone()),), len_of);
        memo.clear();
        assert!(memo.is_empty());
        memo.get((ByRef(data.clone()),), len_of);
        assert_eq!(memo.recomputations(), 2);
    }

    #[test]
    fn test_unit_key_computes_once() {
        let mut memo: Memo<(), &'static str> = Memo::new();
        memo.get((), |_| "once");
        memo.get((), |_| "twice");
        assert_eq!(memo.get((), |_| "thrice"), "once");
    }
}
