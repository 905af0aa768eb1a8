use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::mem;
use core::ops::{Index, RangeBounds};

use crate::comparator::{Comparator, Natural};
use crate::cursor::Direction;
use crate::error::Error;
use crate::raw::RawTree;

mod capacity;

pub use crate::cursor::{Cursor, CursorMut};
pub use crate::iter::{IntoIter, IntoKeys, IntoValues, Iter, IterMut, Keys, Range, Values, ValuesMut};

/// An ordered map stored as a red-black tree inside one contiguous array.
///
/// Entries live in a packed array and refer to each other by index rather than by pointer, so the
/// whole map is a single allocation. Erasing an entry moves the last entry of the array into the
/// hole, keeping the array dense. Keys are ordered by a [`Comparator`], [`Natural`] (the key's
/// [`Ord`]) by default.
///
/// Iterators obtained from [`FlatMap::iter`], [`FlatMap::into_iter`], [`FlatMap::values`] or
/// [`FlatMap::keys`] produce their items in key order. The first and last entries are cached, so
/// [`first_key_value`](FlatMap::first_key_value) and [`last_key_value`](FlatMap::last_key_value)
/// are O(1), as is inserting a new minimum or maximum key.
///
/// It is a logic error for a key to be modified in such a way that its ordering relative to any
/// other key changes while it is in the map. The behavior resulting from such a logic error is not
/// specified, but will be encapsulated to the `FlatMap` that observed it and not result in
/// undefined behavior.
///
/// # Examples
///
/// ```
/// use flatrb::FlatMap;
///
/// let mut movie_reviews = FlatMap::new();
///
/// movie_reviews.insert("Office Space", "Deals with real issues in the workplace.");
/// movie_reviews.insert("Pulp Fiction", "Masterpiece.");
/// movie_reviews.insert("The Godfather", "Very enjoyable.");
/// movie_reviews.insert("The Blues Brothers", "Eye lyked it a lot.");
///
/// if !movie_reviews.contains_key("Les Miserables") {
///     println!("We've got {} reviews, but Les Miserables ain't one.", movie_reviews.len());
/// }
///
/// // `insert` never overwrites; `insert_or_assign` does.
/// let (_, inserted) = movie_reviews.insert("Pulp Fiction", "Overrated.");
/// assert!(!inserted);
/// movie_reviews.insert_or_assign("The Blues Brothers", "I liked it a lot.");
///
/// assert_eq!(movie_reviews.erase("Office Space"), 1);
/// assert_eq!(movie_reviews.erase("Office Space"), 0);
///
/// println!("Movie review: {}", movie_reviews["Pulp Fiction"]);
///
/// for (movie, review) in &movie_reviews {
///     println!("{movie}: \"{review}\"");
/// }
/// ```
///
/// A `FlatMap` with a known list of items can be initialized from an array:
///
/// ```
/// use flatrb::FlatMap;
///
/// let solar_distance = FlatMap::from([
///     ("Mercury", 0.4),
///     ("Venus", 0.7),
///     ("Earth", 1.0),
///     ("Mars", 1.5),
/// ]);
/// assert_eq!(solar_distance.first_key_value(), Some((&"Earth", &1.0)));
/// ```
#[derive(Clone)]
pub struct FlatMap<K, V, C = Natural> {
    raw: RawTree<K, V>,
    comparator: C,
}

impl<K, V> FlatMap<K, V> {
    /// Makes a new, empty `FlatMap`. Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map = FlatMap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<K, V, C> FlatMap<K, V, C> {
    /// Makes a new, empty `FlatMap` ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::{FlatMap, Reverse};
    ///
    /// let map = FlatMap::<_, _, Reverse>::from_iter([(1, 'a'), (2, 'b')]);
    /// assert_eq!(map.first_key_value(), Some((&2, &'b')));
    ///
    /// let mut by_len = FlatMap::with_comparator(flatrb::FnComparator(|a: &&str, b: &&str| a.len().cmp(&b.len())));
    /// by_len.insert("ccc", 3);
    /// by_len.insert("a", 1);
    /// assert_eq!(by_len.keys().copied().collect::<Vec<_>>(), ["a", "ccc"]);
    /// ```
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            raw: RawTree::new_dense(),
            comparator,
        }
    }

    /// Returns the comparator that orders the keys.
    #[must_use]
    pub const fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut a = FlatMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the map, removing all elements. The capacity is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut a = FlatMap::with_capacity(8);
    /// a.insert(1, "a");
    /// a.clear();
    /// assert!(a.is_empty());
    /// assert_eq!(a.capacity(), 8);
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Swaps the contents, comparators included, of two maps in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Returns the first entry in the map. The key in this pair is the minimum key in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map = FlatMap::new();
    /// assert_eq!(map.first_key_value(), None);
    /// map.insert(1, "b");
    /// map.insert(2, "a");
    /// assert_eq!(map.first_key_value(), Some((&1, &"b")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first().map(|handle| self.raw.entry(handle))
    }

    /// Returns the last entry in the map. The key in this pair is the maximum key in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last().map(|handle| self.raw.entry(handle))
    }

    /// Removes and returns the first element in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map = FlatMap::from([(1, "a"), (2, "b")]);
    /// assert_eq!(map.pop_first(), Some((1, "a")));
    /// assert_eq!(map.pop_first(), Some((2, "b")));
    /// assert_eq!(map.pop_first(), None);
    /// ```
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let handle = self.raw.first()?;
        Some(self.raw.remove(handle))
    }

    /// Removes and returns the last element in the map.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let handle = self.raw.last()?;
        Some(self.raw.remove(handle))
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let map = FlatMap::from([(3, "c"), (2, "b"), (1, "a")]);
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw)
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map = FlatMap::from([("a", 1), ("b", 2), ("c", 3)]);
    /// for (key, value) in map.iter_mut() {
    ///     if key != &"a" {
    ///         *value += 10;
    ///     }
    /// }
    /// assert_eq!(map.values().copied().collect::<Vec<_>>(), [1, 12, 13]);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.raw)
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Gets a mutable iterator over the values of the map, in order by key.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.iter_mut())
    }

    /// Creates a consuming iterator visiting all the keys, in sorted order.
    pub fn into_keys(self) -> IntoKeys<K, V> {
        IntoKeys::new(self.into_iter())
    }

    /// Creates a consuming iterator visiting all the values, in order by key.
    pub fn into_values(self) -> IntoValues<K, V> {
        IntoValues::new(self.into_iter())
    }

    /// Cursor at the least key, or the end if the map is empty.
    pub fn begin(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.raw, self.raw.first(), Direction::Forward)
    }

    /// Cursor one past the greatest key.
    pub fn end(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.raw, None, Direction::Forward)
    }

    /// Reverse cursor at the greatest key, or the reverse end if the map is empty.
    pub fn rbegin(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.raw, self.raw.last(), Direction::Reverse)
    }

    /// Reverse cursor one before the least key.
    pub fn rend(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.raw, None, Direction::Reverse)
    }

    /// Editing cursor at the least key, or the end if the map is empty.
    pub fn begin_mut(&mut self) -> CursorMut<'_, K, V> {
        let first = self.raw.first();
        CursorMut::new(&mut self.raw, first, Direction::Forward)
    }

    /// Reverse editing cursor at the greatest key, or the reverse end if the map is empty.
    pub fn rbegin_mut(&mut self) -> CursorMut<'_, K, V> {
        let last = self.raw.last();
        CursorMut::new(&mut self.raw, last, Direction::Reverse)
    }

    /// Retains only the entries specified by the predicate.
    ///
    /// In other words, removes all pairs `(k, v)` for which `f(&k, &mut v)` returns `false`. The
    /// entries are visited in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map: FlatMap<i32, i32> = (0..8).map(|x| (x, x * 10)).collect();
    /// // Keep only the entries with even-numbered keys.
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert!(map.into_iter().eq(vec![(0, 0), (2, 20), (4, 40), (6, 60)]));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n log n) in the worst case, with no allocation.
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.raw.retain(f);
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map = FlatMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the key-value pair corresponding to the supplied key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let handle = self.raw.find(&self.comparator, key)?;
        Some(self.raw.entry(handle))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map = FlatMap::new();
    /// map.insert(1, "a");
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map[&1], "b");
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let handle = self.raw.find(&self.comparator, key)?;
        Some(self.raw.entry_mut(handle).1)
    }

    /// Returns a reference to the value corresponding to the key, or an error if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the map does not contain `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::{Error, FlatMap};
    ///
    /// let map = FlatMap::from([(1, "a")]);
    /// assert_eq!(map.at(&1), Ok(&"a"));
    /// assert_eq!(map.at(&2), Err(Error::KeyNotFound));
    /// ```
    pub fn at<Q>(&self, key: &Q) -> Result<&V, Error>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Mutable counterpart of [`at`](FlatMap::at).
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the map does not contain `key`.
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V, Error>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.get_mut(key).ok_or(Error::KeyNotFound)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.raw.find(&self.comparator, key).is_some()
    }

    /// Returns the number of entries with the given key: `0` or `1`.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        usize::from(self.contains_key(key))
    }

    /// Returns a cursor at `key`, or the end cursor if the map does not contain it.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let map = FlatMap::from([(1, "a"), (2, "b")]);
    /// assert_eq!(map.find(&2).value(), Some(&"b"));
    /// assert!(map.find(&3).is_end());
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        Cursor::new(&self.raw, self.raw.find(&self.comparator, key), Direction::Forward)
    }

    /// Returns an editing cursor at `key`, or at the end if the map does not contain it.
    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let found = self.raw.find(&self.comparator, key);
        CursorMut::new(&mut self.raw, found, Direction::Forward)
    }

    /// Returns a cursor at the first key that is not ordered before `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let map = FlatMap::from([(10, "a"), (20, "b"), (30, "c")]);
    /// assert_eq!(map.lower_bound(&20).key(), Some(&20));
    /// assert_eq!(map.lower_bound(&21).key(), Some(&30));
    /// assert!(map.lower_bound(&31).is_end());
    /// ```
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        Cursor::new(&self.raw, self.raw.lower_bound(&self.comparator, key), Direction::Forward)
    }

    /// Editing counterpart of [`lower_bound`](FlatMap::lower_bound).
    pub fn lower_bound_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let bound = self.raw.lower_bound(&self.comparator, key);
        CursorMut::new(&mut self.raw, bound, Direction::Forward)
    }

    /// Returns a cursor at the first key ordered after `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let map = FlatMap::from([(10, "a"), (20, "b"), (30, "c")]);
    /// assert_eq!(map.upper_bound(&20).key(), Some(&30));
    /// assert_eq!(map.upper_bound(&5).key(), Some(&10));
    /// ```
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        Cursor::new(&self.raw, self.raw.upper_bound(&self.comparator, key), Direction::Forward)
    }

    /// Returns `(lower_bound(key), upper_bound(key))`, the half-open cursor range of entries equal
    /// to `key`. The two cursors are equal if the key is absent.
    pub fn equal_range<Q>(&self, key: &Q) -> (Cursor<'_, K, V>, Cursor<'_, K, V>)
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        (self.lower_bound(key), self.upper_bound(key))
    }

    /// Constructs a double-ended iterator over a sub-range of entries in the map.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`, or if `start == end` and both bounds are `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let map = FlatMap::from([(3, "a"), (5, "b"), (8, "c")]);
    /// let inside: Vec<_> = map.range(4..=8).map(|(k, _)| *k).collect();
    /// assert_eq!(inside, [5, 8]);
    /// ```
    pub fn range<Q, R>(&self, range: R) -> Range<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        R: RangeBounds<Q>,
    {
        Range::new(&self.raw, self.raw.range_ends(&self.comparator, &range))
    }

    /// Removes a key from the map, returning the value at the key if the key was previously in
    /// the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map = FlatMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.extract(key).map(|(_, value)| value)
    }

    /// Removes a key from the map and returns the stored key and value, like
    /// `BTreeMap::remove_entry`.
    pub fn extract<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let handle = self.raw.find(&self.comparator, key)?;
        Some(self.raw.remove(handle))
    }

    /// Removes a key from the map and returns the number of entries removed: `0` or `1`.
    pub fn erase<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        usize::from(self.extract(key).is_some())
    }

    /// Removes every entry whose key falls in `range` and returns how many were removed.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`, or if `start == end` and both bounds are `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map: FlatMap<i32, char> = (0..10).zip('a'..).collect();
    /// assert_eq!(map.remove_range(3..7), 4);
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [0, 1, 2, 7, 8, 9]);
    /// assert_eq!(map.remove_range(20..), 0);
    /// ```
    pub fn remove_range<Q, R>(&mut self, range: R) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        R: RangeBounds<Q>,
    {
        match self.raw.range_ends(&self.comparator, &range) {
            Some((start, end)) => self.raw.remove_run(start, end),
            None => 0,
        }
    }
}

impl<K, V, C: Comparator<K>> FlatMap<K, V, C> {
    /// Inserts a key-value pair if the key is absent.
    ///
    /// Returns a cursor at the entry for `key` and `true` if the pair was inserted. If the key was
    /// already present the map is unchanged, `value` is dropped, and the cursor points at the
    /// existing entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map = FlatMap::new();
    /// let (cursor, inserted) = map.insert(37, "a");
    /// assert!(inserted);
    /// assert_eq!(cursor.value(), Some(&"a"));
    ///
    /// let (cursor, inserted) = map.insert(37, "b");
    /// assert!(!inserted);
    /// assert_eq!(cursor.value(), Some(&"a"));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n), amortized over growth.
    pub fn insert(&mut self, key: K, value: V) -> (Cursor<'_, K, V>, bool) {
        self.emplace(key, || value)
    }

    /// Like [`insert`](FlatMap::insert), but builds the value only when the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map = FlatMap::from([(1, String::from("one"))]);
    /// let (_, inserted) = map.emplace(1, || unreachable!());
    /// assert!(!inserted);
    /// let (cursor, inserted) = map.emplace(2, || "two".to_string());
    /// assert!(inserted);
    /// assert_eq!(cursor.value().map(String::as_str), Some("two"));
    /// ```
    pub fn emplace<F>(&mut self, key: K, make_value: F) -> (Cursor<'_, K, V>, bool)
    where
        F: FnOnce() -> V,
    {
        let (handle, inserted) = self.raw.insert_dense(&self.comparator, key, make_value);
        (Cursor::new(&self.raw, Some(handle), Direction::Forward), inserted)
    }

    /// Inserts a key-value pair, replacing the value of an existing entry. Returns the previous
    /// value, like `BTreeMap::insert`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map = FlatMap::new();
    /// assert_eq!(map.insert_or_assign(37, "a"), None);
    /// assert_eq!(map.insert_or_assign(37, "b"), Some("a"));
    /// assert_eq!(map[&37], "b");
    /// ```
    pub fn insert_or_assign(&mut self, key: K, value: V) -> Option<V> {
        match self.raw.find(&self.comparator, &key) {
            Some(handle) => Some(mem::replace(self.raw.entry_mut(handle).1, value)),
            None => {
                self.raw.insert_dense(&self.comparator, key, || value);
                None
            }
        }
    }

    /// Returns the value for `key`, inserting `make_value()` first if the key is absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, make_value: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let (handle, _) = self.raw.insert_dense(&self.comparator, key, make_value);
        self.raw.entry_mut(handle).1
    }

    /// Returns the value for `key`, inserting `V::default()` first if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut counts: FlatMap<&str, i32> = FlatMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.get_or_insert_default(word) += 1;
    /// }
    /// assert_eq!(counts[&"a"], 2);
    /// assert_eq!(counts[&"b"], 1);
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Moves every entry of `other` whose key is absent from `self` into `self`. Entries whose key
    /// is already present stay in `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut a = FlatMap::from([(1, "a"), (2, "b")]);
    /// let mut b = FlatMap::from([(2, "x"), (3, "c")]);
    /// a.merge(&mut b);
    ///
    /// assert_eq!(a.into_iter().collect::<Vec<_>>(), [(1, "a"), (2, "b"), (3, "c")]);
    /// assert_eq!(b.into_iter().collect::<Vec<_>>(), [(2, "x")]);
    /// ```
    pub fn merge(&mut self, other: &mut Self) {
        let mut kept = Vec::new();
        for (key, value) in other.raw.drain_in_order() {
            if self.raw.find(&self.comparator, &key).is_some() {
                kept.push((key, value));
            } else {
                self.raw.insert_dense(&self.comparator, key, || value);
            }
        }
        // Sorted input: every insert hits the cached maximum.
        for (key, value) in kept {
            other.raw.insert_dense(&other.comparator, key, || value);
        }
    }
}

impl<K: Hash, V: Hash, C> Hash for FlatMap<K, V, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (key, value) in self {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for FlatMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for FlatMap<K, V, C> {}

impl<K: PartialOrd, V: PartialOrd, C> PartialOrd for FlatMap<K, V, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord, C> Ord for FlatMap<K, V, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for FlatMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: Default> Default for FlatMap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K, V, C: Comparator<K> + Default> FromIterator<(K, V)> for FlatMap<K, V, C> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

/// Later values replace earlier ones for the same key.
impl<K, V, C: Comparator<K>> Extend<(K, V)> for FlatMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert_or_assign(key, value);
        }
    }
}

impl<'a, K: Copy, V: Copy, C: Comparator<K>> Extend<(&'a K, &'a V)> for FlatMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        for (&key, &value) in iter {
            self.insert_or_assign(key, value);
        }
    }
}

impl<'a, K, V, C> IntoIterator for &'a FlatMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut FlatMap<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<K, V, C> IntoIterator for FlatMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let map = FlatMap::from([(2, "b"), (1, "a")]);
    /// let mut iter = map.into_iter();
    /// assert_eq!(iter.next(), Some((1, "a")));
    /// assert_eq!(iter.next_back(), Some((2, "b")));
    /// ```
    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter::new(self.raw)
    }
}

impl<K, Q, V, C> Index<&Q> for FlatMap<K, V, C>
where
    K: Borrow<Q>,
    Q: ?Sized,
    C: Comparator<Q>,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for FlatMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}
