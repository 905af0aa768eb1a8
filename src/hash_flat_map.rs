use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use core::ops::{Index, RangeBounds};

use ahash::RandomState;
use log::debug;

use crate::comparator::{Comparator, Natural};
use crate::config::HashConfig;
use crate::cursor::Direction;
use crate::error::Error;
use crate::raw::RawTree;

mod capacity;

pub use crate::cursor::{Cursor, CursorMut};
pub use crate::iter::{IntoIter, IntoKeys, IntoValues, Iter, IterMut, Keys, Range, Values, ValuesMut};

/// An ordered map with O(1) average lookups.
///
/// A `HashFlatMap` is a [`FlatMap`](crate::FlatMap) whose array doubles as an open hash table:
/// each entry sits in the home bucket chosen by its hash, or in a slot of the collision region
/// chained from that bucket. Point lookups ([`get`](HashFlatMap::get),
/// [`contains_key`](HashFlatMap::contains_key), [`remove`](HashFlatMap::remove) and friends) walk
/// the short hash chain; ordered operations ([`iter`](HashFlatMap::iter),
/// [`range`](HashFlatMap::range), [`lower_bound`](HashFlatMap::lower_bound)) walk the red-black tree
/// threaded through the same slots.
///
/// The table grows by rehashing into a larger array when the [load
/// factor](HashConfig::load_factor) would be exceeded, or when a key's bucket is taken and no
/// collision slot is left. Rehashing moves every entry, which is why cursors borrow the map.
///
/// Keys need both [`Hash`] and an ordering through the [`Comparator`] `C`. Keys that compare equal
/// must hash equally.
///
/// # Examples
///
/// ```
/// use flatrb::HashFlatMap;
///
/// let mut stock = HashFlatMap::new();
/// stock.insert("pears", 4);
/// stock.insert("apples", 12);
/// stock.insert("figs", 0);
///
/// assert_eq!(stock.get("apples"), Some(&12));
/// assert_eq!(stock.keys().copied().collect::<Vec<_>>(), ["apples", "figs", "pears"]);
///
/// assert_eq!(stock.erase("figs"), 1);
/// assert!(!stock.contains_key("figs"));
/// assert_eq!(stock.first_key_value(), Some((&"apples", &12)));
/// ```
#[derive(Clone)]
pub struct HashFlatMap<K, V, S = RandomState, C = Natural> {
    raw: RawTree<K, V>,
    hash_builder: S,
    comparator: C,
}

impl<K, V> HashFlatMap<K, V> {
    /// Makes a new, empty `HashFlatMap` with the default hasher and [`HashConfig::DEFAULT`]. Does
    /// not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let mut map = HashFlatMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.capacity(), 1);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }
}

impl<K, V, C> HashFlatMap<K, V, RandomState, C> {
    /// Makes a new, empty map ordered by `comparator` and hashed with the default hasher.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::{HashFlatMap, Reverse};
    ///
    /// let mut map = HashFlatMap::with_comparator(Reverse);
    /// map.insert(1, 'a');
    /// map.insert(2, 'b');
    /// assert_eq!(map.first_key_value(), Some((&2, &'b')));
    /// ```
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        Self::with_hasher_and_comparator(RandomState::new(), comparator)
    }
}

impl<K, V, S> HashFlatMap<K, V, S> {
    /// Makes a new, empty map that hashes keys with `hash_builder`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let hasher = ahash::RandomState::with_seeds(1, 2, 3, 4);
    /// let mut map = HashFlatMap::with_hasher(hasher);
    /// map.insert(1, 2);
    /// ```
    #[must_use]
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_hasher_and_comparator(hash_builder, Natural)
    }
}

impl<K, V, S, C> HashFlatMap<K, V, S, C> {
    /// Makes a new, empty map with the given hasher and comparator.
    #[must_use]
    pub fn with_hasher_and_comparator(hash_builder: S, comparator: C) -> Self {
        Self {
            raw: RawTree::new_hashed(HashConfig::DEFAULT),
            hash_builder,
            comparator,
        }
    }

    /// Returns the map's hasher.
    #[must_use]
    pub const fn hasher(&self) -> &S {
        &self.hash_builder
    }

    #[must_use]
    pub const fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns the sizing policy the map was built with.
    #[must_use]
    pub fn config(&self) -> &HashConfig {
        self.raw.config().expect("`HashFlatMap::config()` - store is not hashed!")
    }

    /// Returns the fraction of slots holding an entry, `0.0` for a map without slots.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let mut map = HashFlatMap::with_capacity(4);
    /// assert_eq!(map.load_factor(), 0.0);
    /// map.insert('a', ());
    /// assert_eq!(map.load_factor(), 0.25);
    /// ```
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        if self.raw.capacity() == 0 {
            return 0.0;
        }
        self.raw.len() as f64 / self.raw.capacity() as f64
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the map, removing all elements. The capacity is kept.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Swaps the contents, hashers and comparators included, of two maps in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Returns the entry with the least key.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first().map(|handle| self.raw.entry(handle))
    }

    /// Returns the entry with the greatest key.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last().map(|handle| self.raw.entry(handle))
    }

    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let handle = self.raw.first()?;
        Some(self.raw.remove(handle))
    }

    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let handle = self.raw.last()?;
        Some(self.raw.remove(handle))
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw)
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.raw)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.iter_mut())
    }

    pub fn into_keys(self) -> IntoKeys<K, V> {
        IntoKeys::new(self.into_iter())
    }

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

    /// Reverse cursor at the greatest key.
    pub fn rbegin(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.raw, self.raw.last(), Direction::Reverse)
    }

    /// Reverse cursor one before the least key.
    pub fn rend(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.raw, None, Direction::Reverse)
    }

    /// Editing cursor at the least key.
    pub fn begin_mut(&mut self) -> CursorMut<'_, K, V> {
        let first = self.raw.first();
        CursorMut::new(&mut self.raw, first, Direction::Forward)
    }

    /// Reverse editing cursor at the greatest key.
    pub fn rbegin_mut(&mut self) -> CursorMut<'_, K, V> {
        let last = self.raw.last();
        CursorMut::new(&mut self.raw, last, Direction::Reverse)
    }

    /// Editing counterpart of [`lower_bound`](HashFlatMap::lower_bound).
    pub fn lower_bound_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let bound = self.raw.lower_bound(&self.comparator, key);
        CursorMut::new(&mut self.raw, bound, Direction::Forward)
    }

    /// Retains only the entries specified by the predicate, visiting them in ascending key order.
    /// Removal needs no hashing: each slot remembers its hash.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let mut map: HashFlatMap<i32, i32> = (0..8).map(|x| (x, x * 10)).collect();
    /// map.retain(|&k, v| {
    ///     *v += 1;
    ///     k % 3 == 0
    /// });
    /// assert!(map.into_iter().eq([(0, 1), (3, 31), (6, 61)]));
    /// ```
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.raw.retain(f);
    }

    /// Removes every entry whose key falls in `range` and returns how many were removed. The range
    /// is found through the tree.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`, or if `start == end` and both bounds are `Excluded`.
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

    /// Returns a cursor at the first key that is not ordered before `key`.
    ///
    /// # Complexity
    ///
    /// O(log n); bounds use the tree, not the hash table.
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        Cursor::new(&self.raw, self.raw.lower_bound(&self.comparator, key), Direction::Forward)
    }

    /// Returns a cursor at the first key ordered after `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        Cursor::new(&self.raw, self.raw.upper_bound(&self.comparator, key), Direction::Forward)
    }

    /// Returns `(lower_bound(key), upper_bound(key))`.
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
    /// use flatrb::HashFlatMap;
    ///
    /// let map: HashFlatMap<i32, char> = (0..10).zip('a'..).collect();
    /// assert_eq!(map.range(7..).map(|(_, v)| *v).collect::<String>(), "hij");
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
}

impl<K, V, S: BuildHasher, C> HashFlatMap<K, V, S, C> {
    fn lookup<Q>(&self, key: &Q) -> Option<crate::raw::Handle>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        self.raw.find_hashed(&self.comparator, self.hash_builder.hash_one(key), key)
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let mut map = HashFlatMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1) average.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        let handle = self.lookup(key)?;
        Some(self.raw.entry(handle))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        let handle = self.lookup(key)?;
        Some(self.raw.entry_mut(handle).1)
    }

    /// Returns a reference to the value corresponding to the key, or an error if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the map does not contain `key`.
    pub fn at<Q>(&self, key: &Q) -> Result<&V, Error>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the map does not contain `key`.
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V, Error>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        self.get_mut(key).ok_or(Error::KeyNotFound)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        self.lookup(key).is_some()
    }

    /// Returns the number of entries with the given key: `0` or `1`.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        usize::from(self.contains_key(key))
    }

    /// Returns a cursor at `key`, or the end cursor if the map does not contain it.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let map = HashFlatMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
    /// let mut cursor = map.find(&2);
    /// cursor.move_next();
    /// assert_eq!(cursor.value(), Some(&'c'));
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        Cursor::new(&self.raw, self.lookup(key), Direction::Forward)
    }

    /// Returns an editing cursor at `key`, found by hash, or at the end if the map does not contain
    /// it.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let mut map = HashFlatMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
    /// let mut cursor = map.find_mut(&2);
    /// assert_eq!(cursor.remove_current(), Some((2, 'b')));
    /// assert_eq!(cursor.key_value(), Some((&3, &'c')));
    /// ```
    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        let found = self.lookup(key);
        CursorMut::new(&mut self.raw, found, Direction::Forward)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        self.extract(key).map(|(_, value)| value)
    }

    /// Removes a key from the map and returns the stored key and value.
    pub fn extract<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        let handle = self.lookup(key)?;
        Some(self.raw.remove(handle))
    }

    /// Removes a key from the map and returns the number of entries removed: `0` or `1`.
    pub fn erase<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        usize::from(self.extract(key).is_some())
    }
}

impl<K: Hash, V, S: BuildHasher, C: Comparator<K>> HashFlatMap<K, V, S, C> {
    /// Inserts a key-value pair if the key is absent.
    ///
    /// Returns a cursor at the entry for `key` and `true` if the pair was inserted. An existing
    /// entry is left untouched and `value` is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let mut map = HashFlatMap::new();
    /// assert!(map.insert(37, "a").1);
    /// assert!(!map.insert(37, "b").1);
    /// assert_eq!(map[&37], "a");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) for the tree link, amortized over rehashing.
    pub fn insert(&mut self, key: K, value: V) -> (Cursor<'_, K, V>, bool) {
        self.emplace(key, || value)
    }

    /// Like [`insert`](HashFlatMap::insert), but builds the value only when the key is absent.
    pub fn emplace<F>(&mut self, key: K, make_value: F) -> (Cursor<'_, K, V>, bool)
    where
        F: FnOnce() -> V,
    {
        let hash = self.hash_builder.hash_one(&key);
        let (handle, inserted) = self.raw.insert_hashed(&self.comparator, hash, key, make_value);
        (Cursor::new(&self.raw, Some(handle), Direction::Forward), inserted)
    }

    /// Inserts a key-value pair, replacing the value of an existing entry. Returns the previous
    /// value.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_builder.hash_one(&key);
        match self.raw.find_hashed(&self.comparator, hash, &key) {
            Some(handle) => Some(mem::replace(self.raw.entry_mut(handle).1, value)),
            None => {
                self.raw.insert_hashed(&self.comparator, hash, key, || value);
                None
            }
        }
    }

    /// Returns the value for `key`, inserting `make_value()` first if the key is absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, make_value: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let hash = self.hash_builder.hash_one(&key);
        let (handle, _) = self.raw.insert_hashed(&self.comparator, hash, key, make_value);
        self.raw.entry_mut(handle).1
    }

    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Moves every entry of `other` whose key is absent from `self` into `self`. Entries whose key
    /// is already present stay in `other`.
    pub fn merge(&mut self, other: &mut Self) {
        let mut kept = Vec::new();
        for (key, value) in other.raw.drain_in_order() {
            let hash = self.hash_builder.hash_one(&key);
            if self.raw.find_hashed(&self.comparator, hash, &key).is_some() {
                kept.push((key, value));
            } else {
                self.raw.insert_hashed(&self.comparator, hash, key, || value);
            }
        }
        for (key, value) in kept {
            let hash = other.hash_builder.hash_one(&key);
            other.raw.insert_hashed(&other.comparator, hash, key, || value);
        }
    }
}

impl<K: PartialEq, V: PartialEq, S, C> PartialEq for HashFlatMap<K, V, S, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, S, C> Eq for HashFlatMap<K, V, S, C> {}

impl<K: fmt::Debug, V: fmt::Debug, S, C> fmt::Debug for HashFlatMap<K, V, S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S: Default, C: Default> Default for HashFlatMap<K, V, S, C> {
    fn default() -> Self {
        Self::with_hasher_and_comparator(S::default(), C::default())
    }
}

impl<K, V, S, C> FromIterator<(K, V)> for HashFlatMap<K, V, S, C>
where
    K: Hash,
    S: BuildHasher + Default,
    C: Comparator<K> + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

/// Later values replace earlier ones for the same key.
impl<K: Hash, V, S: BuildHasher, C: Comparator<K>> Extend<(K, V)> for HashFlatMap<K, V, S, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        // A hint past the index space is left for growth to report.
        if let Err(err) = self.raw.reserve(lower) {
            debug!("ignoring size hint of {lower}: {err}");
        }
        for (key, value) in iter {
            self.insert_or_assign(key, value);
        }
    }
}

impl<'a, K, V, S, C> Extend<(&'a K, &'a V)> for HashFlatMap<K, V, S, C>
where
    K: Hash + Copy,
    V: Copy,
    S: BuildHasher,
    C: Comparator<K>,
{
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        self.extend(iter.into_iter().map(|(&key, &value)| (key, value)));
    }
}

impl<'a, K, V, S, C> IntoIterator for &'a HashFlatMap<K, V, S, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, S, C> IntoIterator for &'a mut HashFlatMap<K, V, S, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<K, V, S, C> IntoIterator for HashFlatMap<K, V, S, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter::new(self.raw)
    }
}

impl<K, Q, V, S, C> Index<&Q> for HashFlatMap<K, V, S, C>
where
    K: Borrow<Q>,
    Q: Hash + ?Sized,
    S: BuildHasher,
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

impl<K: Ord + Hash, V, const N: usize> From<[(K, V); N]> for HashFlatMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}
