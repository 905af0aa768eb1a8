use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::RangeBounds;

use ahash::RandomState;

use crate::comparator::{Comparator, Natural};
use crate::config::HashConfig;
use crate::error::Error;
use crate::hash_flat_map::HashFlatMap;

pub use crate::cursor::{SetCursor as Cursor, SetCursorMut as CursorMut};
pub use crate::set_iter::{IntoIter, Iter, Range};

/// An ordered set with O(1) average membership tests.
///
/// A `HashFlatSet` is a [`HashFlatMap`] with `()` values: hash chains answer
/// [`contains`](HashFlatSet::contains), the red-black tree threaded through the same array answers
/// ordered queries.
///
/// # Examples
///
/// ```
/// use flatrb::HashFlatSet;
///
/// let mut seen = HashFlatSet::new();
/// for word in "the quick brown fox jumps over the lazy dog".split(' ') {
///     seen.insert(word);
/// }
/// assert_eq!(seen.len(), 8);
/// assert!(seen.contains("fox"));
/// assert_eq!(seen.first(), Some(&"brown"));
/// assert_eq!(seen.lower_bound(&"l").get(), Some(&"lazy"));
/// ```
#[derive(Clone)]
pub struct HashFlatSet<T, S = RandomState, C = Natural> {
    map: HashFlatMap<T, (), S, C>,
}

impl<T> HashFlatSet<T> {
    /// Makes a new, empty set with the default hasher. Does not allocate anything on its own.
    #[must_use]
    pub fn new() -> Self {
        Self { map: HashFlatMap::new() }
    }

    /// Creates an empty set with `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`max_size`](HashFlatSet::max_size).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashFlatMap::with_capacity(capacity),
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` exceeds
    /// [`max_size`](HashFlatSet::max_size).
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        Ok(Self {
            map: HashFlatMap::try_with_capacity(capacity)?,
        })
    }
}

impl<T, C> HashFlatSet<T, RandomState, C> {
    /// Makes a new, empty set ordered by `comparator`.
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            map: HashFlatMap::with_comparator(comparator),
        }
    }
}

impl<T, S> HashFlatSet<T, S> {
    #[must_use]
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            map: HashFlatMap::with_hasher(hash_builder),
        }
    }

    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`max_size`](HashFlatSet::max_size).
    #[must_use]
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            map: HashFlatMap::with_capacity_and_hasher(capacity, hash_builder),
        }
    }
}

impl<T, S, C> HashFlatSet<T, S, C> {
    #[must_use]
    pub fn with_hasher_and_comparator(hash_builder: S, comparator: C) -> Self {
        Self {
            map: HashFlatMap::with_hasher_and_comparator(hash_builder, comparator),
        }
    }

    /// See [`HashFlatMap::with_config`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an out-of-range `config` and
    /// [`Error::InvalidCapacity`] if `capacity` exceeds [`max_size`](HashFlatSet::max_size).
    pub fn with_config(capacity: usize, config: HashConfig, hash_builder: S, comparator: C) -> Result<Self, Error> {
        Ok(Self {
            map: HashFlatMap::with_config(capacity, config, hash_builder, comparator)?,
        })
    }

    #[must_use]
    pub const fn hasher(&self) -> &S {
        self.map.hasher()
    }

    #[must_use]
    pub const fn comparator(&self) -> &C {
        self.map.comparator()
    }

    #[must_use]
    pub fn config(&self) -> &HashConfig {
        self.map.config()
    }

    #[must_use]
    pub fn load_factor(&self) -> f64 {
        self.map.load_factor()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.map.capacity()
    }

    #[must_use]
    pub const fn max_size() -> usize {
        HashFlatMap::<T, (), S, C>::max_size()
    }

    /// # Panics
    ///
    /// Panics if the new capacity exceeds [`max_size`](HashFlatSet::max_size).
    pub fn reserve(&mut self, additional: usize) {
        self.map.reserve(additional);
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if the new capacity exceeds
    /// [`max_size`](HashFlatSet::max_size).
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.map.try_reserve(additional)
    }

    pub fn shrink_to_fit(&mut self) {
        self.map.shrink_to_fit();
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn swap(&mut self, other: &mut Self) {
        self.map.swap(&mut other.map);
    }

    /// Returns the least element in O(1).
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.map.first_key_value().map(|(value, ())| value)
    }

    /// Returns the greatest element in O(1).
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.map.last_key_value().map(|(value, ())| value)
    }

    pub fn pop_first(&mut self) -> Option<T> {
        self.map.pop_first().map(|(value, ())| value)
    }

    pub fn pop_last(&mut self) -> Option<T> {
        self.map.pop_last().map(|(value, ())| value)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.map.keys())
    }

    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self.map.begin())
    }

    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(self.map.end())
    }

    pub fn rbegin(&self) -> Cursor<'_, T> {
        Cursor::new(self.map.rbegin())
    }

    pub fn rend(&self) -> Cursor<'_, T> {
        Cursor::new(self.map.rend())
    }

    /// Editing cursor at the least element.
    pub fn begin_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::new(self.map.begin_mut())
    }

    /// Reverse editing cursor at the greatest element.
    pub fn rbegin_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::new(self.map.rbegin_mut())
    }

    /// Retains only the elements specified by the predicate, visiting them in ascending order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.map.retain(|value, _| f(value));
    }

    pub fn lower_bound<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        Cursor::new(self.map.lower_bound(value))
    }

    /// Editing counterpart of [`lower_bound`](HashFlatSet::lower_bound).
    pub fn lower_bound_mut<Q>(&mut self, value: &Q) -> CursorMut<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        CursorMut::new(self.map.lower_bound_mut(value))
    }

    /// Removes every element in `range` and returns how many were removed.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`, or if `start == end` and both bounds are `Excluded`.
    pub fn remove_range<Q, R>(&mut self, range: R) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        R: RangeBounds<Q>,
    {
        self.map.remove_range(range)
    }

    pub fn upper_bound<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        Cursor::new(self.map.upper_bound(value))
    }

    pub fn equal_range<Q>(&self, value: &Q) -> (Cursor<'_, T>, Cursor<'_, T>)
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        (self.lower_bound(value), self.upper_bound(value))
    }

    /// Constructs a double-ended iterator over a sub-range of elements in the set.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`, or if `start == end` and both bounds are `Excluded`.
    pub fn range<Q, R>(&self, range: R) -> Range<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        R: RangeBounds<Q>,
    {
        Range::new(self.map.range(range))
    }
}

impl<T, S: BuildHasher, C> HashFlatSet<T, S, C> {
    /// Returns `true` if the set contains an element equal to `value`.
    ///
    /// # Complexity
    ///
    /// O(1) average.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        self.map.contains_key(value)
    }

    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        self.map.get_key_value(value).map(|(value, ())| value)
    }

    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        self.map.count(value)
    }

    pub fn find<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        Cursor::new(self.map.find(value))
    }

    /// Returns an editing cursor at `value`, or at the end if the set does not contain it.
    pub fn find_mut<Q>(&mut self, value: &Q) -> CursorMut<'_, T>
    where
        T: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        CursorMut::new(self.map.find_mut(value))
    }

    pub fn erase<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        self.map.erase(value)
    }

    /// Removes `value` from the set. Returns whether it was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        self.map.erase(value) == 1
    }

    /// Removes and returns the stored element equal to `value`.
    pub fn extract<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Hash + ?Sized,
        C: Comparator<Q>,
    {
        self.map.extract(value).map(|(value, ())| value)
    }
}

impl<T: Hash, S: BuildHasher, C: Comparator<T>> HashFlatSet<T, S, C> {
    /// Adds a value to the set. Returns a cursor at the element equal to `value` and whether
    /// `value` was newly inserted.
    pub fn insert(&mut self, value: T) -> (Cursor<'_, T>, bool) {
        let (cursor, inserted) = self.map.insert(value, ());
        (Cursor::new(cursor), inserted)
    }

    /// Moves every element of `other` absent from `self` into `self`. Elements already present stay
    /// in `other`.
    pub fn merge(&mut self, other: &mut Self) {
        self.map.merge(&mut other.map);
    }
}

impl<T: PartialEq, S, C> PartialEq for HashFlatSet<T, S, C> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T: Eq, S, C> Eq for HashFlatSet<T, S, C> {}

impl<T: fmt::Debug, S, C> fmt::Debug for HashFlatSet<T, S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S: Default, C: Default> Default for HashFlatSet<T, S, C> {
    fn default() -> Self {
        Self::with_hasher_and_comparator(S::default(), C::default())
    }
}

impl<T, S, C> FromIterator<T> for HashFlatSet<T, S, C>
where
    T: Hash,
    S: BuildHasher + Default,
    C: Comparator<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T: Hash, S: BuildHasher, C: Comparator<T>> Extend<T> for HashFlatSet<T, S, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, S, C> Extend<&'a T> for HashFlatSet<T, S, C>
where
    T: Hash + Copy + 'a,
    S: BuildHasher,
    C: Comparator<T>,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a, T, S, C> IntoIterator for &'a HashFlatSet<T, S, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T, S, C> IntoIterator for HashFlatSet<T, S, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter::new(self.map.into_keys())
    }
}

impl<T: Ord + Hash, const N: usize> From<[T; N]> for HashFlatSet<T> {
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}
