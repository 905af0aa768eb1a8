use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::RangeBounds;

use crate::comparator::{Comparator, Natural};
use crate::error::Error;
use crate::flat_map::FlatMap;

pub use crate::cursor::{SetCursor as Cursor, SetCursorMut as CursorMut};
pub use crate::set_iter::{IntoIter, Iter, Range};

/// An ordered set stored as a red-black tree inside one contiguous array.
///
/// A `FlatSet` is a [`FlatMap`] with `()` values and shares its layout: a packed array, O(1)
/// access to the least and greatest elements, and growth by doubling.
///
/// It is a logic error for an item to be modified in such a way that the item's ordering relative
/// to any other item changes while it is in the set.
///
/// # Examples
///
/// ```
/// use flatrb::FlatSet;
///
/// let mut books = FlatSet::new();
///
/// books.insert("A Dance With Dragons");
/// books.insert("To Kill a Mockingbird");
/// books.insert("The Odyssey");
/// books.insert("The Great Gatsby");
///
/// if !books.contains("The Winds of Winter") {
///     println!("We have {} books, but The Winds of Winter ain't one.", books.len());
/// }
///
/// books.remove("The Odyssey");
///
/// for book in &books {
///     println!("{book}");
/// }
/// ```
#[derive(Clone)]
pub struct FlatSet<T, C = Natural> {
    map: FlatMap<T, (), C>,
}

impl<T> FlatSet<T> {
    /// Makes a new, empty `FlatSet`. Does not allocate anything on its own.
    #[must_use]
    pub const fn new() -> Self {
        Self { map: FlatMap::new() }
    }

    /// Creates an empty set with room for at least `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`max_size`](FlatSet::max_size).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: FlatMap::with_capacity(capacity),
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` exceeds [`max_size`](FlatSet::max_size).
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        Ok(Self {
            map: FlatMap::try_with_capacity(capacity)?,
        })
    }
}

impl<T, C> FlatSet<T, C> {
    /// Makes a new, empty set ordered by `comparator`.
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            map: FlatMap::with_comparator(comparator),
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` exceeds [`max_size`](FlatSet::max_size).
    pub fn try_with_capacity_and_comparator(capacity: usize, comparator: C) -> Result<Self, Error> {
        Ok(Self {
            map: FlatMap::try_with_capacity_and_comparator(capacity, comparator)?,
        })
    }

    #[must_use]
    pub const fn comparator(&self) -> &C {
        self.map.comparator()
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
        FlatMap::<T, (), C>::max_size()
    }

    /// Reserves room for at least `additional` more elements.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds [`max_size`](FlatSet::max_size).
    pub fn reserve(&mut self, additional: usize) {
        self.map.reserve(additional);
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if the new capacity exceeds
    /// [`max_size`](FlatSet::max_size).
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.map.try_reserve(additional)
    }

    pub fn shrink_to_fit(&mut self) {
        self.map.shrink_to_fit();
    }

    /// Clears the set, removing all elements. The capacity is kept.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn swap(&mut self, other: &mut Self) {
        self.map.swap(&mut other.map);
    }

    /// Returns the least element.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatSet;
    ///
    /// let set = FlatSet::from([3, 1, 2]);
    /// assert_eq!(set.first(), Some(&1));
    /// assert_eq!(set.last(), Some(&3));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.map.first_key_value().map(|(value, ())| value)
    }

    /// Returns the greatest element.
    ///
    /// # Complexity
    ///
    /// O(1)
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

    /// Gets an iterator that visits the elements in ascending order.
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

    /// Returns `true` if the set contains an element equal to `value`.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.map.contains_key(value)
    }

    /// Returns a reference to the stored element equal to `value`.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.map.get_key_value(value).map(|(value, ())| value)
    }

    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.map.count(value)
    }

    pub fn find<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        Cursor::new(self.map.find(value))
    }

    /// Returns an editing cursor at `value`, or at the end if the set does not contain it.
    pub fn find_mut<Q>(&mut self, value: &Q) -> CursorMut<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        CursorMut::new(self.map.find_mut(value))
    }

    /// Returns a cursor at the first element not ordered before `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatSet;
    ///
    /// let set = FlatSet::from([10, 20, 30]);
    /// assert_eq!(set.lower_bound(&15).get(), Some(&20));
    /// assert_eq!(set.upper_bound(&20).get(), Some(&30));
    /// ```
    pub fn lower_bound<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        Cursor::new(self.map.lower_bound(value))
    }

    /// Editing counterpart of [`lower_bound`](FlatSet::lower_bound).
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
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatSet;
    /// use std::ops::Bound::Included;
    ///
    /// let set = FlatSet::from([3, 5, 8]);
    /// assert_eq!(set.range((Included(4), Included(8))).collect::<Vec<_>>(), [&5, &8]);
    /// ```
    pub fn range<Q, R>(&self, range: R) -> Range<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        R: RangeBounds<Q>,
    {
        Range::new(self.map.range(range))
    }

    /// Removes `value` from the set and returns the number of elements removed: `0` or `1`.
    pub fn erase<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.map.erase(value)
    }

    /// Removes `value` from the set. Returns whether it was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.map.erase(value) == 1
    }

    /// Removes and returns the stored element equal to `value`, like `BTreeSet::take`.
    pub fn extract<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.map.extract(value).map(|(value, ())| value)
    }
}

impl<T, C: Comparator<T>> FlatSet<T, C> {
    /// Adds a value to the set.
    ///
    /// Returns a cursor at the element equal to `value` and whether `value` was newly inserted. An
    /// existing element is never replaced.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatSet;
    ///
    /// let mut set = FlatSet::new();
    /// assert!(set.insert(2).1);
    /// let (cursor, inserted) = set.insert(2);
    /// assert!(!inserted);
    /// assert_eq!(cursor.get(), Some(&2));
    /// ```
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

impl<T: Hash, C> Hash for FlatSet<T, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for value in self {
            value.hash(state);
        }
    }
}

impl<T: PartialEq, C> PartialEq for FlatSet<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T: Eq, C> Eq for FlatSet<T, C> {}

impl<T: PartialOrd, C> PartialOrd for FlatSet<T, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.map.partial_cmp(&other.map)
    }
}

impl<T: Ord, C> Ord for FlatSet<T, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.map.cmp(&other.map)
    }
}

impl<T, C: Default> Default for FlatSet<T, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T: fmt::Debug, C> fmt::Debug for FlatSet<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C: Comparator<T> + Default> FromIterator<T> for FlatSet<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T, C: Comparator<T>> Extend<T> for FlatSet<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: Copy + 'a, C: Comparator<T>> Extend<&'a T> for FlatSet<T, C> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a, T, C> IntoIterator for &'a FlatSet<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T, C> IntoIterator for FlatSet<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter::new(self.map.into_keys())
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for FlatSet<T> {
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::collections::BTreeSet;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    #[test]
    fn cursors_walk_both_ways() {
        let set = FlatSet::from([1, 2, 3]);
        let mut forward = set.begin();
        let mut reverse = set.rbegin();
        let mut seen = Vec::new();
        while !forward.is_end() {
            seen.extend(forward.get().copied());
            forward.move_next();
        }
        while !reverse.is_end() {
            seen.extend(reverse.get().copied());
            reverse.move_next();
        }
        assert_eq!(seen, [1, 2, 3, 3, 2, 1]);
        assert_eq!(forward, set.end());
        assert_eq!(reverse, set.rend());
    }

    proptest! {
        #[test]
        fn matches_btreeset(values in prop::collection::vec(-50i32..50, 0..120), needle in -60i32..60) {
            let set: FlatSet<i32> = values.iter().copied().collect();
            let expected: BTreeSet<i32> = values.iter().copied().collect();
            prop_assert!(set.iter().eq(expected.iter()));
            prop_assert_eq!(set.lower_bound(&needle).get(), expected.range(needle..).next());
            prop_assert_eq!(set.contains(&needle), expected.contains(&needle));
            prop_assert_eq!(set.range(..needle).rev().next(), expected.range(..needle).next_back());
        }
    }
}
