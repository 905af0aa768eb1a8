use super::FlatMap;
use crate::comparator::Natural;
use crate::error::Error;
use crate::raw::RawTree;

impl<K, V> FlatMap<K, V> {
    /// Creates an empty map with room for at least `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`max_size`](FlatMap::max_size). Use
    /// [`try_with_capacity`](FlatMap::try_with_capacity) to handle this case.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let map: FlatMap<i32, i32> = FlatMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(map) => map,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible counterpart of [`with_capacity`](FlatMap::with_capacity).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` exceeds [`max_size`](FlatMap::max_size).
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::try_with_capacity_and_comparator(capacity, Natural)
    }
}

impl<K, V, C> FlatMap<K, V, C> {
    /// Creates an empty map ordered by `comparator` with room for at least `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` exceeds [`max_size`](FlatMap::max_size).
    pub fn try_with_capacity_and_comparator(capacity: usize, comparator: C) -> Result<Self, Error> {
        Ok(Self {
            raw: RawTree::dense_with_capacity(capacity)?,
            comparator,
        })
    }

    /// Returns the number of entries the map can hold before it next grows.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the largest number of entries any map can hold.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// assert!(FlatMap::<u8, u8>::max_size() >= 1 << 16);
    /// ```
    #[must_use]
    pub const fn max_size() -> usize {
        RawTree::<K, V>::max_size()
    }

    /// Reserves room for at least `additional` more entries.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds [`max_size`](FlatMap::max_size).
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map = FlatMap::from([(1, 'a')]);
    /// map.reserve(10);
    /// assert!(map.capacity() >= 11);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        if let Err(err) = self.try_reserve(additional) {
            panic!("{err}");
        }
    }

    /// Fallible counterpart of [`reserve`](FlatMap::reserve). The map is unchanged on error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if the new capacity exceeds
    /// [`max_size`](FlatMap::max_size).
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.raw.reserve(additional)
    }

    /// Shrinks the capacity to the number of entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::FlatMap;
    ///
    /// let mut map = FlatMap::with_capacity(100);
    /// map.insert(1, 'a');
    /// map.shrink_to_fit();
    /// assert_eq!(map.capacity(), 1);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        self.raw.shrink_to_fit();
    }
}
