use ahash::RandomState;

use super::HashFlatMap;
use crate::comparator::Natural;
use crate::config::HashConfig;
use crate::error::Error;
use crate::raw::RawTree;

impl<K, V> HashFlatMap<K, V> {
    /// Creates an empty map with `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`max_size`](HashFlatMap::max_size).
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let map: HashFlatMap<i32, i32> = HashFlatMap::with_capacity(32);
    /// assert_eq!(map.capacity(), 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity)
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }

    /// Fallible counterpart of [`with_capacity`](HashFlatMap::with_capacity).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` exceeds
    /// [`max_size`](HashFlatMap::max_size).
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::with_config(capacity, HashConfig::DEFAULT, RandomState::new(), Natural)
    }
}

impl<K, V, S> HashFlatMap<K, V, S> {
    /// Creates an empty map with `capacity` slots that hashes keys with `hash_builder`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`max_size`](HashFlatMap::max_size).
    #[must_use]
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        match Self::with_config(capacity, HashConfig::DEFAULT, hash_builder, Natural) {
            Ok(map) => map,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<K, V, S, C> HashFlatMap<K, V, S, C> {
    /// Creates an empty map with every knob exposed: initial slot count, sizing policy, hasher and
    /// comparator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` fails [`HashConfig::validate`], and
    /// [`Error::InvalidCapacity`] if `capacity` exceeds [`max_size`](HashFlatMap::max_size).
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::{HashConfig, HashFlatMap, Reverse};
    ///
    /// let config = HashConfig::new().with_hashable_ratio(0.5);
    /// let mut map = HashFlatMap::with_config(8, config, ahash::RandomState::new(), Reverse)?;
    /// map.insert(1, 'a');
    /// map.insert(2, 'b');
    /// assert_eq!(map.first_key_value(), Some((&2, &'b')));
    /// # Ok::<(), flatrb::Error>(())
    /// ```
    pub fn with_config(capacity: usize, config: HashConfig, hash_builder: S, comparator: C) -> Result<Self, Error> {
        Ok(Self {
            raw: RawTree::hashed_with_capacity(config, capacity)?,
            hash_builder,
            comparator,
        })
    }

    /// Returns the number of slots in the table.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the largest number of slots any map can have.
    #[must_use]
    pub const fn max_size() -> usize {
        RawTree::<K, V>::max_size()
    }

    /// Rehashes, if needed, so that `additional` more entries fit under the load factor.
    ///
    /// Room under the load factor does not rule out growth: a new key whose bucket is taken still
    /// needs a free collision slot.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds [`max_size`](HashFlatMap::max_size).
    pub fn reserve(&mut self, additional: usize) {
        if let Err(err) = self.try_reserve(additional) {
            panic!("{err}");
        }
    }

    /// Fallible counterpart of [`reserve`](HashFlatMap::reserve). The map is unchanged on error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if the new capacity exceeds
    /// [`max_size`](HashFlatMap::max_size).
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.raw.reserve(additional)
    }

    /// Rehashes into the smallest table whose load limit admits the current entries.
    ///
    /// The new table may come out larger than that minimum when the collision region would
    /// otherwise run dry.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatrb::HashFlatMap;
    ///
    /// let mut map = HashFlatMap::with_capacity(100);
    /// map.extend([(1, 'a'), (2, 'b')]);
    /// map.shrink_to_fit();
    /// assert!(map.capacity() < 100);
    /// assert_eq!(map[&2], 'b');
    /// ```
    pub fn shrink_to_fit(&mut self) {
        self.raw.shrink_to_fit();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn growth_follows_growth_factor() {
        let mut map = HashFlatMap::new();
        let mut seen = Vec::new();
        for key in 0..100 {
            map.insert(key, ());
            if seen.last() != Some(&map.capacity()) {
                seen.push(map.capacity());
            }
        }
        // Each step at least doubles; a full bucket may add extra steps.
        for pair in seen.windows(2) {
            assert!(pair[1] >= pair[0] * 2, "capacity went from {} to {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn reserve_admits_additional_entries() {
        let mut map = HashFlatMap::from([(1, 1)]);
        map.reserve(50);
        let limit = map.config().load_limit(map.capacity());
        assert!(limit >= 51);
    }

    #[test]
    fn oversized_requests_fail_cleanly() {
        let too_big = HashFlatMap::<u8, u8>::max_size() + 1;
        assert!(matches!(
            HashFlatMap::<u8, u8>::try_with_capacity(too_big),
            Err(Error::InvalidCapacity { .. })
        ));
        let mut map = HashFlatMap::from([(1u8, 1u8)]);
        let capacity = map.capacity();
        assert!(map.try_reserve(too_big).is_err());
        assert_eq!(map.capacity(), capacity);
        assert_eq!(map.get(&1), Some(&1));
    }
}
