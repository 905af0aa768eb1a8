use crate::error::Error;

/// Sizing policy of a [`HashFlatMap`](crate::HashFlatMap) or [`HashFlatSet`](crate::HashFlatSet).
///
/// - `load_factor`: largest fraction of slots that may be live before the table grows, in `(0, 1]`.
/// - `hashable_ratio`: fraction of slots that act as home buckets, in `(0, 1)`; the rest form the
///   collision region that chains draw from, so it has to be left some room.
/// - `growth_factor`: multiplier applied to the capacity on every rehash, greater than `1`.
///
/// # Examples
///
/// ```
/// use flatrb::{HashConfig, HashFlatMap};
///
/// let config = HashConfig::new().with_load_factor(0.75).with_growth_factor(1.5);
/// let mut map: HashFlatMap<u32, &str> = HashFlatMap::with_config(16, config, Default::default(), Default::default())?;
/// map.insert(1, "one");
/// assert_eq!(map.config().load_factor(), 0.75);
/// # Ok::<(), flatrb::Error>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HashConfig {
    load_factor: f64,
    hashable_ratio: f64,
    growth_factor: f64,
}

impl HashConfig {
    /// `load_factor = 1.0`, `hashable_ratio = 0.9`, `growth_factor = 2.0`.
    pub const DEFAULT: Self = Self {
        load_factor: 1.0,
        hashable_ratio: 0.9,
        growth_factor: 2.0,
    };

    #[must_use]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    #[must_use]
    pub const fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    #[must_use]
    pub const fn with_hashable_ratio(mut self, hashable_ratio: f64) -> Self {
        self.hashable_ratio = hashable_ratio;
        self
    }

    #[must_use]
    pub const fn with_growth_factor(mut self, growth_factor: f64) -> Self {
        self.growth_factor = growth_factor;
        self
    }

    #[must_use]
    pub const fn load_factor(&self) -> f64 {
        self.load_factor
    }

    #[must_use]
    pub const fn hashable_ratio(&self) -> f64 {
        self.hashable_ratio
    }

    #[must_use]
    pub const fn growth_factor(&self) -> f64 {
        self.growth_factor
    }

    /// Checks every parameter against its range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first parameter that is out of range. `NaN` is
    /// always out of range.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.load_factor > 0.0 && self.load_factor <= 1.0) {
            return Err(Error::InvalidConfig("load_factor must be in (0, 1]"));
        }
        if !(self.hashable_ratio > 0.0 && self.hashable_ratio < 1.0) {
            return Err(Error::InvalidConfig("hashable_ratio must be in (0, 1)"));
        }
        if !(self.growth_factor > 1.0 && self.growth_factor.is_finite()) {
            return Err(Error::InvalidConfig("growth_factor must be finite and greater than 1"));
        }
        Ok(())
    }

    /// Number of live elements `capacity` slots may hold.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn load_limit(&self, capacity: usize) -> usize {
        ((capacity as f64) * self.load_factor) as usize
    }

    /// Number of home buckets in a table of `capacity` slots; at least one unless the table is empty.
    /// Any table of two or more slots keeps at least one collision slot.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn hashable(&self, capacity: usize) -> usize {
        if capacity == 0 {
            return 0;
        }
        (((capacity as f64) * self.hashable_ratio) as usize).clamp(1, (capacity - 1).max(1))
    }

    /// Capacity after one growth step from `capacity`, before clamping to the index space.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn grown(&self, capacity: usize) -> usize {
        (((capacity as f64) * self.growth_factor) as usize).max(capacity + 1)
    }

    /// Smallest capacity whose load limit admits `len` elements.
    pub(crate) fn fitting(&self, len: usize) -> usize {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let mut capacity = ((len as f64) / self.load_factor) as usize;
        while capacity < usize::MAX && self.load_limit(capacity) < len {
            capacity += 1;
        }
        capacity
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(HashConfig::default().validate(), Ok(()));
    }

    #[test]
    fn out_of_range_parameters_are_rejected() {
        let base = HashConfig::new();
        assert!(base.with_load_factor(0.0).validate().is_err());
        assert!(base.with_load_factor(1.5).validate().is_err());
        assert!(base.with_load_factor(f64::NAN).validate().is_err());
        assert!(base.with_hashable_ratio(0.0).validate().is_err());
        assert!(base.with_hashable_ratio(1.0).validate().is_err());
        assert!(base.with_growth_factor(1.0).validate().is_err());
        assert!(base.with_growth_factor(f64::INFINITY).validate().is_err());
    }

    #[test]
    fn hashable_region_keeps_one_bucket() {
        let config = HashConfig::new();
        assert_eq!(config.hashable(0), 0);
        assert_eq!(config.hashable(1), 1);
        assert_eq!(config.hashable(2), 1);
        assert_eq!(config.hashable(100), 90);
    }

    #[test]
    fn near_one_ratio_still_leaves_a_collision_slot() {
        let config = HashConfig::new().with_hashable_ratio(1.0 - f64::EPSILON);
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.hashable(2), 1);
        assert_eq!(config.hashable(1 << 31), (1 << 31) - 1);
    }

    proptest! {
        #[test]
        fn growth_always_makes_progress(capacity in 0usize..1_000_000, factor in 1.001f64..4.0) {
            let config = HashConfig::new().with_growth_factor(factor);
            prop_assert!(config.grown(capacity) > capacity);
        }

        #[test]
        fn fitting_capacity_is_minimal(len in 0usize..100_000, load in 0.05f64..=1.0) {
            let config = HashConfig::new().with_load_factor(load);
            let capacity = config.fitting(len);
            prop_assert!(config.load_limit(capacity) >= len);
            prop_assert!(capacity == 0 || config.load_limit(capacity - 1) < len);
        }

        #[test]
        fn fitting_saturates_instead_of_overflowing(load in 0.05f64..=1.0) {
            let config = HashConfig::new().with_load_factor(load);
            prop_assert_eq!(config.fitting(usize::MAX), usize::MAX);
        }
    }
}
