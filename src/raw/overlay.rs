use super::handle::Handle;
use crate::config::HashConfig;

/// Bookkeeping of the hash overlay that sits on top of a hashed store.
///
/// Slots `[0, hashable)` are home buckets. Slots `[hashable, capacity)` form the collision region:
/// `[hashable, collision_head)` have been handed out to chains at some point, and the ones since
/// vacated are threaded through `free` via their `next` links.
#[derive(Clone, Debug)]
pub(crate) struct HashOverlay {
    config: HashConfig,
    hashable: usize,
    mask: u64,
    collision_head: usize,
    free: Option<Handle>,
}

impl HashOverlay {
    pub(crate) fn new(config: HashConfig, capacity: usize) -> Self {
        let mut overlay = Self {
            config,
            hashable: 0,
            mask: 0,
            collision_head: 0,
            free: None,
        };
        overlay.reset(capacity);
        overlay
    }

    /// Re-derives the region split for an empty table of `capacity` slots.
    pub(crate) fn reset(&mut self, capacity: usize) {
        self.hashable = self.config.hashable(capacity);
        self.mask = (self.hashable.next_power_of_two() - 1) as u64;
        self.collision_head = self.hashable;
        self.free = None;
    }

    #[inline]
    pub(crate) const fn config(&self) -> &HashConfig {
        &self.config
    }

    #[inline]
    pub(crate) const fn hashable(&self) -> usize {
        self.hashable
    }

    #[inline]
    pub(crate) const fn collision_head(&self) -> usize {
        self.collision_head
    }

    #[inline]
    pub(crate) const fn free(&self) -> Option<Handle> {
        self.free
    }

    /// Home bucket of `hash`. Uses the bits above the two flag bits so that the bucket can be
    /// recomputed from a stored [`Meta`](super::meta::Meta).
    #[inline]
    pub(crate) fn bucket(&self, hash: u64) -> Handle {
        debug_assert!(self.hashable > 0, "`HashOverlay::bucket()` - table has no buckets!");
        #[allow(clippy::cast_possible_truncation)]
        let index = ((hash >> 2) & self.mask) as usize;
        // `mask < 2 * hashable`, so one subtraction folds the index into range.
        Handle::from_index(if index >= self.hashable { index - self.hashable } else { index })
    }

    #[inline]
    pub(crate) const fn is_collision_slot(&self, handle: Handle) -> bool {
        handle.to_index() >= self.hashable
    }

    /// Whether a chain can still be extended without growing.
    #[inline]
    pub(crate) const fn has_spare_slot(&self, capacity: usize) -> bool {
        self.free.is_some() || self.collision_head < capacity
    }

    /// Takes a slot from the free list if one was recycled, else extends the collision region.
    /// `next_free` is the free-list link stored in the recycled slot.
    pub(crate) fn claim(&mut self, next_free: impl FnOnce(Handle) -> Option<Handle>) -> Handle {
        if let Some(slot) = self.free {
            self.free = next_free(slot);
            return slot;
        }
        let slot = Handle::from_index(self.collision_head);
        self.collision_head += 1;
        slot
    }

    /// Pushes a vacated collision slot onto the free list and returns the previous list head, which
    /// the caller stores in the slot's `next`.
    pub(crate) fn release(&mut self, slot: Handle) -> Option<Handle> {
        debug_assert!(self.is_collision_slot(slot), "`HashOverlay::release()` - `slot` is a home bucket!");
        self.free.replace(slot)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn regions_follow_the_ratio() {
        let overlay = HashOverlay::new(HashConfig::new(), 20);
        assert_eq!(overlay.hashable(), 18);
        assert_eq!(overlay.collision_head(), 18);
        assert!(overlay.is_collision_slot(Handle::from_index(18)));
        assert!(!overlay.is_collision_slot(Handle::from_index(17)));
    }

    #[test]
    fn recycled_slots_are_claimed_first() {
        let mut overlay = HashOverlay::new(HashConfig::new(), 20);
        let a = overlay.claim(|_| None);
        let b = overlay.claim(|_| None);
        assert_eq!((a.to_index(), b.to_index()), (18, 19));
        assert!(!overlay.has_spare_slot(20));

        assert_eq!(overlay.release(a), None);
        assert!(overlay.has_spare_slot(20));
        assert_eq!(overlay.claim(|_| None), a);
        assert!(!overlay.has_spare_slot(20));
    }

    proptest! {
        #[test]
        fn buckets_stay_in_the_hashable_region(capacity in 1usize..10_000, hash in any::<u64>()) {
            let overlay = HashOverlay::new(HashConfig::new(), capacity);
            prop_assert!(overlay.bucket(hash).to_index() < overlay.hashable());
        }

        #[test]
        fn bucket_ignores_flag_bits(capacity in 1usize..10_000, hash in any::<u64>(), flags in 0u64..4) {
            let overlay = HashOverlay::new(HashConfig::new(), capacity);
            prop_assert_eq!(overlay.bucket(hash), overlay.bucket((hash & !0b11) | flags));
        }
    }
}
