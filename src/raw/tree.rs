use alloc::vec::Vec;
use core::borrow::Borrow;
use core::mem;

use log::{debug, trace};

use super::balance::{Search, exchange};
use super::handle::Handle;
use super::meta::Meta;
use super::node::{Side, Slot};
use super::overlay::HashOverlay;
use crate::comparator::Comparator;
use crate::config::HashConfig;
use crate::error::Error;

/// Red-black tree over a single contiguous store, addressed by [`Handle`].
///
/// The store comes in two layouts:
///
/// - **dense** (`overlay` is `None`): the live elements are exactly `slots[..len]`. New elements
///   are pushed at `len`; erase moves the last element into the hole.
/// - **hashed**: `slots.len() == capacity`. An element lives in the home bucket of its hash or in a
///   collision slot chained from it, so each slot is linked into a hash chain and the tree at once.
///
/// Handles are positions, not identities. Any mutation may move an element to a different slot.
#[derive(Clone)]
pub(crate) struct RawTree<K, V> {
    pub(super) slots: Vec<Slot<K, V>>,
    capacity: usize,
    len: usize,
    pub(super) root: Option<Handle>,
    pub(super) first: Option<Handle>,
    pub(super) last: Option<Handle>,
    overlay: Option<HashOverlay>,
}

fn check_capacity(capacity: usize) -> Result<(), Error> {
    if capacity > Handle::MAX {
        return Err(Error::InvalidCapacity {
            requested: capacity,
            max: Handle::MAX,
        });
    }
    Ok(())
}

fn vacant_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, Slot::vacant);
    slots
}

impl<K, V> RawTree<K, V> {
    pub(crate) const fn new_dense() -> Self {
        Self {
            slots: Vec::new(),
            capacity: 0,
            len: 0,
            root: None,
            first: None,
            last: None,
            overlay: None,
        }
    }

    pub(crate) fn dense_with_capacity(capacity: usize) -> Result<Self, Error> {
        check_capacity(capacity)?;
        Ok(Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            ..Self::new_dense()
        })
    }

    /// An empty hashed store. `config` must already be validated.
    pub(crate) fn new_hashed(config: HashConfig) -> Self {
        Self {
            overlay: Some(HashOverlay::new(config, 0)),
            ..Self::new_dense()
        }
    }

    pub(crate) fn hashed_with_capacity(config: HashConfig, capacity: usize) -> Result<Self, Error> {
        config.validate()?;
        check_capacity(capacity)?;
        Ok(Self {
            slots: vacant_slots(capacity),
            capacity,
            overlay: Some(HashOverlay::new(config, capacity)),
            ..Self::new_dense()
        })
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) const fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) const fn max_size() -> usize {
        Handle::MAX
    }

    #[inline]
    pub(crate) const fn first(&self) -> Option<Handle> {
        self.first
    }

    #[inline]
    pub(crate) const fn last(&self) -> Option<Handle> {
        self.last
    }

    pub(crate) fn config(&self) -> Option<&HashConfig> {
        self.overlay.as_ref().map(HashOverlay::config)
    }

    #[inline]
    pub(super) fn slot(&self, handle: Handle) -> &Slot<K, V> {
        &self.slots[handle.to_index()]
    }

    #[inline]
    pub(super) fn slot_mut(&mut self, handle: Handle) -> &mut Slot<K, V> {
        &mut self.slots[handle.to_index()]
    }

    #[inline]
    pub(crate) fn entry(&self, handle: Handle) -> (&K, &V) {
        let (key, value) = self.slot(handle).entry().expect("`RawTree::entry()` - `handle` is vacant!");
        (key, value)
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, handle: Handle) -> (&K, &mut V) {
        let (key, value) = self.slot_mut(handle).entry_mut().expect("`RawTree::entry_mut()` - `handle` is vacant!");
        (key, value)
    }

    #[inline]
    pub(crate) fn key(&self, handle: Handle) -> &K {
        self.entry(handle).0
    }

    /// Inserts into a dense store. Returns the slot of `key` and whether it was newly inserted;
    /// `make_value` runs only in the latter case.
    pub(crate) fn insert_dense<C, F>(&mut self, comparator: &C, key: K, make_value: F) -> (Handle, bool)
    where
        C: Comparator<K>,
        F: FnOnce() -> V,
    {
        debug_assert!(self.overlay.is_none(), "`RawTree::insert_dense()` - store is hashed!");
        let (parent, side) = match self.locate(comparator, &key) {
            Search::Found(found) => return (found, false),
            Search::Vacant { parent, side } => (parent, side),
        };
        let value = make_value();
        if self.len == self.capacity {
            self.grow();
        }
        let slot = Handle::from_index(self.len);
        self.slots.push(Slot::occupied((key, value), Meta::occupied(0)));
        self.len += 1;
        self.attach(slot, parent, side);
        (slot, true)
    }

    /// Inserts into a hashed store; `hash` must be the hash of `key`.
    pub(crate) fn insert_hashed<C, F>(&mut self, comparator: &C, hash: u64, key: K, make_value: F) -> (Handle, bool)
    where
        C: Comparator<K>,
        F: FnOnce() -> V,
    {
        if let Some(found) = self.find_hashed(comparator, hash, &key) {
            return (found, false);
        }
        while !self.can_place(hash) {
            self.grow();
        }
        let (parent, side) = match self.locate(comparator, &key) {
            // Only reachable when the comparator and the hasher disagree on equality.
            Search::Found(found) => return (found, false),
            Search::Vacant { parent, side } => (parent, side),
        };
        let value = make_value();
        let slot = self.claim(hash);
        self.slot_mut(slot).fill((key, value), Meta::occupied(hash));
        self.len += 1;
        self.attach(slot, parent, side);
        (slot, true)
    }

    /// Walks the hash chain of `hash`, checking the fingerprint before the comparator.
    pub(crate) fn find_hashed<C, Q>(&self, comparator: &C, hash: u64, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let overlay = self.overlay.as_ref()?;
        if self.capacity == 0 {
            return None;
        }
        let mut cursor = Some(overlay.bucket(hash));
        while let Some(handle) = cursor {
            let slot = self.slot(handle);
            if slot.meta().matches(hash) && comparator.equal(self.key(handle).borrow(), key) {
                return Some(handle);
            }
            cursor = slot.next();
        }
        None
    }

    /// Whether an element with `hash` can be placed without growing.
    fn can_place(&self, hash: u64) -> bool {
        let Some(overlay) = &self.overlay else {
            return self.len < self.capacity;
        };
        if self.capacity == 0 || self.len >= overlay.config().load_limit(self.capacity) {
            return false;
        }
        !self.slot(overlay.bucket(hash)).meta().is_full() || overlay.has_spare_slot(self.capacity)
    }

    /// Picks the slot for a new element: its home bucket if vacant, else a collision slot appended to
    /// the bucket's chain. The caller has checked [`Self::can_place`].
    fn claim(&mut self, hash: u64) -> Handle {
        let overlay = self.overlay.as_mut().expect("`RawTree::claim()` - store is not hashed!");
        let home = overlay.bucket(hash);
        if !self.slots[home.to_index()].meta().is_full() {
            return home;
        }
        let mut tail = home;
        while let Some(next) = self.slots[tail.to_index()].next() {
            tail = next;
        }
        let slots = &self.slots;
        let slot = overlay.claim(|free| slots[free.to_index()].next());
        self.slots[slot.to_index()].set_next(None);
        self.slots[tail.to_index()].set_next(Some(slot));
        slot
    }

    pub(super) fn bucket_of(&self, handle: Handle) -> Handle {
        let overlay = self.overlay.as_ref().expect("`RawTree::bucket_of()` - store is not hashed!");
        overlay.bucket(self.slot(handle).meta().hash())
    }

    /// Removes the element at `handle` and returns it.
    pub(crate) fn remove(&mut self, handle: Handle) -> (K, V) {
        self.remove_tracking(handle, None).0
    }

    /// Removes the element at `handle` and returns it along with the slot that the element at
    /// `tracked` occupies afterwards. `tracked` must be another element or `None`.
    pub(crate) fn remove_tracking(&mut self, handle: Handle, tracked: Option<Handle>) -> ((K, V), Option<Handle>) {
        debug_assert_ne!(Some(handle), tracked, "`RawTree::remove_tracking()` - `handle` tracks itself!");
        if self.overlay.is_some() {
            self.remove_hashed(handle, tracked)
        } else {
            self.remove_dense(handle, tracked)
        }
    }

    /// Removes every element from `start` through `end` in key order and returns how many there
    /// were.
    pub(crate) fn remove_run(&mut self, start: Handle, end: Handle) -> usize {
        let mut count = 1;
        let mut cursor = start;
        while cursor != end {
            cursor = self.successor(cursor).expect("`RawTree::remove_run()` - `end` precedes `start`!");
            count += 1;
        }
        let mut cursor = Some(start);
        for _ in 0..count {
            let handle = cursor.expect("`RawTree::remove_run()` - run ended early!");
            let next = self.successor(handle);
            cursor = self.remove_tracking(handle, next).1;
        }
        count
    }

    /// Removes every element for which `keep` returns `false`, visiting them in key order.
    pub(crate) fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut cursor = self.first;
        while let Some(handle) = cursor {
            let next = self.successor(handle);
            let (key, value) = self.entry_mut(handle);
            cursor = if keep(key, value) { next } else { self.remove_tracking(handle, next).1 };
        }
    }

    fn remove_dense(&mut self, handle: Handle, tracked: Option<Handle>) -> ((K, V), Option<Handle>) {
        self.detach(handle);
        self.len -= 1;
        let last = Handle::from_index(self.len);
        self.relocate(handle, last);
        let entry = self.slots.pop().expect("`RawTree::remove_dense()` - store is empty!").into_entry();
        (entry, exchange(tracked, handle, last))
    }

    fn remove_hashed(&mut self, handle: Handle, mut tracked: Option<Handle>) -> ((K, V), Option<Handle>) {
        let home = self.bucket_of(handle);
        let victim = if handle == home {
            match self.slot(home).next() {
                None => home,
                Some(successor) => {
                    // Keep the bucket reachable by moving its chained element home; the element
                    // being removed takes the collision slot instead.
                    trace!("promoting slot {} into bucket {}", successor.to_index(), home.to_index());
                    self.relocate(home, successor);
                    tracked = exchange(tracked, home, successor);
                    let rest = self.slot(successor).next();
                    self.slot_mut(home).set_next(rest);
                    successor
                }
            }
        } else {
            let mut prev = home;
            while self.slot(prev).next() != Some(handle) {
                prev = self.slot(prev).next().expect("`RawTree::remove_hashed()` - slot is missing from its chain!");
            }
            let rest = self.slot(handle).next();
            self.slot_mut(prev).set_next(rest);
            handle
        };

        self.detach(victim);
        self.len -= 1;
        let entry = self.slot_mut(victim).vacate();
        let overlay = self.overlay.as_mut().expect("`RawTree::remove_hashed()` - store is not hashed!");
        if overlay.is_collision_slot(victim) {
            let free = overlay.release(victim);
            self.slots[victim.to_index()].set_next(free);
        }
        (entry, tracked)
    }

    /// Grows by one step of the growth policy.
    ///
    /// # Panics
    ///
    /// Panics if the store already spans the whole index space.
    fn grow(&mut self) {
        let capacity = self.capacity;
        assert!(capacity < Handle::MAX, "{}", Error::CapacityExhausted { max: Handle::MAX });
        let target = match &self.overlay {
            Some(overlay) => overlay.config().grown(capacity),
            None => capacity.saturating_mul(2).max(1),
        }
        .min(Handle::MAX);
        debug!("growing from {capacity} to {target} slots");
        self.resize(target);
    }

    fn resize(&mut self, capacity: usize) {
        if self.overlay.is_some() {
            self.rehash(capacity);
        } else {
            if capacity > self.slots.capacity() {
                self.slots.reserve_exact(capacity - self.slots.len());
            } else {
                self.slots.shrink_to(capacity);
            }
            self.capacity = capacity;
        }
    }

    /// Rebuilds a hashed store at `capacity` slots. Every previously issued handle is invalidated.
    fn rehash(&mut self, capacity: usize) {
        debug!("rehashing {} elements into {capacity} slots", self.len);
        let order = self.handles_in_order();
        let mut old = mem::replace(&mut self.slots, vacant_slots(capacity));
        self.capacity = capacity;
        self.len = 0;
        self.root = None;
        self.first = None;
        self.last = None;
        if let Some(overlay) = &mut self.overlay {
            overlay.reset(capacity);
        }
        for handle in order {
            let slot = &mut old[handle.to_index()];
            let hash = slot.meta().hash();
            let entry = slot.vacate();
            self.push_greatest(hash, entry);
        }
    }

    /// Appends an element known to order after every element present. Needs no comparator.
    fn push_greatest(&mut self, hash: u64, entry: (K, V)) {
        while !self.can_place(hash) {
            self.grow();
        }
        let slot = self.claim(hash);
        self.slot_mut(slot).fill(entry, Meta::occupied(hash));
        self.len += 1;
        let parent = self.last;
        self.attach(slot, parent, Side::Right);
    }

    /// Makes room for `additional` more elements without further growth.
    pub(crate) fn reserve(&mut self, additional: usize) -> Result<(), Error> {
        let required = self.len.saturating_add(additional);
        let target = match &self.overlay {
            Some(overlay) => overlay.config().fitting(required),
            None => required,
        };
        check_capacity(target)?;
        if target > self.capacity {
            debug!("reserving {target} slots (was {})", self.capacity);
            self.resize(target);
        }
        Ok(())
    }

    /// Drops unused slots. A hashed store may keep more than the minimum when its collision chains
    /// need the room.
    pub(crate) fn shrink_to_fit(&mut self) {
        let target = match &self.overlay {
            Some(overlay) => overlay.config().fitting(self.len),
            None => self.len,
        };
        if target < self.capacity {
            debug!("shrinking from {} to {target} slots", self.capacity);
            self.resize(target);
        }
    }

    /// Removes every element and keeps the capacity.
    pub(crate) fn clear(&mut self) {
        match &mut self.overlay {
            None => self.slots.clear(),
            Some(overlay) => {
                self.slots.iter_mut().for_each(|slot| *slot = Slot::vacant());
                overlay.reset(self.capacity);
            }
        }
        self.len = 0;
        self.root = None;
        self.first = None;
        self.last = None;
    }

    pub(crate) fn handles_in_order(&self) -> Vec<Handle> {
        let mut order = Vec::with_capacity(self.len);
        let mut cursor = self.first;
        while let Some(handle) = cursor {
            order.push(handle);
            cursor = self.successor(handle);
        }
        order
    }

    /// Moves every element out in key order, leaving the store empty.
    pub(crate) fn drain_in_order(&mut self) -> Vec<(K, V)> {
        let entries = self.handles_in_order().into_iter().map(|handle| self.slot_mut(handle).vacate()).collect();
        self.clear();
        entries
    }

    /// Mutable views of every element in key order. Takes O(n log n) time and O(n) space for n
    /// elements, however sparse the store is.
    pub(crate) fn entries_mut_in_order(&mut self) -> Vec<(&K, &mut V)> {
        let mut ranked: Vec<(Handle, usize)> =
            self.handles_in_order().into_iter().enumerate().map(|(rank, handle)| (handle, rank)).collect();
        ranked.sort_unstable_by_key(|&(handle, _)| handle.to_index());

        let mut entries: Vec<Option<(&K, &mut V)>> = Vec::with_capacity(ranked.len());
        entries.resize_with(ranked.len(), || None);
        let mut slots = self.slots.iter_mut();
        let mut skipped = 0;
        for (handle, rank) in ranked {
            // `nth` on a slice iterator is O(1).
            let slot = slots
                .nth(handle.to_index() - skipped)
                .expect("`RawTree::entries_mut_in_order()` - `handle` is out of bounds!");
            skipped = handle.to_index() + 1;
            let (key, value) = slot.entry_mut().expect("`RawTree::entries_mut_in_order()` - `handle` is vacant!");
            entries[rank] = Some((&*key, value));
        }
        entries.into_iter().flatten().collect()
    }

    #[cfg(test)]
    pub(super) const fn overlay(&self) -> Option<&HashOverlay> {
        self.overlay.as_ref()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::comparator::Natural;
    use alloc::collections::BTreeMap;
    use proptest::prelude::*;

    #[derive(Clone, Copy, Debug)]
    enum Layout {
        Dense,
        /// Every key lands in one of eight buckets, so chains are long.
        Clumped,
        Spread,
    }

    impl Layout {
        fn tree(self) -> RawTree<i32, i32> {
            match self {
                Layout::Dense => RawTree::new_dense(),
                Layout::Clumped | Layout::Spread => RawTree::new_hashed(HashConfig::DEFAULT),
            }
        }

        #[allow(clippy::cast_sign_loss)]
        fn hash(self, key: i32) -> u64 {
            match self {
                Layout::Dense => 0,
                Layout::Clumped => (key.rem_euclid(8) as u64) << 2,
                Layout::Spread => ahash::RandomState::with_seeds(1, 2, 3, 4).hash_one(key),
            }
        }

        fn insert(self, tree: &mut RawTree<i32, i32>, key: i32, value: i32) -> (Handle, bool) {
            match self {
                Layout::Dense => tree.insert_dense(&Natural, key, || value),
                Layout::Clumped | Layout::Spread => tree.insert_hashed(&Natural, self.hash(key), key, || value),
            }
        }

        fn find(self, tree: &RawTree<i32, i32>, key: i32) -> Option<Handle> {
            match self {
                Layout::Dense => tree.find(&Natural, &key),
                Layout::Clumped | Layout::Spread => tree.find_hashed(&Natural, self.hash(key), &key),
            }
        }
    }

    fn layout_strategy() -> impl Strategy<Value = Layout> {
        prop_oneof![Just(Layout::Dense), Just(Layout::Clumped), Just(Layout::Spread)]
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
        RemoveWithNext(i32),
        RemoveRun(i32, i32),
        Retain(i32),
        PopFirst,
        PopLast,
        Reserve(usize),
        ShrinkToFit,
        Clear,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            8 => (-300i32..300).prop_map(Op::Insert),
            5 => (-300i32..300).prop_map(Op::Remove),
            3 => (-300i32..300).prop_map(Op::RemoveWithNext),
            1 => (-300i32..300, -300i32..300).prop_map(|(a, b)| Op::RemoveRun(a, b)),
            1 => (2i32..9).prop_map(Op::Retain),
            1 => Just(Op::PopFirst),
            1 => Just(Op::PopLast),
            1 => (0usize..64).prop_map(Op::Reserve),
            1 => Just(Op::ShrinkToFit),
            1 => Just(Op::Clear),
        ]
    }

    fn keys(tree: &RawTree<i32, i32>) -> Vec<i32> {
        tree.handles_in_order().into_iter().map(|handle| *tree.key(handle)).collect()
    }

    #[test]
    fn insert_reports_existing_slot() {
        for layout in [Layout::Dense, Layout::Clumped, Layout::Spread] {
            let mut tree = layout.tree();
            let (slot, inserted) = layout.insert(&mut tree, 7, 70);
            assert!(inserted);
            let (again, inserted) = layout.insert(&mut tree, 7, 71);
            assert!(!inserted);
            assert_eq!(slot, again);
            assert_eq!(tree.entry(slot), (&7, &70));
            assert_eq!(tree.len(), 1);
        }
    }

    #[test]
    fn sorted_after_mixed_inserts() {
        for layout in [Layout::Dense, Layout::Clumped, Layout::Spread] {
            let mut tree = layout.tree();
            for key in [5, 3, 8, 1, 4, 7, 9] {
                layout.insert(&mut tree, key, key);
            }
            tree.validate(&Natural);
            assert_eq!(keys(&tree), [1, 3, 4, 5, 7, 8, 9]);

            let five = layout.find(&tree, 5).expect("5 is present");
            assert_eq!(tree.remove(five), (5, 5));
            tree.validate(&Natural);
            assert_eq!(keys(&tree), [1, 3, 4, 7, 8, 9]);
            assert!(layout.find(&tree, 3).is_some());
            assert!(layout.find(&tree, 100).is_none());
        }
    }

    #[test]
    fn dense_store_stays_packed() {
        let mut tree = RawTree::dense_with_capacity(4).expect("capacity fits");
        for key in 0..16 {
            tree.insert_dense(&Natural, key, || key);
        }
        assert_eq!(tree.capacity(), 16);
        for key in (0..16).step_by(3) {
            let slot = tree.find(&Natural, &key).expect("key is present");
            tree.remove(slot);
            tree.validate(&Natural);
        }
        assert_eq!(tree.len(), 10);
        assert_eq!(tree.slots.len(), 10);
    }

    #[test]
    fn chained_home_removal_promotes_successor() {
        let layout = Layout::Clumped;
        let mut tree = layout.tree();
        // All multiples of 8 share one bucket.
        for key in [0, 8, 16, 24] {
            layout.insert(&mut tree, key, key);
        }
        tree.validate(&Natural);
        let home = layout.find(&tree, 0).expect("0 is present");
        assert_eq!(tree.remove(home), (0, 0));
        tree.validate(&Natural);
        for key in [8, 16, 24] {
            assert!(layout.find(&tree, key).is_some());
        }
    }

    #[test]
    fn dense_removal_follows_relocated_successor() {
        let mut tree = RawTree::new_dense();
        for key in 0..8 {
            tree.insert_dense(&Natural, key, || key * 10);
        }
        let six = tree.find(&Natural, &6).expect("6 is present");
        let seven = tree.successor(six);
        // The successor sits in the last slot, which compaction moves into the hole.
        assert_eq!(seven, Some(Handle::from_index(7)));
        let (entry, next) = tree.remove_tracking(six, seven);
        assert_eq!(entry, (6, 60));
        assert_eq!(next, Some(six));
        assert_eq!(tree.entry(six), (&7, &70));
        tree.validate(&Natural);
    }

    #[test]
    fn promoted_successor_is_tracked_into_its_bucket() {
        let layout = Layout::Clumped;
        let mut tree = layout.tree();
        for key in [0, 8, 16] {
            layout.insert(&mut tree, key, key);
        }
        let zero = layout.find(&tree, 0).expect("0 is present");
        let eight = tree.successor(zero);
        assert_eq!(tree.slot(zero).next(), eight, "8 is chained right behind its home slot");
        let (entry, next) = tree.remove_tracking(zero, eight);
        assert_eq!(entry, (0, 0));
        assert_eq!(next, Some(zero));
        assert_eq!(tree.key(zero), &8);
        tree.validate(&Natural);
    }

    #[test]
    fn mutable_walk_of_sparse_store_is_ordered() {
        let layout = Layout::Spread;
        let mut tree = layout.tree();
        for key in 0..200 {
            layout.insert(&mut tree, key, key);
        }
        tree.retain(|key, _| key % 25 == 0);
        assert!(tree.capacity() >= 200);
        for (key, value) in tree.entries_mut_in_order() {
            *value = -*key;
        }
        let entries: Vec<(i32, i32)> =
            tree.handles_in_order().into_iter().map(|slot| (*tree.entry(slot).0, *tree.entry(slot).1)).collect();
        assert_eq!(entries, (0..200).step_by(25).map(|key| (key, -key)).collect::<Vec<_>>());
        tree.validate(&Natural);
    }

    #[test]
    fn oversized_capacity_is_rejected() {
        let err = RawTree::<i32, i32>::dense_with_capacity(Handle::MAX + 1).err();
        assert_eq!(err, Some(Error::InvalidCapacity { requested: Handle::MAX + 1, max: Handle::MAX }));
        let err = RawTree::<i32, i32>::hashed_with_capacity(HashConfig::DEFAULT, Handle::MAX + 1).err();
        assert!(matches!(err, Some(Error::InvalidCapacity { .. })));
    }

    #[test]
    #[should_panic(expected = "index space exhausted")]
    fn growth_past_index_space_panics() {
        let mut tree = RawTree::new_dense();
        let max = i32::try_from(Handle::MAX).expect("test handles are 16 bits");
        for key in 0..=max {
            tree.insert_dense(&Natural, key, || ());
        }
    }

    #[test]
    fn drain_yields_sorted_entries() {
        let layout = Layout::Spread;
        let mut tree = layout.tree();
        for key in [4, -2, 9, 0] {
            layout.insert(&mut tree, key, key * 10);
        }
        assert_eq!(tree.drain_in_order(), [(-2, -20), (0, 0), (4, 40), (9, 90)]);
        assert!(tree.is_empty());
        tree.validate(&Natural);
    }

    proptest! {
        #[test]
        fn ops_match_btreemap(layout in layout_strategy(), ops in prop::collection::vec(op_strategy(), 1..400)) {
            let mut tree = layout.tree();
            let mut expected: BTreeMap<i32, i32> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        let (slot, inserted) = layout.insert(&mut tree, key, key.wrapping_mul(3));
                        prop_assert_eq!(inserted, !expected.contains_key(&key));
                        expected.entry(key).or_insert(key.wrapping_mul(3));
                        prop_assert_eq!(tree.key(slot), &key);
                    }
                    Op::Remove(key) => {
                        let removed = layout.find(&tree, key).map(|slot| tree.remove(slot));
                        prop_assert_eq!(removed, expected.remove_entry(&key));
                    }
                    Op::RemoveWithNext(key) => match layout.find(&tree, key) {
                        Some(slot) => {
                            let next = tree.successor(slot);
                            let (entry, next) = tree.remove_tracking(slot, next);
                            prop_assert_eq!(Some(entry), expected.remove_entry(&key));
                            let expected_next = expected.range(key..).next().map(|(next_key, _)| *next_key);
                            prop_assert_eq!(next.map(|slot| *tree.key(slot)), expected_next);
                        }
                        None => prop_assert!(!expected.contains_key(&key)),
                    },
                    Op::RemoveRun(a, b) => {
                        let run = a.min(b)..=a.max(b);
                        let removed = tree.range_ends(&Natural, &run).map_or(0, |(start, end)| tree.remove_run(start, end));
                        let before = expected.len();
                        expected.retain(|key, _| !run.contains(key));
                        prop_assert_eq!(removed, before - expected.len());
                    }
                    Op::Retain(modulus) => {
                        let keep = |key: &i32, value: &mut i32| {
                            *value = value.wrapping_add(1);
                            key.rem_euclid(modulus) != 0
                        };
                        tree.retain(keep);
                        expected.retain(keep);
                    }
                    Op::PopFirst => {
                        let removed = tree.first().map(|slot| tree.remove(slot));
                        prop_assert_eq!(removed, expected.pop_first());
                    }
                    Op::PopLast => {
                        let removed = tree.last().map(|slot| tree.remove(slot));
                        prop_assert_eq!(removed, expected.pop_last());
                    }
                    Op::Reserve(additional) => {
                        prop_assert!(tree.reserve(additional).is_ok());
                        prop_assert!(tree.capacity() >= tree.len() + additional);
                    }
                    Op::ShrinkToFit => tree.shrink_to_fit(),
                    Op::Clear => {
                        tree.clear();
                        expected.clear();
                    }
                }
                tree.validate(&Natural);
                prop_assert_eq!(tree.len(), expected.len());
            }

            let entries: Vec<(i32, i32)> =
                tree.handles_in_order().into_iter().map(|slot| (*tree.entry(slot).0, *tree.entry(slot).1)).collect();
            let reference: Vec<(i32, i32)> = expected.into_iter().collect();
            prop_assert_eq!(entries, reference);
        }

        #[test]
        fn bounds_match_btreemap(keys in prop::collection::btree_set(-100i32..100, 0..60), needle in -110i32..110) {
            let mut tree = RawTree::new_dense();
            for &key in &keys {
                tree.insert_dense(&Natural, key, || ());
            }
            let lower = tree.lower_bound(&Natural, &needle).map(|slot| *tree.key(slot));
            let upper = tree.upper_bound(&Natural, &needle).map(|slot| *tree.key(slot));
            prop_assert_eq!(lower, keys.range(needle..).next().copied());
            prop_assert_eq!(upper, keys.range(needle + 1..).next().copied());
        }
    }
}
