//! Positions inside a collection.
//!
//! A cursor is a (collection, slot, direction) triple. It borrows its collection, so no mutating
//! call can happen while a cursor is alive: the borrow checker enforces the invalidation contract
//! that a raw index would leave to the caller. Slot indices themselves are not stable across
//! mutations; any insert may rehash or rebalance, and any erase may move elements between slots.

use core::fmt;
use core::ptr;

use crate::raw::{Handle, RawTree};

/// Order in which a cursor walks its collection.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Direction {
    /// Ascending key order.
    Forward,
    /// Descending key order.
    Reverse,
}

/// A position in a map: either an entry or the end.
///
/// Created by [`find`](crate::FlatMap::find), [`lower_bound`](crate::FlatMap::lower_bound),
/// [`insert`](crate::FlatMap::insert) and friends. Two cursors are equal when they point into the
/// same map, at the same slot, in the same direction.
///
/// # Examples
///
/// ```
/// use flatrb::FlatMap;
///
/// let map = FlatMap::from([(1, "a"), (2, "b"), (3, "c")]);
///
/// let mut cursor = map.find(&2);
/// assert_eq!(cursor.key_value(), Some((&2, &"b")));
/// cursor.move_next();
/// assert_eq!(cursor.key(), Some(&3));
/// cursor.move_next();
/// assert!(cursor.is_end());
/// assert_eq!(cursor, map.end());
/// ```
pub struct Cursor<'a, K, V> {
    tree: &'a RawTree<K, V>,
    position: Option<Handle>,
    direction: Direction,
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(crate) const fn new(tree: &'a RawTree<K, V>, position: Option<Handle>, direction: Direction) -> Self {
        Self {
            tree,
            position,
            direction,
        }
    }

    /// Returns the key at this position, or `None` at the end.
    #[must_use]
    pub fn key(&self) -> Option<&'a K> {
        self.key_value().map(|(key, _)| key)
    }

    /// Returns the value at this position, or `None` at the end.
    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        self.key_value().map(|(_, value)| value)
    }

    /// Returns the entry at this position, or `None` at the end.
    #[must_use]
    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        self.position.map(|handle| tree.entry(handle))
    }

    /// Returns the slot index this cursor points at, or `None` at the end.
    ///
    /// The index identifies a storage slot, not an element; it is only meaningful until the
    /// collection is next mutated.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.position.map(Handle::to_index)
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.position.is_none()
    }

    /// Steps one entry in the cursor's direction. Stepping off the last entry reaches the end;
    /// stepping from the end stays there.
    pub fn move_next(&mut self) {
        self.position = step_next(self.tree, self.position, self.direction);
    }

    /// Steps one entry against the cursor's direction. From the end this reaches the final entry
    /// of the walk, so `end().move_prev()` lands on the greatest key and `rend().move_prev()` on the
    /// least.
    pub fn move_prev(&mut self) {
        self.position = step_prev(self.tree, self.position, self.direction);
    }
}

fn step_next<K, V>(tree: &RawTree<K, V>, position: Option<Handle>, direction: Direction) -> Option<Handle> {
    let handle = position?;
    match direction {
        Direction::Forward => tree.successor(handle),
        Direction::Reverse => tree.predecessor(handle),
    }
}

fn step_prev<K, V>(tree: &RawTree<K, V>, position: Option<Handle>, direction: Direction) -> Option<Handle> {
    match (position, direction) {
        (Some(handle), Direction::Forward) => tree.predecessor(handle),
        (Some(handle), Direction::Reverse) => tree.successor(handle),
        (None, Direction::Forward) => tree.last(),
        (None, Direction::Reverse) => tree.first(),
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.position == other.position && self.direction == other.direction
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index())
            .field("direction", &self.direction)
            .field("entry", &self.key_value())
            .finish()
    }
}

/// A position in a map that can edit the map: values change in place, and removing the current
/// entry moves the cursor to the entry that followed it.
///
/// Created by `begin_mut`, `rbegin_mut`, `find_mut` and `lower_bound_mut` on
/// [`FlatMap`](crate::FlatMap) and [`HashFlatMap`](crate::HashFlatMap). It holds the map's
/// exclusive borrow, so no other cursor can observe a removal.
///
/// # Examples
///
/// ```
/// use flatrb::FlatMap;
///
/// let mut map = FlatMap::from([(1, "a"), (2, "b"), (3, "c"), (4, "d")]);
///
/// let mut cursor = map.find_mut(&2);
/// assert_eq!(cursor.remove_current(), Some((2, "b")));
/// assert_eq!(cursor.key(), Some(&3));
/// *cursor.value_mut().unwrap() = "C";
/// cursor.move_next();
/// assert_eq!(cursor.remove_current(), Some((4, "d")));
/// assert!(cursor.is_end());
///
/// assert!(map.into_iter().eq([(1, "a"), (3, "C")]));
/// ```
pub struct CursorMut<'a, K, V> {
    tree: &'a mut RawTree<K, V>,
    position: Option<Handle>,
    direction: Direction,
}

impl<'a, K, V> CursorMut<'a, K, V> {
    pub(crate) const fn new(tree: &'a mut RawTree<K, V>, position: Option<Handle>, direction: Direction) -> Self {
        Self {
            tree,
            position,
            direction,
        }
    }

    #[must_use]
    pub fn key(&self) -> Option<&K> {
        self.key_value().map(|(key, _)| key)
    }

    #[must_use]
    pub fn value(&self) -> Option<&V> {
        self.key_value().map(|(_, value)| value)
    }

    /// Returns the value at this position for editing, or `None` at the end.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.key_value_mut().map(|(_, value)| value)
    }

    #[must_use]
    pub fn key_value(&self) -> Option<(&K, &V)> {
        self.position.map(|handle| self.tree.entry(handle))
    }

    pub fn key_value_mut(&mut self) -> Option<(&K, &mut V)> {
        let handle = self.position?;
        Some(self.tree.entry_mut(handle))
    }

    /// See [`Cursor::index`].
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.position.map(Handle::to_index)
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.position.is_none()
    }

    /// See [`Cursor::move_next`].
    pub fn move_next(&mut self) {
        self.position = step_next(self.tree, self.position, self.direction);
    }

    /// See [`Cursor::move_prev`].
    pub fn move_prev(&mut self) {
        self.position = step_prev(self.tree, self.position, self.direction);
    }

    /// Borrows a read-only cursor at the same position.
    #[must_use]
    pub fn as_cursor(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.tree, self.position, self.direction)
    }

    /// Removes the entry at this position and returns it. The cursor moves to the entry that came
    /// next in its direction, or to the end. Does nothing at the end.
    ///
    /// Removing may move other entries between slots; the cursor follows its next entry.
    pub fn remove_current(&mut self) -> Option<(K, V)> {
        let handle = self.position?;
        let next = step_next(self.tree, self.position, self.direction);
        let (entry, next) = self.tree.remove_tracking(handle, next);
        self.position = next;
        Some(entry)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for CursorMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("index", &self.index())
            .field("direction", &self.direction)
            .field("entry", &self.key_value())
            .finish()
    }
}

/// A position in a set: either an element or the end.
///
/// The key-only counterpart of [`Cursor`].
///
/// # Examples
///
/// ```
/// use flatrb::{Direction, FlatSet};
///
/// let set = FlatSet::from([1, 2, 3]);
///
/// let mut cursor = set.rbegin();
/// assert_eq!(cursor.direction(), Direction::Reverse);
/// assert_eq!(cursor.get(), Some(&3));
/// cursor.move_next();
/// assert_eq!(cursor.get(), Some(&2));
/// ```
pub struct SetCursor<'a, T> {
    inner: Cursor<'a, T, ()>,
}

impl<'a, T> SetCursor<'a, T> {
    pub(crate) const fn new(inner: Cursor<'a, T, ()>) -> Self {
        Self { inner }
    }

    /// Returns the element at this position, or `None` at the end.
    #[must_use]
    pub fn get(&self) -> Option<&'a T> {
        self.inner.key()
    }

    /// See [`Cursor::index`].
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.inner.index()
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.inner.direction()
    }

    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.inner.is_end()
    }

    /// See [`Cursor::move_next`].
    pub fn move_next(&mut self) {
        self.inner.move_next();
    }

    /// See [`Cursor::move_prev`].
    pub fn move_prev(&mut self) {
        self.inner.move_prev();
    }
}

impl<T> Clone for SetCursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SetCursor<'_, T> {}

impl<T> PartialEq for SetCursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Eq for SetCursor<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for SetCursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetCursor")
            .field("index", &self.index())
            .field("direction", &self.direction())
            .field("element", &self.get())
            .finish()
    }
}

/// The key-only counterpart of [`CursorMut`]: it can remove the current element and move on.
///
/// # Examples
///
/// ```
/// use flatrb::FlatSet;
///
/// let mut set = FlatSet::from([1, 2, 3, 4, 5]);
/// let mut cursor = set.rbegin_mut();
/// while let Some(&value) = cursor.get() {
///     if value % 2 == 0 {
///         cursor.remove_current();
///     } else {
///         cursor.move_next();
///     }
/// }
/// assert!(set.iter().eq(&[1, 3, 5]));
/// ```
pub struct SetCursorMut<'a, T> {
    inner: CursorMut<'a, T, ()>,
}

impl<'a, T> SetCursorMut<'a, T> {
    pub(crate) const fn new(inner: CursorMut<'a, T, ()>) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.inner.key()
    }

    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.inner.index()
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.inner.direction()
    }

    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.inner.is_end()
    }

    pub fn move_next(&mut self) {
        self.inner.move_next();
    }

    pub fn move_prev(&mut self) {
        self.inner.move_prev();
    }

    #[must_use]
    pub fn as_cursor(&self) -> SetCursor<'_, T> {
        SetCursor::new(self.inner.as_cursor())
    }

    /// See [`CursorMut::remove_current`].
    pub fn remove_current(&mut self) -> Option<T> {
        self.inner.remove_current().map(|(value, ())| value)
    }
}

impl<T: fmt::Debug> fmt::Debug for SetCursorMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetCursorMut")
            .field("index", &self.index())
            .field("direction", &self.direction())
            .field("element", &self.get())
            .finish()
    }
}
