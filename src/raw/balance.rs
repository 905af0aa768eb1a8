use core::borrow::Borrow;
use core::cmp::Ordering;
use core::ops::{Bound, RangeBounds};

use super::handle::Handle;
use super::node::{Color, Links, Side};
use super::tree::RawTree;
use crate::comparator::Comparator;

/// Where a key sits in the tree, or where it would be attached.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Search {
    Found(Handle),
    Vacant { parent: Option<Handle>, side: Side },
}

/// Swaps `a` and `b` in a single handle.
#[inline]
pub(super) fn exchange(handle: Option<Handle>, a: Handle, b: Handle) -> Option<Handle> {
    match handle {
        Some(h) if h == a => Some(b),
        Some(h) if h == b => Some(a),
        other => other,
    }
}

// Link accessors.
impl<K, V> RawTree<K, V> {
    #[inline]
    pub(super) fn links(&self, handle: Handle) -> Links {
        self.slot(handle).links()
    }

    #[inline]
    fn links_mut(&mut self, handle: Handle) -> &mut Links {
        self.slot_mut(handle).links_mut()
    }

    #[inline]
    pub(super) fn parent(&self, handle: Handle) -> Option<Handle> {
        self.links(handle).parent
    }

    #[inline]
    pub(super) fn left(&self, handle: Handle) -> Option<Handle> {
        self.links(handle).left
    }

    #[inline]
    pub(super) fn right(&self, handle: Handle) -> Option<Handle> {
        self.links(handle).right
    }

    #[inline]
    pub(super) fn color(&self, handle: Handle) -> Color {
        self.slot(handle).meta().color()
    }

    #[inline]
    fn set_color(&mut self, handle: Handle, color: Color) {
        self.slot_mut(handle).meta_mut().set_color(color);
    }

    /// Absent children count as black.
    #[inline]
    pub(super) fn is_red(&self, handle: Option<Handle>) -> bool {
        handle.is_some_and(|handle| self.color(handle) == Color::Red)
    }
}

// Navigation.
impl<K, V> RawTree<K, V> {
    pub(crate) fn leftmost(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.left(handle) {
            handle = left;
        }
        handle
    }

    pub(crate) fn rightmost(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.right(handle) {
            handle = right;
        }
        handle
    }

    /// In-order successor: leftmost node of the right subtree, else the first ancestor reached from
    /// a left child.
    pub(crate) fn successor(&self, handle: Handle) -> Option<Handle> {
        if let Some(right) = self.right(handle) {
            return Some(self.leftmost(right));
        }
        let mut child = handle;
        let mut parent = self.parent(child);
        while let Some(p) = parent {
            if self.left(p) == Some(child) {
                break;
            }
            child = p;
            parent = self.parent(p);
        }
        parent
    }

    pub(crate) fn predecessor(&self, handle: Handle) -> Option<Handle> {
        if let Some(left) = self.left(handle) {
            return Some(self.rightmost(left));
        }
        let mut child = handle;
        let mut parent = self.parent(child);
        while let Some(p) = parent {
            if self.right(p) == Some(child) {
                break;
            }
            child = p;
            parent = self.parent(p);
        }
        parent
    }
}

// Ordered queries.
impl<K, V> RawTree<K, V> {
    /// Descends to `key`. Keys outside the cached extrema resolve in O(1).
    pub(crate) fn locate<C, Q>(&self, comparator: &C, key: &Q) -> Search
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let (Some(first), Some(last)) = (self.first, self.last) else {
            return Search::Vacant {
                parent: None,
                side: Side::Left,
            };
        };
        if comparator.compare(key, self.key(first).borrow()) == Ordering::Less {
            return Search::Vacant {
                parent: Some(first),
                side: Side::Left,
            };
        }
        if comparator.compare(key, self.key(last).borrow()) == Ordering::Greater {
            return Search::Vacant {
                parent: Some(last),
                side: Side::Right,
            };
        }

        let mut parent = None;
        let mut side = Side::Left;
        let mut cursor = self.root;
        while let Some(node) = cursor {
            match comparator.compare(key, self.key(node).borrow()) {
                Ordering::Less => {
                    parent = Some(node);
                    side = Side::Left;
                    cursor = self.left(node);
                }
                Ordering::Greater => {
                    parent = Some(node);
                    side = Side::Right;
                    cursor = self.right(node);
                }
                Ordering::Equal => return Search::Found(node),
            }
        }
        Search::Vacant { parent, side }
    }

    pub(crate) fn find<C, Q>(&self, comparator: &C, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        match self.locate(comparator, key) {
            Search::Found(found) => Some(found),
            Search::Vacant { .. } => None,
        }
    }

    /// First element not ordered before `key`.
    pub(crate) fn lower_bound<C, Q>(&self, comparator: &C, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.bound(|node| comparator.compare(self.key(node).borrow(), key) != Ordering::Less)
    }

    /// First element ordered after `key`.
    pub(crate) fn upper_bound<C, Q>(&self, comparator: &C, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.bound(|node| comparator.compare(self.key(node).borrow(), key) == Ordering::Greater)
    }

    /// Leftmost node satisfying `past`, which must be monotone over the in-order sequence.
    fn bound(&self, past: impl Fn(Handle) -> bool) -> Option<Handle> {
        let mut candidate = None;
        let mut cursor = self.root;
        while let Some(node) = cursor {
            if past(node) {
                candidate = Some(node);
                cursor = self.left(node);
            } else {
                cursor = self.right(node);
            }
        }
        candidate
    }

    /// First and last element inside `range`, or `None` if it holds no element.
    ///
    /// # Panics
    ///
    /// Panics if the start of `range` is ordered after its end, or if both bounds are excluded
    /// and equal.
    pub(crate) fn range_ends<C, Q, R>(&self, comparator: &C, range: &R) -> Option<(Handle, Handle)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        R: RangeBounds<Q>,
    {
        match (range.start_bound(), range.end_bound()) {
            (Bound::Excluded(start), Bound::Excluded(end)) if comparator.equal(start, end) => {
                panic!("range start is equal to range end and both bounds are excluded");
            }
            (Bound::Included(start) | Bound::Excluded(start), Bound::Included(end) | Bound::Excluded(end)) => {
                assert!(
                    comparator.compare(start, end) != Ordering::Greater,
                    "range start is greater than range end"
                );
            }
            _ => {}
        }

        let front = match range.start_bound() {
            Bound::Unbounded => self.first,
            Bound::Included(start) => self.lower_bound(comparator, start),
            Bound::Excluded(start) => self.upper_bound(comparator, start),
        };
        let past_back = match range.end_bound() {
            Bound::Unbounded => None,
            Bound::Included(end) => self.upper_bound(comparator, end),
            Bound::Excluded(end) => self.lower_bound(comparator, end),
        };
        let back = match past_back {
            Some(past) => self.predecessor(past),
            None => self.last,
        };
        match (front, back) {
            (Some(front), Some(back))
                if comparator.compare(self.key(front).borrow(), self.key(back).borrow()) != Ordering::Greater =>
            {
                Some((front, back))
            }
            _ => None,
        }
    }
}

// Structural changes.
impl<K, V> RawTree<K, V> {
    /// Points whatever referenced `old` as a child (or the root) at `new`.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let links = self.links_mut(parent);
                if links.left == Some(old) {
                    links.left = new;
                } else {
                    links.right = new;
                }
            }
        }
    }

    fn rotate_left(&mut self, x: Handle) {
        let y = self.right(x).expect("`RawTree::rotate_left()` - pivot has no right child!");
        let inner = self.left(y);
        self.links_mut(x).right = inner;
        if let Some(inner) = inner {
            self.links_mut(inner).parent = Some(x);
        }
        let parent = self.parent(x);
        self.links_mut(y).parent = parent;
        self.replace_child(parent, x, Some(y));
        self.links_mut(y).left = Some(x);
        self.links_mut(x).parent = Some(y);
    }

    fn rotate_right(&mut self, x: Handle) {
        let y = self.left(x).expect("`RawTree::rotate_right()` - pivot has no left child!");
        let inner = self.right(y);
        self.links_mut(x).left = inner;
        if let Some(inner) = inner {
            self.links_mut(inner).parent = Some(x);
        }
        let parent = self.parent(x);
        self.links_mut(y).parent = parent;
        self.replace_child(parent, x, Some(y));
        self.links_mut(y).right = Some(x);
        self.links_mut(x).parent = Some(y);
    }

    /// Links the filled slot `node` under `parent` and rebalances.
    pub(super) fn attach(&mut self, node: Handle, parent: Option<Handle>, side: Side) {
        *self.links_mut(node) = Links {
            parent,
            left: None,
            right: None,
        };
        self.set_color(node, Color::Red);
        match (parent, side) {
            (None, _) => {
                self.root = Some(node);
                self.first = Some(node);
                self.last = Some(node);
            }
            (Some(parent), Side::Left) => {
                self.links_mut(parent).left = Some(node);
                if self.first == Some(parent) {
                    self.first = Some(node);
                }
            }
            (Some(parent), Side::Right) => {
                self.links_mut(parent).right = Some(node);
                if self.last == Some(parent) {
                    self.last = Some(node);
                }
            }
        }
        self.insert_fixup(node);
    }

    fn insert_fixup(&mut self, mut node: Handle) {
        while let Some(parent) = self.parent(node) {
            if self.color(parent) == Color::Black {
                break;
            }
            let grandparent = self.parent(parent).expect("`RawTree::insert_fixup()` - red root!");
            let parent_side = if self.left(grandparent) == Some(parent) { Side::Left } else { Side::Right };
            let uncle = match parent_side {
                Side::Left => self.right(grandparent),
                Side::Right => self.left(grandparent),
            };

            if let Some(uncle) = uncle.filter(|&uncle| self.color(uncle) == Color::Red) {
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            let mut top = parent;
            match parent_side {
                Side::Left => {
                    if self.right(parent) == Some(node) {
                        self.rotate_left(parent);
                        top = node;
                    }
                    self.rotate_right(grandparent);
                }
                Side::Right => {
                    if self.left(parent) == Some(node) {
                        self.rotate_right(parent);
                        top = node;
                    }
                    self.rotate_left(grandparent);
                }
            }
            self.set_color(top, Color::Black);
            self.set_color(grandparent, Color::Red);
            break;
        }
        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    /// Moves `child` (possibly absent) into the tree position of `node`.
    fn transplant(&mut self, node: Handle, child: Option<Handle>) {
        let parent = self.parent(node);
        self.replace_child(parent, node, child);
        if let Some(child) = child {
            self.links_mut(child).parent = parent;
        }
    }

    /// Unlinks `node` from the tree and rebalances. The slot keeps its entry but no longer has any
    /// tree links, and nothing in the tree refers to it.
    pub(super) fn detach(&mut self, node: Handle) {
        if self.first == Some(node) {
            self.first = self.successor(node);
        }
        if self.last == Some(node) {
            self.last = self.predecessor(node);
        }

        let Links { parent, left, right } = self.links(node);
        let mut removed = self.color(node);
        let hole;
        let hole_parent;
        match (left, right) {
            (None, _) => {
                hole = right;
                hole_parent = parent;
                self.transplant(node, right);
            }
            (Some(_), None) => {
                hole = left;
                hole_parent = parent;
                self.transplant(node, left);
            }
            (Some(left), Some(right)) => {
                // The successor takes over the position and color of `node`; the fix-up starts where
                // the successor used to be.
                let successor = self.leftmost(right);
                removed = self.color(successor);
                hole = self.right(successor);
                if successor == right {
                    hole_parent = Some(successor);
                } else {
                    hole_parent = self.parent(successor);
                    self.transplant(successor, hole);
                    self.links_mut(successor).right = Some(right);
                    self.links_mut(right).parent = Some(successor);
                }
                self.transplant(node, Some(successor));
                self.links_mut(successor).left = Some(left);
                self.links_mut(left).parent = Some(successor);
                let color = self.color(node);
                self.set_color(successor, color);
            }
        }
        *self.links_mut(node) = Links::DETACHED;

        if removed == Color::Black {
            self.erase_fixup(hole, hole_parent);
        }
    }

    /// Restores equal black height after a black node left the path through `node`.
    fn erase_fixup(&mut self, mut node: Option<Handle>, mut parent: Option<Handle>) {
        while node != self.root && !self.is_red(node) {
            let Some(p) = parent else { break };
            if self.left(p) == node {
                let mut sibling = self.right(p).expect("`RawTree::erase_fixup()` - missing sibling!");
                if self.color(sibling) == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_left(p);
                    sibling = self.right(p).expect("`RawTree::erase_fixup()` - missing sibling!");
                }
                if !self.is_red(self.left(sibling)) && !self.is_red(self.right(sibling)) {
                    self.set_color(sibling, Color::Red);
                    node = Some(p);
                    parent = self.parent(p);
                    continue;
                }
                if !self.is_red(self.right(sibling)) {
                    if let Some(near) = self.left(sibling) {
                        self.set_color(near, Color::Black);
                    }
                    self.set_color(sibling, Color::Red);
                    self.rotate_right(sibling);
                    sibling = self.right(p).expect("`RawTree::erase_fixup()` - missing sibling!");
                }
                let color = self.color(p);
                self.set_color(sibling, color);
                self.set_color(p, Color::Black);
                if let Some(far) = self.right(sibling) {
                    self.set_color(far, Color::Black);
                }
                self.rotate_left(p);
            } else {
                let mut sibling = self.left(p).expect("`RawTree::erase_fixup()` - missing sibling!");
                if self.color(sibling) == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_right(p);
                    sibling = self.left(p).expect("`RawTree::erase_fixup()` - missing sibling!");
                }
                if !self.is_red(self.left(sibling)) && !self.is_red(self.right(sibling)) {
                    self.set_color(sibling, Color::Red);
                    node = Some(p);
                    parent = self.parent(p);
                    continue;
                }
                if !self.is_red(self.left(sibling)) {
                    if let Some(near) = self.right(sibling) {
                        self.set_color(near, Color::Black);
                    }
                    self.set_color(sibling, Color::Red);
                    self.rotate_left(sibling);
                    sibling = self.left(p).expect("`RawTree::erase_fixup()` - missing sibling!");
                }
                let color = self.color(p);
                self.set_color(sibling, color);
                self.set_color(p, Color::Black);
                if let Some(far) = self.left(sibling) {
                    self.set_color(far, Color::Black);
                }
                self.rotate_right(p);
            }
            node = self.root;
            break;
        }
        if let Some(node) = node {
            self.set_color(node, Color::Black);
        }
    }

    /// Swaps the tree identities of slots `a` and `b`: entries, colors and tree links trade places,
    /// and every reference to either slot (neighbors, root, extrema) is rewritten to match. Hash
    /// chain links stay with the slot positions.
    pub(super) fn relocate(&mut self, a: Handle, b: Handle) {
        if a == b {
            return;
        }
        self.slots.swap(a.to_index(), b.to_index());
        let next_a = self.slot(a).next();
        let next_b = self.slot(b).next();
        self.slot_mut(a).set_next(next_b);
        self.slot_mut(b).set_next(next_a);

        let remap = |handle| exchange(handle, a, b);
        self.links_mut(a).remap(remap);
        self.links_mut(b).remap(remap);

        let (links_a, links_b) = (self.links(a), self.links(b));
        let mut neighbors = [None; 6];
        let mut count = 0;
        for neighbor in [
            links_a.parent,
            links_a.left,
            links_a.right,
            links_b.parent,
            links_b.left,
            links_b.right,
        ]
        .into_iter()
        .flatten()
        {
            if neighbor != a && neighbor != b && !neighbors[..count].contains(&Some(neighbor)) {
                neighbors[count] = Some(neighbor);
                count += 1;
            }
        }
        for neighbor in neighbors.into_iter().flatten() {
            self.links_mut(neighbor).remap(remap);
        }

        self.root = remap(self.root);
        self.first = remap(self.first);
        self.last = remap(self.last);
    }
}
