use super::handle::Handle;
use super::meta::Meta;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Which child of its parent a node is, or is about to become.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// Tree links of one slot.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Links {
    pub(crate) parent: Option<Handle>,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
}

impl Links {
    pub(crate) const DETACHED: Self = Self {
        parent: None,
        left: None,
        right: None,
    };

    /// Rewrites every link for which `map` returns a different handle.
    #[inline]
    pub(crate) fn remap(&mut self, map: impl Fn(Option<Handle>) -> Option<Handle>) {
        self.parent = map(self.parent);
        self.left = map(self.left);
        self.right = map(self.right);
    }
}

/// One record of the backing store.
///
/// A slot carries two independent linkages: `links` place it in the tree, `next` places it in a hash
/// chain (or, once vacated, in the free list of the collision region). Dense stores never touch
/// `next`.
#[derive(Clone, Debug)]
pub(crate) struct Slot<K, V> {
    entry: Option<(K, V)>,
    meta: Meta,
    next: Option<Handle>,
    links: Links,
}

impl<K, V> Slot<K, V> {
    pub(crate) const fn vacant() -> Self {
        Self {
            entry: None,
            meta: Meta::EMPTY,
            next: None,
            links: Links::DETACHED,
        }
    }

    pub(crate) const fn occupied(entry: (K, V), meta: Meta) -> Self {
        Self {
            entry: Some(entry),
            meta,
            next: None,
            links: Links::DETACHED,
        }
    }

    /// Fills a vacant slot without disturbing its chain link.
    pub(crate) fn fill(&mut self, entry: (K, V), meta: Meta) {
        debug_assert!(self.entry.is_none(), "`Slot::fill()` - slot is occupied!");
        self.entry = Some(entry);
        self.meta = meta;
        self.links = Links::DETACHED;
    }

    /// Empties the slot and returns its entry. The chain link is cleared as well.
    pub(crate) fn vacate(&mut self) -> (K, V) {
        self.meta = Meta::EMPTY;
        self.next = None;
        self.links = Links::DETACHED;
        self.entry.take().expect("`Slot::vacate()` - slot is vacant!")
    }

    pub(crate) fn into_entry(self) -> (K, V) {
        self.entry.expect("`Slot::into_entry()` - slot is vacant!")
    }

    #[inline]
    pub(crate) fn entry(&self) -> Option<&(K, V)> {
        self.entry.as_ref()
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self) -> Option<&mut (K, V)> {
        self.entry.as_mut()
    }

    #[inline]
    pub(crate) const fn meta(&self) -> Meta {
        self.meta
    }

    #[inline]
    pub(crate) fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    #[inline]
    pub(crate) const fn next(&self) -> Option<Handle> {
        self.next
    }

    #[inline]
    pub(crate) fn set_next(&mut self, next: Option<Handle>) {
        self.next = next;
    }

    #[inline]
    pub(crate) const fn links(&self) -> Links {
        self.links
    }

    #[inline]
    pub(crate) fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}
