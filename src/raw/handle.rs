use core::num::NonZero;

#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// Position of a slot in a tree's backing store.
///
/// Stores `index + 1` so that `Option<Handle>` fits in a bare `RawHandle`; `None` is the "no slot"
/// sentinel used for absent children, parents and chain ends. The largest raw value is reserved and
/// never handed out, which bounds a store to [`Handle::MAX`] slots.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<RawHandle>);

impl Handle {
    /// Number of addressable slots; every valid index is below this.
    pub(crate) const MAX: usize = (RawHandle::MAX - 1) as usize;

    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index < Self::MAX, "`Handle::from_index()` - `index` >= `Handle::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        let raw = (index + 1) as RawHandle;
        match NonZero::new(raw) {
            Some(raw) => Self(raw),
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    // The sentinel must come from the niche, not from an extra tag word.
    assert_eq_size!(Handle, Option<Handle>);
    assert_eq_size!(Handle, RawHandle);

    #[test]
    fn last_index_is_addressable() {
        let handle = Handle::from_index(Handle::MAX - 1);
        assert_eq!(handle.to_index(), Handle::MAX - 1);
    }

    #[test]
    #[should_panic(expected = "`Handle::from_index()` - `index` >= `Handle::MAX`!")]
    fn reserved_index_panics() {
        let _ = Handle::from_index(Handle::MAX);
    }

    proptest! {
        #[test]
        fn index_survives_encoding(index in 0..Handle::MAX) {
            prop_assert_eq!(Handle::from_index(index).to_index(), index);
        }
    }
}
