use super::node::Color;

/// Packed per-slot word: occupancy, color and hash fingerprint.
///
/// ```text
/// 63                                  2   1   0
/// +-----------------------------------+---+---+
/// |            fingerprint            | B | F |
/// +-----------------------------------+---+---+
/// ```
///
/// `F` marks the slot full and `B` marks the node black. The fingerprint is the hash with its two
/// low bits dropped; dense stores leave it at zero.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Meta(u64);

impl Meta {
    const FULL: u64 = 0b01;
    const BLACK: u64 = 0b10;
    const FLAGS: u64 = Self::FULL | Self::BLACK;

    pub(crate) const EMPTY: Self = Self(0);

    /// A full, red slot carrying the fingerprint of `hash`.
    #[inline]
    pub(crate) const fn occupied(hash: u64) -> Self {
        Self((hash & !Self::FLAGS) | Self::FULL)
    }

    #[inline]
    pub(crate) const fn is_full(self) -> bool {
        self.0 & Self::FULL != 0
    }

    #[inline]
    pub(crate) const fn color(self) -> Color {
        if self.0 & Self::BLACK == 0 { Color::Red } else { Color::Black }
    }

    #[inline]
    pub(crate) fn set_color(&mut self, color: Color) {
        match color {
            Color::Red => self.0 &= !Self::BLACK,
            Color::Black => self.0 |= Self::BLACK,
        }
    }

    /// The stored hash bits, flags cleared. Buckets derived from this match buckets derived from the
    /// original hash.
    #[inline]
    pub(crate) const fn hash(self) -> u64 {
        self.0 & !Self::FLAGS
    }

    #[inline]
    pub(crate) const fn fingerprint(self) -> u64 {
        self.0 >> 2
    }

    /// Cheap pre-check before a full key comparison.
    #[inline]
    pub(crate) const fn matches(self, hash: u64) -> bool {
        self.is_full() && self.fingerprint() == hash >> 2
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    assert_eq_size!(Meta, u64);

    #[test]
    fn empty_slot_is_not_full() {
        assert!(!Meta::EMPTY.is_full());
        assert!(!Meta::EMPTY.matches(0));
    }

    proptest! {
        #[test]
        fn color_does_not_disturb_fingerprint(hash in any::<u64>()) {
            let mut meta = Meta::occupied(hash);
            prop_assert!(meta.is_full());
            prop_assert_eq!(meta.color(), Color::Red);

            meta.set_color(Color::Black);
            prop_assert_eq!(meta.color(), Color::Black);
            prop_assert!(meta.matches(hash));
            prop_assert_eq!(meta.hash() >> 2, hash >> 2);

            meta.set_color(Color::Red);
            prop_assert_eq!(meta, Meta::occupied(hash));
        }

        #[test]
        fn different_fingerprints_do_not_match(a in any::<u64>(), b in any::<u64>()) {
            prop_assume!(a >> 2 != b >> 2);
            prop_assert!(!Meta::occupied(a).matches(b));
        }
    }
}
