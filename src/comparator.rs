//! Ordering capabilities consumed by the collections.

use core::cmp::Ordering;
use core::fmt;

/// A strict weak ordering over `T`.
///
/// Collections call [`compare`](Comparator::compare) to place keys in the tree and
/// [`equal`](Comparator::equal) to confirm a hash-chain match. The two must agree: `equal(a, b)`
/// holds exactly when `compare(a, b)` is [`Ordering::Equal`]. For hashed collections, keys that
/// compare equal must also hash equally.
///
/// # Examples
///
/// ```
/// use flatrb::{FlatMap, Reverse};
///
/// let mut map = FlatMap::with_comparator(Reverse);
/// map.insert(1, "a");
/// map.insert(3, "c");
/// map.insert(2, "b");
///
/// let keys: Vec<_> = map.keys().copied().collect();
/// assert_eq!(keys, [3, 2, 1]);
/// ```
pub trait Comparator<T: ?Sized> {
    /// Orders `a` relative to `b`.
    fn compare(&self, a: &T, b: &T) -> Ordering;

    /// Returns `true` if `a` and `b` denote the same key.
    #[inline]
    fn equal(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Natural;

impl<T: ?Sized + Ord> Comparator<T> for Natural {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }

    #[inline]
    fn equal(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Orders keys by the reverse of their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Reverse;

impl<T: ?Sized + Ord> Comparator<T> for Reverse {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        b.cmp(a)
    }

    #[inline]
    fn equal(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Adapts a closure into a [`Comparator`].
///
/// ```
/// use flatrb::{FlatSet, FnComparator};
///
/// // Case-insensitive ordering.
/// let by_lowercase = FnComparator(|a: &&str, b: &&str| a.to_lowercase().cmp(&b.to_lowercase()));
/// let mut set = FlatSet::with_comparator(by_lowercase);
/// assert!(set.insert("Apple").1);
/// assert!(!set.insert("apple").1);
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Clone, Copy, Default)]
pub struct FnComparator<F>(pub F);

impl<T: ?Sized, F> Comparator<T> for FnComparator<F>
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.0)(a, b)
    }
}

impl<F> fmt::Debug for FnComparator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnComparator")
    }
}
