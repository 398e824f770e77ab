use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;

/// A strict total order over `E`, supplied to a set at construction.
///
/// For any `a`, `b` and `c`, exactly one of `compare(a, b)` being `Less`, `Equal` or `Greater`
/// holds, `compare(a, b)` is the reverse of `compare(b, a)`, and the order is transitive. Sets
/// treat `Equal` elements as the same element. Breaking these rules is a logic error; it is not
/// checked.
///
/// Any `Fn(&E, &E) -> Ordering` closure is a comparator.
///
/// # Examples
///
/// ```
/// use sorted_set::{Comparator, Natural};
/// use core::cmp::Ordering;
///
/// let descending = |a: &i32, b: &i32| b.cmp(a);
/// assert_eq!(descending.compare(&1, &2), Ordering::Greater);
/// assert_eq!(Natural.compare(&1, &2), Ordering::Less);
/// ```
pub trait Comparator<E: ?Sized> {
    /// Compares `a` with `b`.
    fn compare(&self, a: &E, b: &E) -> Ordering;
}

impl<E: ?Sized, F> Comparator<E> for F
where
    F: Fn(&E, &E) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &E, b: &E) -> Ordering {
        self(a, b)
    }
}

/// The order given by `E`'s [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Natural;

impl<E: Ord + ?Sized> Comparator<E> for Natural {
    #[inline]
    fn compare(&self, a: &E, b: &E) -> Ordering {
        a.cmp(b)
    }
}

/// Orders elements by a key extracted from each of them. Created by [`by_key`].
pub struct ByKey<F, K> {
    key: F,
    _key: PhantomData<fn() -> K>,
}

/// Makes a comparator ordering elements by the [`Ord`] order of `key(element)`.
///
/// Elements with equal keys are equal to the set, so only one of them is kept.
///
/// # Examples
///
/// ```
/// use sorted_set::{WavlTreeSet, by_key};
///
/// let mut set = WavlTreeSet::with_comparator(by_key(|s: &&str| s.len()));
/// assert!(set.insert("AAA"));
/// assert!(set.insert("B"));
/// assert!(!set.insert("C"));
/// assert_eq!(set.first(), Ok(&"B"));
/// ```
pub const fn by_key<E: ?Sized, K: Ord, F: Fn(&E) -> K>(key: F) -> ByKey<F, K> {
    ByKey { key, _key: PhantomData }
}

impl<E: ?Sized, K: Ord, F: Fn(&E) -> K> Comparator<E> for ByKey<F, K> {
    #[inline]
    fn compare(&self, a: &E, b: &E) -> Ordering {
        (self.key)(a).cmp(&(self.key)(b))
    }
}

impl<F: Clone, K> Clone for ByKey<F, K> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            _key: PhantomData,
        }
    }
}

impl<F, K> fmt::Debug for ByKey<F, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByKey").finish_non_exhaustive()
    }
}
