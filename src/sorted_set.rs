use alloc::boxed::Box;

use crate::compare::Comparator;
use crate::error::EmptySetError;
use crate::{BTreeSet, WavlTreeSet};

/// The operations shared by every set engine in this crate.
///
/// Code written against `SortedSet` runs unchanged on a [`BTreeSet`] or a [`WavlTreeSet`], and
/// the two give the same answers for the same sequence of operations.
///
/// # Examples
///
/// ```
/// use sorted_set::{Engine, Natural, SortedSet};
///
/// fn drain<S: SortedSet<u32> + ?Sized>(set: &mut S) -> Vec<u32> {
///     let mut out = Vec::new();
///     while let Ok(&first) = set.first() {
///         set.remove(&first);
///         out.push(first);
///     }
///     out
/// }
///
/// for engine in Engine::ALL {
///     let mut set: Box<dyn SortedSet<u32>> = engine.create(Natural);
///     for x in [6, 2, 5, 1] {
///         set.insert(x);
///     }
///     assert_eq!(drain(&mut *set), [1, 2, 5, 6]);
/// }
/// ```
pub trait SortedSet<E> {
    /// Returns the number of elements in the set.
    fn len(&self) -> usize;

    /// Returns `true` if the set contains no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the minimum element.
    ///
    /// # Errors
    ///
    /// Returns [`EmptySetError`] if the set is empty.
    fn first(&self) -> Result<&E, EmptySetError>;

    /// Returns `true` if the set contains an element equal to `element`.
    fn contains(&self, element: &E) -> bool;

    /// Adds an element. Returns `false`, leaving the set unchanged, if an equal one is present.
    fn insert(&mut self, element: E) -> bool;

    /// Removes an element. Returns `false`, leaving the set unchanged, if it was absent.
    fn remove(&mut self, element: &E) -> bool;
}

/// Selects the storage engine behind a set made by [`Engine::create`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Engine {
    /// [`BTreeSet`]: an order-5 B-tree in a flat page arena.
    #[default]
    BTree,
    /// [`WavlTreeSet`]: a rank-balanced binary search tree.
    Wavl,
}

impl Engine {
    /// Every engine, in declaration order.
    pub const ALL: [Engine; 2] = [Engine::BTree, Engine::Wavl];

    /// Makes a new, empty set on this engine, ordered by `comparator`.
    pub fn create<'a, E: 'a, C: Comparator<E> + 'a>(self, comparator: C) -> Box<dyn SortedSet<E> + 'a> {
        match self {
            Engine::BTree => Box::new(BTreeSet::with_comparator(comparator)),
            Engine::Wavl => Box::new(WavlTreeSet::with_comparator(comparator)),
        }
    }
}
