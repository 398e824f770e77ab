use alloc::boxed::Box;
use core::cmp::Ordering;
use core::fmt;

use crate::compare::{Comparator, Natural};
use crate::error::EmptySetError;
use crate::sorted_set::SortedSet;

// A weak AVL tree, after "Rank-Balanced Trees" by Haeupler, Sen and Tarjan.
//
// Every node carries a rank. The rank difference between a node and each child is 1 or 2, an
// absent child having rank -1, and every leaf has rank 0. Insertion repairs a 0-difference with
// promotions and at most one (double) rotation; deletion repairs a 3-difference with demotions
// and at most one (double) rotation.

type Link<E> = Option<Box<Node<E>>>;

const ABSENT_RANK: i32 = -1;

#[derive(Clone)]
struct Node<E> {
    key: E,
    rank: i32,
    left: Link<E>,
    right: Link<E>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl<E> Node<E> {
    const fn new(key: E) -> Self {
        Self {
            key,
            rank: 0,
            left: None,
            right: None,
        }
    }

    #[inline]
    const fn child(&self, side: Side) -> &Link<E> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    #[inline]
    fn child_mut(&mut self, side: Side) -> &mut Link<E> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    #[inline]
    const fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

#[inline]
fn rank<E>(link: &Link<E>) -> i32 {
    link.as_ref().map_or(ABSENT_RANK, |node| node.rank)
}

/// An ordered set based on a weak AVL (rank-balanced) binary search tree.
///
/// Each element lives in its own node, owned by exactly one parent edge or by the root. Insertion
/// and deletion take O(log n) time and perform at most two rotations; all other rebalancing is
/// rank bookkeeping.
///
/// The ordering comes from the [`Comparator`] given at construction and must be a strict total
/// order.
///
/// # Examples
///
/// ```
/// use sorted_set::WavlTreeSet;
///
/// let mut set = WavlTreeSet::new();
/// for x in [6, 2, 5, 1] {
///     set.insert(x);
/// }
/// assert_eq!(set.first(), Ok(&1));
/// assert!(set.contains(&5));
/// assert!(!set.contains(&3));
/// ```
#[derive(Clone)]
pub struct WavlTreeSet<E, C = Natural> {
    root: Link<E>,
    len: usize,
    comparator: C,
}

impl<E: Ord> WavlTreeSet<E> {
    /// Makes a new, empty `WavlTreeSet` ordered by [`Ord`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<E, C> WavlTreeSet<E, C> {
    /// Makes a new, empty `WavlTreeSet` ordered by `comparator`.
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            root: None,
            len: 0,
            comparator,
        }
    }

    /// Returns the number of elements in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the rank of the root, or `-1` for an empty set.
    ///
    /// The height of the tree is at least the rank and at most twice the rank plus one.
    #[must_use]
    pub fn rank(&self) -> i32 {
        rank(&self.root)
    }

    /// Returns the minimum element.
    ///
    /// # Errors
    ///
    /// Returns [`EmptySetError`] if the set is empty.
    pub fn first(&self) -> Result<&E, EmptySetError> {
        let mut node = self.root.as_deref().ok_or(EmptySetError)?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Ok(&node.key)
    }
}

impl<E, C: Comparator<E>> WavlTreeSet<E, C> {
    /// Returns `true` if the set contains an element equal to `element`.
    pub fn contains(&self, element: &E) -> bool {
        let mut link = &self.root;
        while let Some(node) = link {
            link = match self.comparator.compare(element, &node.key) {
                Ordering::Less => &node.left,
                Ordering::Greater => &node.right,
                Ordering::Equal => return true,
            };
        }
        false
    }

    /// Adds an element to the set.
    ///
    /// Returns `true` if it was newly inserted, `false` if an equal element was already present,
    /// in which case the set is unchanged.
    pub fn insert(&mut self, element: E) -> bool {
        let inserted = insert_into(&mut self.root, element, &self.comparator);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Removes an element from the set.
    ///
    /// Returns `true` if it was present, `false` otherwise, in which case the set is unchanged.
    pub fn remove(&mut self, element: &E) -> bool {
        let removed = remove_from(&mut self.root, element, &self.comparator);
        if removed {
            self.len -= 1;
        }
        removed
    }
}

fn insert_into<E, C: Comparator<E>>(slot: &mut Link<E>, element: E, comparator: &C) -> bool {
    let Some(node) = slot.as_deref_mut() else {
        *slot = Some(Box::new(Node::new(element)));
        return true;
    };
    let side = match comparator.compare(&element, &node.key) {
        Ordering::Less => Side::Left,
        Ordering::Greater => Side::Right,
        Ordering::Equal => return false,
    };
    if !insert_into(node.child_mut(side), element, comparator) {
        return false;
    }
    if node.rank == rank(node.child(side))
        && let Some(node) = slot.take()
    {
        *slot = Some(rebalance_after_insert(node, side));
    }
    true
}

/// Repairs `node` whose child on `side` was promoted to `node`'s own rank.
fn rebalance_after_insert<E>(mut node: Box<Node<E>>, side: Side) -> Box<Node<E>> {
    let other = side.opposite();
    if node.rank - rank(node.child(other)) == 1 {
        // 0,1 node: promote and let the parent look at it.
        node.rank += 1;
        return node;
    }

    // 0,2 node: one rotation or a double rotation finishes the insertion.
    debug_assert_eq!(node.rank - rank(node.child(other)), 2);
    let child = node.child_mut(side).as_deref_mut().expect("`rebalance_after_insert()` - child is missing!");
    if child.rank - rank(child.child(side)) == 1 {
        //       [node]              [child]
        //      0/    \2            1/     \1
        //  [child]   [q]   =>     [r]    [node]
        //  1/   \2                      1/    \1
        // [r]   [s]                    [s]    [q]
        node.rank -= 1;
        log::trace!("wavl: single rotation after insert");
        return rotate(node, other);
    }

    //       [node]                   [inner]
    //      0/    \2                 1/     \1
    //  [child]   [q]   =>      [child]    [node]
    //  2/   \1                 1/  \        /  \1
    // [r]  [inner]           [r]   [b]    [c]   [q]
    //       /   \
    //     [b]   [c]
    child.rank -= 1;
    let inner = child.child_mut(other).as_deref_mut().expect("`rebalance_after_insert()` - inner grandchild is missing!");
    inner.rank += 1;
    node.rank -= 1;
    log::trace!("wavl: double rotation after insert");
    let child = node.child_mut(side).take().expect("`rebalance_after_insert()` - child is missing!");
    *node.child_mut(side) = Some(rotate(child, side));
    rotate(node, other)
}

fn remove_from<E, C: Comparator<E>>(slot: &mut Link<E>, element: &E, comparator: &C) -> bool {
    let Some(node) = slot.as_deref_mut() else {
        return false;
    };
    let side = match comparator.compare(element, &node.key) {
        Ordering::Less => Side::Left,
        Ordering::Greater => Side::Right,
        Ordering::Equal => {
            remove_root(slot);
            return true;
        }
    };
    if !remove_from(node.child_mut(side), element, comparator) {
        return false;
    }
    rebalance_after_remove(slot, side);
    true
}

/// Removes the key at the root of the subtree in `slot`.
fn remove_root<E>(slot: &mut Link<E>) {
    let mut node = slot.take().expect("`remove_root()` - subtree is empty!");
    if node.left.is_none() {
        // No left child: the right child, if any, is a leaf and takes the node's place.
        *slot = node.right.take();
        return;
    }
    node.key = remove_last(&mut node.left);
    *slot = Some(node);
    rebalance_after_remove(slot, Side::Left);
}

/// Removes and returns the maximum key of the subtree in `slot`.
fn remove_last<E>(slot: &mut Link<E>) -> E {
    let mut node = slot.take().expect("`remove_last()` - subtree is empty!");
    if node.right.is_some() {
        let key = remove_last(&mut node.right);
        *slot = Some(node);
        rebalance_after_remove(slot, Side::Right);
        return key;
    }
    *slot = node.left.take();
    node.key
}

fn rebalance_after_remove<E>(slot: &mut Link<E>, side: Side) {
    if let Some(node) = slot.take() {
        *slot = Some(repair_after_remove(node, side));
    }
}

/// Repairs `node` after its subtree on `side` lost a level. Returns the new subtree root.
fn repair_after_remove<E>(mut node: Box<Node<E>>, side: Side) -> Box<Node<E>> {
    if node.is_leaf() {
        // A 2,2 leaf left behind by removing its only child.
        node.rank = 0;
        return node;
    }
    if node.rank - rank(node.child(side)) < 3 {
        return node;
    }

    let other = side.opposite();
    if node.rank - rank(node.child(other)) == 2 {
        // 3,2 node: demote and let the parent look at it.
        node.rank -= 1;
        return node;
    }

    // 3,1 node: the sibling is present and decides.
    let sibling = node.child_mut(other).as_deref_mut().expect("`repair_after_remove()` - sibling is missing!");
    let near_gap = sibling.rank - rank(sibling.child(side));
    let far_gap = sibling.rank - rank(sibling.child(other));
    if near_gap == 2 && far_gap == 2 {
        sibling.rank -= 1;
        node.rank -= 1;
        return node;
    }

    if far_gap == 1 {
        //     [node]                  [sibling]
        //    3/    \1                 1/     \2
        //  [p]   [sibling]   =>    [node]    [far]
        //        1,2/  \1         2/    \1,2
        //      [near]  [far]     [p]   [near]
        sibling.rank += 1;
        node.rank -= 1;
        log::trace!("wavl: single rotation after remove");
        let mut top = rotate(node, side);
        if let Some(lowered) = top.child_mut(side).as_deref_mut()
            && lowered.is_leaf()
        {
            lowered.rank = 0;
        }
        return top;
    }

    //     [node]                        [near]
    //    3/    \1                      2/    \2
    //  [p]   [sibling]     =>       [node]  [sibling]
    //         1/  \2               1/         \1
    //     [near]  [far]           [p]         [far]
    let near = sibling.child_mut(side).as_deref_mut().expect("`repair_after_remove()` - near nephew is missing!");
    near.rank += 2;
    sibling.rank -= 1;
    node.rank -= 2;
    log::trace!("wavl: double rotation after remove");
    let sibling = node.child_mut(other).take().expect("`repair_after_remove()` - sibling is missing!");
    *node.child_mut(other) = Some(rotate(sibling, other));
    rotate(node, side)
}

// Rotates toward `side`: the child on the opposite side is lifted above `node`, which becomes its
// child on `side`. The lifted child's inner subtree moves across to `node`.
//
//          [node]                 [pivot]
//          /    \                 /     \
//     [pivot]   [c]    =>       [a]    [node]
//     /    \                           /    \
//   [a]    [b]                       [b]    [c]
//
// (drawn for `side == Right`). Ranks are left to the caller.
fn rotate<E>(mut node: Box<Node<E>>, side: Side) -> Box<Node<E>> {
    let other = side.opposite();
    let mut pivot = node.child_mut(other).take().expect("`rotate()` - no child to lift!");
    *node.child_mut(other) = pivot.child_mut(side).take();
    *pivot.child_mut(side) = Some(node);
    pivot
}

impl<E: Ord> Default for WavlTreeSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, C: Comparator<E>> Extend<E> for WavlTreeSet<E, C> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

impl<E: Ord> FromIterator<E> for WavlTreeSet<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<E: fmt::Debug, C> fmt::Debug for WavlTreeSet<E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WavlTreeSet")
            .field("len", &self.len)
            .field("rank", &self.rank())
            .field("first", &self.first().ok())
            .finish_non_exhaustive()
    }
}

impl<E, C: Comparator<E>> SortedSet<E> for WavlTreeSet<E, C> {
    fn len(&self) -> usize {
        WavlTreeSet::len(self)
    }

    fn is_empty(&self) -> bool {
        WavlTreeSet::is_empty(self)
    }

    fn first(&self) -> Result<&E, EmptySetError> {
        WavlTreeSet::first(self)
    }

    fn contains(&self, element: &E) -> bool {
        WavlTreeSet::contains(self, element)
    }

    fn insert(&mut self, element: E) -> bool {
        WavlTreeSet::insert(self, element)
    }

    fn remove(&mut self, element: &E) -> bool {
        WavlTreeSet::remove(self, element)
    }
}
