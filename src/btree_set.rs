use core::fmt;

use smallvec::SmallVec;

use crate::compare::{Comparator, Natural};
use crate::error::EmptySetError;
use crate::raw::{Descriptor, LEFT_SPLIT, MAX_KEYS, MIN_KEYS, ORDER, PageArena, PageId};
use crate::sorted_set::SortedSet;

type KeyBuf<E> = SmallVec<[E; MAX_KEYS + 1]>;
type LinkBuf = SmallVec<[PageId; ORDER + 1]>;

/// An ordered set based on a B-tree of order 5 stored in a flat page arena.
///
/// Pages hold up to four sorted keys and, when internal, up to five child links. They live in
/// three shared buffers (descriptors, keys, links) addressed by page index, so no page is ever
/// heap-allocated on its own. Pages emptied by a merge or a root collapse go on a free list and
/// are reused before the arena grows.
///
/// The ordering comes from the [`Comparator`] given at construction and must be a strict total
/// order. A comparator that is not is a logic error: the set will not be memory-unsafe, but its
/// answers are unspecified.
///
/// # Examples
///
/// ```
/// use sorted_set::BTreeSet;
///
/// let mut set = BTreeSet::new();
/// assert!(set.insert(6));
/// assert!(set.insert(2));
/// assert!(!set.insert(6));
///
/// assert_eq!(set.first(), Ok(&2));
/// assert!(set.remove(&2));
/// assert_eq!(set.first(), Ok(&6));
/// ```
#[derive(Clone)]
pub struct BTreeSet<E, C = Natural> {
    pages: PageArena<E>,
    root: PageId,
    /// Number of page levels; a root-only tree has height 1.
    height: usize,
    len: usize,
    comparator: C,
}

/// Outcome of inserting into a subtree.
enum Insertion<E> {
    /// An equal key is already present; nothing changed.
    Present,
    /// The key was placed without overflowing the subtree's root page.
    Inserted,
    /// The subtree's root page split; the parent must take `median` and a link to `right`.
    Split { median: E, right: PageId },
}

impl<E: Ord> BTreeSet<E> {
    /// Makes a new, empty `BTreeSet` ordered by [`Ord`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }

    /// Makes a new, empty `BTreeSet` ordered by [`Ord`] with room for `pages` pages.
    #[must_use]
    pub fn with_capacity(pages: usize) -> Self {
        Self::with_capacity_and_comparator(pages, Natural)
    }
}

impl<E, C> BTreeSet<E, C> {
    /// Makes a new, empty `BTreeSet` ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sorted_set::{BTreeSet, by_key};
    ///
    /// let mut set = BTreeSet::with_comparator(by_key(|s: &&str| s.len()));
    /// set.insert("AAA");
    /// set.insert("B");
    /// assert_eq!(set.first(), Ok(&"B"));
    /// ```
    pub fn with_comparator(comparator: C) -> Self {
        Self::with_capacity_and_comparator(1, comparator)
    }

    /// Makes a new, empty `BTreeSet` ordered by `comparator` with room for `pages` pages.
    pub fn with_capacity_and_comparator(pages: usize, comparator: C) -> Self {
        let mut arena = PageArena::with_capacity(pages);
        let root = arena.alloc(Descriptor::leaf(0));
        Self {
            pages: arena,
            root,
            height: 1,
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

    /// Returns the number of page levels. It grows only when the root splits and shrinks only
    /// when an emptied root hands over to its single child.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns the minimum element.
    ///
    /// # Errors
    ///
    /// Returns [`EmptySetError`] if the set is empty.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn first(&self) -> Result<&E, EmptySetError> {
        if self.len == 0 {
            return Err(EmptySetError);
        }
        let mut page = self.root;
        while !self.pages.is_leaf(page) {
            page = self.pages.link(page, 0);
        }
        Ok(self.pages.key(page, 0))
    }
}

impl<E, C: Comparator<E>> BTreeSet<E, C> {
    #[inline]
    fn search(&self, page: PageId, element: &E) -> Result<usize, usize> {
        self.pages.search_by(page, |key| self.comparator.compare(key, element))
    }

    /// Returns `true` if the set contains an element equal to `element`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains(&self, element: &E) -> bool {
        let mut page = self.root;
        loop {
            match self.search(page, element) {
                Ok(_) => return true,
                Err(_) if self.pages.is_leaf(page) => return false,
                Err(index) => page = self.pages.link(page, index),
            }
        }
    }

    /// Adds an element to the set.
    ///
    /// Returns `true` if it was newly inserted, `false` if an equal element was already present,
    /// in which case the set is unchanged.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, element: E) -> bool {
        match self.insert_into(self.root, element) {
            Insertion::Present => return false,
            Insertion::Inserted => {}
            Insertion::Split { median, right } => self.grow_root(median, right),
        }
        self.len += 1;
        true
    }

    fn insert_into(&mut self, page: PageId, element: E) -> Insertion<E> {
        let index = match self.search(page, &element) {
            Ok(_) => return Insertion::Present,
            Err(index) => index,
        };
        if self.pages.is_leaf(page) {
            return self.insert_at(page, index, element, None);
        }
        match self.insert_into(self.pages.link(page, index), element) {
            Insertion::Split { median, right } => self.insert_at(page, index, median, Some(right)),
            other => other,
        }
    }

    fn insert_at(&mut self, page: PageId, index: usize, key: E, right: Option<PageId>) -> Insertion<E> {
        if self.pages.len_of(page) < MAX_KEYS {
            self.pages.insert(page, index, key, right);
            return Insertion::Inserted;
        }
        self.split(page, index, key, right)
    }

    // Splits a full page while inserting `key` at `index` (and `right` after it):
    //
    //   page:  k_0 .. key .. k_{MAX_KEYS-1}   (MAX_KEYS + 1 keys)
    //          \______________/ | \________/
    //           LEFT_SPLIT - 1  median  RIGHT_SPLIT -> new page
    fn split(&mut self, page: PageId, index: usize, key: E, right: Option<PageId>) -> Insertion<E> {
        let descriptor = self.pages.descriptor(page);
        let mut keys = KeyBuf::new();
        let mut links = LinkBuf::new();
        self.pages.drain(page, &mut keys, &mut links);
        keys.insert(index, key);
        if let Some(right) = right {
            links.insert(index + 1, right);
        }

        let right_keys: KeyBuf<E> = keys.drain(LEFT_SPLIT..).collect();
        let median = keys.remove(LEFT_SPLIT - 1);
        let right_links: LinkBuf = if descriptor.is_leaf() { LinkBuf::new() } else { links.drain(LEFT_SPLIT..).collect() };

        let sibling = self.pages.alloc(descriptor.with_len(0));
        self.pages.fill(page, keys, links);
        self.pages.fill(sibling, right_keys, right_links);
        Insertion::Split { median, right: sibling }
    }

    fn grow_root(&mut self, median: E, right: PageId) {
        let root = self.pages.alloc(Descriptor::internal(0));
        self.pages.fill(root, [median], [self.root, right]);
        self.root = root;
        self.height += 1;
        log::trace!("btree: root split, height is now {}", self.height);
    }

    /// Removes an element from the set.
    ///
    /// Returns `true` if it was present, `false` otherwise, in which case the set is unchanged.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove(&mut self, element: &E) -> bool {
        if !self.remove_from(self.root, element) {
            return false;
        }
        self.len -= 1;

        let root = self.root;
        if self.pages.len_of(root) == 0 && !self.pages.is_leaf(root) {
            self.root = self.pages.link(root, 0);
            self.pages.free(root);
            self.height -= 1;
            log::trace!("btree: root collapsed, height is now {}", self.height);
        }
        true
    }

    fn remove_from(&mut self, page: PageId, element: &E) -> bool {
        match self.search(page, element) {
            Ok(index) if self.pages.is_leaf(page) => {
                drop(self.pages.remove(page, index));
            }
            Ok(index) => {
                // Replace with the maximum of the left subtree, taken from its leaf.
                let max = self.remove_last(self.pages.link(page, index));
                drop(self.pages.replace_key(page, index, max));
                self.rebalance_child(page, index);
            }
            Err(_) if self.pages.is_leaf(page) => return false,
            Err(index) => {
                if !self.remove_from(self.pages.link(page, index), element) {
                    return false;
                }
                self.rebalance_child(page, index);
            }
        }
        true
    }

    fn remove_last(&mut self, page: PageId) -> E {
        if self.pages.is_leaf(page) {
            return self.pages.pop(page).0;
        }
        let index = self.pages.len_of(page);
        let key = self.remove_last(self.pages.link(page, index));
        self.rebalance_child(page, index);
        key
    }

    /// Restores minimum fill of the child at `index` of `parent` by merging it with, or borrowing
    /// from, an adjacent sibling.
    fn rebalance_child(&mut self, parent: PageId, index: usize) {
        let child_len = self.pages.len_of(self.pages.link(parent, index));
        if child_len >= MIN_KEYS {
            return;
        }

        let parent_len = self.pages.len_of(parent);
        debug_assert!(parent_len > 0, "internal page without separators");
        let use_right = index == 0
            || (index < parent_len
                && self.pages.len_of(self.pages.link(parent, index + 1))
                    > self.pages.len_of(self.pages.link(parent, index - 1)));
        let separator = if use_right { index } else { index - 1 };

        let left_len = self.pages.len_of(self.pages.link(parent, separator));
        let right_len = self.pages.len_of(self.pages.link(parent, separator + 1));
        if left_len + right_len < MAX_KEYS {
            self.merge(parent, separator);
        } else {
            self.redistribute(parent, separator, left_len, right_len);
        }
    }

    /// Folds the separator at `separator` and the page right of it into the page left of it.
    fn merge(&mut self, parent: PageId, separator: usize) {
        let left = self.pages.link(parent, separator);
        let (key, right) = self.pages.remove(parent, separator);
        let right = right.expect("`BTreeSet::merge()` - separator without a right page!");

        let mut keys = KeyBuf::new();
        let mut links = LinkBuf::new();
        self.pages.drain(right, &mut keys, &mut links);
        self.pages.free(right);

        let mut links = links.into_iter();
        self.pages.push(left, key, links.next());
        for key in keys {
            self.pages.push(left, key, links.next());
        }
        log::trace!("btree: merged page {} into page {}", right.to_index(), left.to_index());
    }

    /// Moves keys through the separator from the fuller sibling until both hold `MIN_KEYS`.
    fn redistribute(&mut self, parent: PageId, separator: usize, left_len: usize, right_len: usize) {
        let left = self.pages.link(parent, separator);
        let right = self.pages.link(parent, separator + 1);
        if right_len > left_len {
            for _ in left_len..MIN_KEYS {
                let (key, link) = self.pages.pop_front(right);
                let key = self.pages.replace_key(parent, separator, key);
                self.pages.push(left, key, link);
            }
        } else {
            for _ in right_len..MIN_KEYS {
                let (key, link) = self.pages.pop(left);
                let key = self.pages.replace_key(parent, separator, key);
                self.pages.push_front(right, key, link);
            }
        }
        log::trace!("btree: redistributed keys between pages {} and {}", left.to_index(), right.to_index());
    }
}

impl<E: Ord> Default for BTreeSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, C: Comparator<E>> Extend<E> for BTreeSet<E, C> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

impl<E: Ord> FromIterator<E> for BTreeSet<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<E: fmt::Debug, C> fmt::Debug for BTreeSet<E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BTreeSet")
            .field("len", &self.len)
            .field("height", &self.height)
            .field("first", &self.first().ok())
            .finish_non_exhaustive()
    }
}

impl<E, C: Comparator<E>> SortedSet<E> for BTreeSet<E, C> {
    fn len(&self) -> usize {
        BTreeSet::len(self)
    }

    fn is_empty(&self) -> bool {
        BTreeSet::is_empty(self)
    }

    fn first(&self) -> Result<&E, EmptySetError> {
        BTreeSet::first(self)
    }

    fn contains(&self, element: &E) -> bool {
        BTreeSet::contains(self, element)
    }

    fn insert(&mut self, element: E) -> bool {
        BTreeSet::insert(self, element)
    }

    fn remove(&mut self, element: &E) -> bool {
        BTreeSet::remove(self, element)
    }
}
