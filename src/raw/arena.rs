use alloc::vec::Vec;

use super::page::{Descriptor, MAX_KEYS, ORDER, PageId, min_grow};

/// Flat page storage for the B-tree.
///
/// Page `i` owns the `MAX_KEYS` key slots starting at `i * MAX_KEYS` and the `ORDER` link slots
/// starting at `i * ORDER` in the shared buffers. Pages are never moved: growth only appends, and freed pages are threaded
/// through their descriptors for reuse.
#[derive(Clone)]
pub(crate) struct PageArena<E> {
    descriptors: Vec<Descriptor>,
    keys: Vec<Option<E>>,
    links: Vec<Option<PageId>>,
    /// Pages the buffers are sized for.
    capacity: usize,
    free_head: Option<PageId>,
    free_len: usize,
}

impl<E> PageArena<E> {
    pub(crate) const fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            keys: Vec::new(),
            links: Vec::new(),
            capacity: 0,
            free_head: None,
            free_len: 0,
        }
    }

    pub(crate) fn with_capacity(pages: usize) -> Self {
        let mut arena = Self::new();
        arena.reserve_pages(pages);
        arena
    }

    /// Allocates a page with the given descriptor, reusing a free page when there is one.
    pub(crate) fn alloc(&mut self, descriptor: Descriptor) -> PageId {
        debug_assert!(!descriptor.is_free());
        if let Some(page) = self.free_head {
            self.free_head = self.descriptors[page.to_index()].next_free();
            self.free_len -= 1;
            self.descriptors[page.to_index()] = descriptor;
            log::trace!("page arena: reused free page {}", page.to_index());
            return page;
        }

        let index = self.descriptors.len();
        assert!(index <= PageId::MAX, "`PageArena::alloc()` - arena is at maximum capacity ({})", PageId::MAX);
        if index == self.capacity {
            self.reserve_pages(min_grow(self.capacity));
            log::trace!("page arena: grew to {} pages", self.capacity);
        }
        self.descriptors.push(descriptor);
        self.keys.extend((0..MAX_KEYS).map(|_| None));
        self.links.extend([None; ORDER]);
        PageId::from_index(index)
    }

    /// Returns an empty page to the free list.
    pub(crate) fn free(&mut self, page: PageId) {
        let index = page.to_index();
        assert!(!self.descriptors[index].is_free(), "`PageArena::free()` - page is already free!");
        debug_assert!(self.page_keys(page).iter().all(Option::is_none), "`PageArena::free()` - page still holds keys!");
        self.page_links_mut(page).fill(None);
        self.descriptors[index] = Descriptor::free(self.free_head);
        self.free_head = Some(page);
        self.free_len += 1;
        log::trace!("page arena: freed page {index}");
    }

    fn reserve_pages(&mut self, pages: usize) {
        if pages <= self.capacity {
            return;
        }
        let additional = pages - self.descriptors.len();
        self.descriptors.reserve_exact(additional);
        self.keys.reserve_exact(additional * MAX_KEYS);
        self.links.reserve_exact(additional * ORDER);
        self.capacity = pages;
    }

    #[inline]
    pub(crate) fn descriptor(&self, page: PageId) -> Descriptor {
        self.descriptors[page.to_index()]
    }

    #[inline]
    pub(crate) fn set_descriptor(&mut self, page: PageId, descriptor: Descriptor) {
        debug_assert!(!self.descriptors[page.to_index()].is_free());
        self.descriptors[page.to_index()] = descriptor;
    }

    #[inline]
    pub(crate) fn is_leaf(&self, page: PageId) -> bool {
        self.descriptor(page).is_leaf()
    }

    /// Number of keys on a page.
    #[inline]
    pub(crate) fn len_of(&self, page: PageId) -> usize {
        self.descriptor(page).len()
    }

    #[inline]
    fn page_keys(&self, page: PageId) -> &[Option<E>] {
        let base = page.to_index() * MAX_KEYS;
        &self.keys[base..base + MAX_KEYS]
    }

    #[inline]
    fn page_keys_mut(&mut self, page: PageId) -> &mut [Option<E>] {
        let base = page.to_index() * MAX_KEYS;
        &mut self.keys[base..base + MAX_KEYS]
    }

    #[inline]
    fn page_links_mut(&mut self, page: PageId) -> &mut [Option<PageId>] {
        let base = page.to_index() * ORDER;
        &mut self.links[base..base + ORDER]
    }

    #[inline]
    pub(crate) fn key(&self, page: PageId, index: usize) -> &E {
        self.keys[page.to_index() * MAX_KEYS + index].as_ref().expect("`PageArena::key()` - key slot is empty!")
    }

    /// Replaces a key in place, returning the previous one.
    pub(crate) fn replace_key(&mut self, page: PageId, index: usize, key: E) -> E {
        self.keys[page.to_index() * MAX_KEYS + index]
            .replace(key)
            .expect("`PageArena::replace_key()` - key slot is empty!")
    }

    #[inline]
    pub(crate) fn link(&self, page: PageId, index: usize) -> PageId {
        self.links[page.to_index() * ORDER + index].expect("`PageArena::link()` - link slot is empty!")
    }

    /// Binary search over a page's keys.
    ///
    /// `Ok(i)` when `f` reports `Equal` for key `i`, otherwise `Err(i)` with the insertion index,
    /// which is also the index of the child link to descend into.
    #[inline]
    pub(crate) fn search_by<F>(&self, page: PageId, mut f: F) -> Result<usize, usize>
    where
        F: FnMut(&E) -> core::cmp::Ordering,
    {
        let len = self.len_of(page);
        self.page_keys(page)[..len]
            .binary_search_by(|slot| f(slot.as_ref().expect("`PageArena::search_by()` - key slot is empty!")))
    }

    /// Inserts `key` at `index` and, on an internal page, `right` as the link after it.
    /// The page must have room.
    pub(crate) fn insert(&mut self, page: PageId, index: usize, key: E, right: Option<PageId>) {
        let descriptor = self.descriptor(page);
        let len = descriptor.len();
        assert!(len < MAX_KEYS, "`PageArena::insert()` - page is full!");
        debug_assert!(index <= len);

        let keys = self.page_keys_mut(page);
        keys[index..=len].rotate_right(1);
        keys[index] = Some(key);
        if !descriptor.is_leaf() {
            let links = self.page_links_mut(page);
            links[index + 1..=len + 1].rotate_right(1);
            links[index + 1] = Some(right.expect("`PageArena::insert()` - internal page needs a link!"));
        }
        self.set_descriptor(page, descriptor.with_len(len + 1));
    }

    /// Removes the key at `index` and, on an internal page, the link after it.
    pub(crate) fn remove(&mut self, page: PageId, index: usize) -> (E, Option<PageId>) {
        let descriptor = self.descriptor(page);
        let len = descriptor.len();
        debug_assert!(index < len);

        let keys = self.page_keys_mut(page);
        let key = keys[index].take().expect("`PageArena::remove()` - key slot is empty!");
        keys[index..len].rotate_left(1);
        let link = if descriptor.is_leaf() {
            None
        } else {
            let links = self.page_links_mut(page);
            let link = links[index + 1].take();
            links[index + 1..=len].rotate_left(1);
            link
        };
        self.set_descriptor(page, descriptor.with_len(len - 1));
        (key, link)
    }

    /// Appends a key and, on an internal page, the link after it.
    pub(crate) fn push(&mut self, page: PageId, key: E, link: Option<PageId>) {
        let len = self.len_of(page);
        self.insert(page, len, key, link);
    }

    /// Removes the last key and, on an internal page, the last link.
    pub(crate) fn pop(&mut self, page: PageId) -> (E, Option<PageId>) {
        let len = self.len_of(page);
        self.remove(page, len - 1)
    }

    /// Prepends a key and, on an internal page, a new first link.
    pub(crate) fn push_front(&mut self, page: PageId, key: E, link: Option<PageId>) {
        let descriptor = self.descriptor(page);
        let len = descriptor.len();
        assert!(len < MAX_KEYS, "`PageArena::push_front()` - page is full!");

        let keys = self.page_keys_mut(page);
        keys[..=len].rotate_right(1);
        keys[0] = Some(key);
        if !descriptor.is_leaf() {
            let links = self.page_links_mut(page);
            links[..=len + 1].rotate_right(1);
            links[0] = Some(link.expect("`PageArena::push_front()` - internal page needs a link!"));
        }
        self.set_descriptor(page, descriptor.with_len(len + 1));
    }

    /// Removes the first key and, on an internal page, the first link.
    pub(crate) fn pop_front(&mut self, page: PageId) -> (E, Option<PageId>) {
        let descriptor = self.descriptor(page);
        let len = descriptor.len();
        debug_assert!(len > 0);

        let keys = self.page_keys_mut(page);
        let key = keys[0].take().expect("`PageArena::pop_front()` - key slot is empty!");
        keys[..len].rotate_left(1);
        let link = if descriptor.is_leaf() {
            None
        } else {
            let links = self.page_links_mut(page);
            let link = links[0].take();
            links[..=len].rotate_left(1);
            link
        };
        self.set_descriptor(page, descriptor.with_len(len - 1));
        (key, link)
    }

    /// Moves every key and link of `page` out, leaving it empty.
    pub(crate) fn drain(&mut self, page: PageId, keys: &mut impl Extend<E>, links: &mut impl Extend<PageId>) {
        let descriptor = self.descriptor(page);
        let len = descriptor.len();
        keys.extend(self.page_keys_mut(page)[..len].iter_mut().map(|slot| slot.take().expect("`PageArena::drain()` - key slot is empty!")));
        if !descriptor.is_leaf() {
            links.extend(self.page_links_mut(page)[..=len].iter_mut().map(|slot| slot.take().expect("`PageArena::drain()` - link slot is empty!")));
        }
        self.set_descriptor(page, descriptor.with_len(0));
    }

    /// Fills an empty page from the given keys and, on an internal page, `keys + 1` links.
    pub(crate) fn fill(&mut self, page: PageId, keys: impl IntoIterator<Item = E>, links: impl IntoIterator<Item = PageId>) {
        let descriptor = self.descriptor(page);
        debug_assert_eq!(descriptor.len(), 0);
        let mut len = 0;
        for (slot, key) in self.page_keys_mut(page).iter_mut().zip(keys) {
            *slot = Some(key);
            len += 1;
        }
        if !descriptor.is_leaf() {
            let mut count = 0;
            for (slot, link) in self.page_links_mut(page).iter_mut().zip(links) {
                *slot = Some(link);
                count += 1;
            }
            debug_assert_eq!(count, len + 1);
        }
        self.set_descriptor(page, descriptor.with_len(len));
    }
}

#[cfg(test)]
impl<E> PageArena<E> {
    /// Number of pages ever appended, free ones included.
    pub(crate) fn pages(&self) -> usize {
        self.descriptors.len()
    }

    /// Number of live pages.
    pub(crate) fn len(&self) -> usize {
        self.descriptors.len() - self.free_len
    }

    /// Number of pages the buffers can hold without reallocating.
    pub(crate) const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Walks the free list, checking it against the free page count.
    pub(crate) fn free_pages(&self) -> Vec<PageId> {
        let mut pages = Vec::new();
        let mut next = self.free_head;
        while let Some(page) = next {
            pages.push(page);
            next = self.descriptor(page).next_free();
        }
        assert_eq!(pages.len(), self.free_len, "free list length mismatch");
        pages
    }
}
