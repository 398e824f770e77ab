use core::num::NonZero;

/// Order of the B-tree: the maximum number of child links on a page.
pub(crate) const ORDER: usize = 5;
/// Maximum number of keys on a page.
pub(crate) const MAX_KEYS: usize = ORDER - 1;
/// Minimum number of keys on every page except the root.
pub(crate) const MIN_KEYS: usize = MAX_KEYS / 2;
/// Keys moved to the new right page when a full page splits.
pub(crate) const RIGHT_SPLIT: usize = (MAX_KEYS + 1) / 2;
/// Keys left on the split page, the median included, before the median is promoted.
pub(crate) const LEFT_SPLIT: usize = MAX_KEYS + 1 - RIGHT_SPLIT;

/// Page capacity after one growth step: x1.5, but always at least 4 more pages.
#[inline]
pub(crate) const fn min_grow(pages: usize) -> usize {
    let grown = pages * 3 / 2;
    if grown < pages + 4 { pages + 4 } else { grown }
}

type RawPageId = u32;

/// Typed index of a page in a [`PageArena`](super::PageArena).
///
/// Stored as `index + 1` so that `Option<PageId>` costs nothing extra in the link buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct PageId(NonZero<RawPageId>);

impl PageId {
    /// Largest page index; the raw value must fit below the descriptor flag bits.
    pub(crate) const MAX: usize = (Descriptor::COUNT_MASK - 1) as usize;

    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`PageId::from_index()` - `index` > `PageId::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        let raw = (index + 1) as RawPageId;
        // `index + 1` cannot be zero and cannot overflow.
        Self(NonZero::new(raw).unwrap())
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Packed per-page word.
///
/// A live page stores `{leaf flag, key count}`. A page on the free list stores the free flag and
/// the raw id of the next free page, zero being the end of the list.
#[derive(Clone, Copy, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Descriptor(u32);

impl Descriptor {
    const LEAF_FLAG: u32 = 1 << 31;
    const FREE_FLAG: u32 = 1 << 30;
    const COUNT_MASK: u32 = Self::FREE_FLAG - 1;

    #[inline]
    pub(crate) const fn leaf(len: usize) -> Self {
        debug_assert!(len <= MAX_KEYS);
        #[allow(clippy::cast_possible_truncation)]
        let len = len as u32;
        Self(Self::LEAF_FLAG | len)
    }

    #[inline]
    pub(crate) const fn internal(len: usize) -> Self {
        debug_assert!(len <= MAX_KEYS);
        #[allow(clippy::cast_possible_truncation)]
        let len = len as u32;
        Self(len)
    }

    #[inline]
    pub(crate) const fn free(next: Option<PageId>) -> Self {
        match next {
            Some(page) => Self(Self::FREE_FLAG | page.0.get()),
            None => Self(Self::FREE_FLAG),
        }
    }

    #[inline]
    pub(crate) const fn is_free(self) -> bool {
        self.0 & Self::FREE_FLAG != 0
    }

    #[inline]
    pub(crate) const fn is_leaf(self) -> bool {
        assert!(!self.is_free(), "`Descriptor::is_leaf()` - page is on the free list!");
        self.0 & Self::LEAF_FLAG != 0
    }

    #[inline]
    pub(crate) const fn len(self) -> usize {
        assert!(!self.is_free(), "`Descriptor::len()` - page is on the free list!");
        (self.0 & Self::COUNT_MASK) as usize
    }

    /// Same page kind, new key count.
    #[inline]
    pub(crate) const fn with_len(self, len: usize) -> Self {
        if self.is_leaf() { Self::leaf(len) } else { Self::internal(len) }
    }

    #[inline]
    pub(crate) const fn next_free(self) -> Option<PageId> {
        assert!(self.is_free(), "`Descriptor::next_free()` - page is not on the free list!");
        match NonZero::new(self.0 & Self::COUNT_MASK) {
            Some(raw) => Some(PageId(raw)),
            None => None,
        }
    }
}

impl core::fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_free() {
            f.debug_struct("Free").field("next", &self.next_free()).finish()
        } else if self.is_leaf() {
            f.debug_struct("Leaf").field("len", &self.len()).finish()
        } else {
            f.debug_struct("Internal").field("len", &self.len()).finish()
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::{assert_eq_size, const_assert, const_assert_eq};

    // Verify our assumptions about `PageId` and the niche optimization.
    assert_eq_size!(PageId, Option<PageId>);
    assert_eq_size!(PageId, RawPageId);
    assert_eq_size!(Descriptor, u32);

    // A split must leave both halves at minimum fill, and a merge must fit one page.
    const_assert_eq!(LEFT_SPLIT + RIGHT_SPLIT, MAX_KEYS + 1);
    const_assert!(LEFT_SPLIT - 1 >= MIN_KEYS);
    const_assert!(RIGHT_SPLIT >= MIN_KEYS);
    const_assert!(2 * MIN_KEYS <= MAX_KEYS);

    #[test]
    #[should_panic(expected = "`PageId::from_index()` - `index` > `PageId::MAX`!")]
    fn invalid_page_id() {
        let _ = PageId::from_index(PageId::MAX + 1);
    }

    #[test]
    fn split_constants_for_order_five() {
        assert_eq!(MAX_KEYS, 4);
        assert_eq!(MIN_KEYS, 2);
        assert_eq!(RIGHT_SPLIT, 2);
        assert_eq!(LEFT_SPLIT, 3);
    }

    #[test]
    fn growth_is_at_least_four_pages() {
        assert_eq!(min_grow(0), 4);
        assert_eq!(min_grow(1), 5);
        assert_eq!(min_grow(4), 8);
        assert_eq!(min_grow(8), 12);
        assert_eq!(min_grow(12), 18);
        assert_eq!(min_grow(100), 150);
    }

    #[test]
    fn descriptor_packs_kind_and_len() {
        let leaf = Descriptor::leaf(3);
        assert!(leaf.is_leaf());
        assert!(!leaf.is_free());
        assert_eq!(leaf.len(), 3);

        let internal = Descriptor::internal(1).with_len(4);
        assert!(!internal.is_leaf());
        assert_eq!(internal.len(), 4);
        assert!(leaf.with_len(0).is_leaf());
    }

    #[test]
    fn descriptor_threads_free_list() {
        assert_eq!(Descriptor::free(None).next_free(), None);
        let next = PageId::from_index(7);
        assert_eq!(Descriptor::free(Some(next)).next_free(), Some(next));
        assert!(Descriptor::free(Some(PageId::from_index(PageId::MAX))).is_free());
    }

    #[test]
    #[should_panic(expected = "`Descriptor::len()` - page is on the free list!")]
    fn free_descriptor_has_no_len() {
        let _ = Descriptor::free(None).len();
    }

    proptest! {
        #[test]
        fn page_id_round_trip(index in 0..=PageId::MAX) {
            let page = PageId::from_index(index);
            prop_assert_eq!(page.to_index(), index);
            prop_assert_eq!(Descriptor::free(Some(page)).next_free(), Some(page));
        }
    }
}
