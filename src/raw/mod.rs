mod arena;
mod page;

pub(crate) use arena::PageArena;
pub(crate) use page::{Descriptor, LEFT_SPLIT, MAX_KEYS, MIN_KEYS, ORDER, PageId};
