//! Comparator-ordered sets for Rust, on two interchangeable engines.
//!
//! This crate provides [`BTreeSet`] and [`WavlTreeSet`], which keep unique elements sorted by a
//! [`Comparator`] fixed at construction and support the same small contract, [`SortedSet`]:
//!
//! - [`is_empty`](SortedSet::is_empty) and [`len`](SortedSet::len)
//! - [`first`](SortedSet::first) - the minimum element, or [`EmptySetError`]
//! - [`contains`](SortedSet::contains), [`insert`](SortedSet::insert), [`remove`](SortedSet::remove)
//!
//! # Example
//!
//! ```
//! use sorted_set::{BTreeSet, WavlTreeSet, by_key};
//!
//! let mut words = BTreeSet::with_comparator(by_key(|s: &&str| s.len()));
//! words.insert("AAA");
//! words.insert("B");
//! words.insert("DD");
//! assert_eq!(words.first(), Ok(&"B"));
//!
//! let mut numbers: WavlTreeSet<i32> = [6, 2, 5, 1].into_iter().collect();
//! assert_eq!(numbers.first(), Ok(&1));
//! assert!(numbers.remove(&1));
//! assert_eq!(numbers.first(), Ok(&2));
//! ```
//!
//! # Engines
//!
//! - **[`BTreeSet`]** - an order-5 B-tree whose pages live in three flat, growable buffers and
//!   are addressed by index. Overfull pages split, underfull pages merge with or borrow from a
//!   sibling, and freed pages are recycled through a free list threaded through the page
//!   descriptors.
//! - **[`WavlTreeSet`]** - a weak AVL tree (Haeupler, Sen and Tarjan) with one boxed node per
//!   element, rebalanced by rank promotions, demotions and at most two rotations per update.
//!
//! [`Engine`] picks one at run time behind a `Box<dyn SortedSet<E>>`.
//!
//! - **`no_std` compatible** - Only requires `alloc`
//! - **Structural events are logged** at `trace` level through the [`log`] facade

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod compare;
mod error;
mod raw;
mod sorted_set;

pub mod btree_set;
pub mod wavl_set;

pub use btree_set::BTreeSet;
pub use compare::{ByKey, Comparator, Natural, by_key};
pub use error::EmptySetError;
pub use sorted_set::{Engine, SortedSet};
pub use wavl_set::WavlTreeSet;
