use thiserror::Error;

/// The error returned by `first()` on an empty set.
///
/// # Examples
///
/// ```
/// use sorted_set::{BTreeSet, EmptySetError};
///
/// let set: BTreeSet<u8> = BTreeSet::new();
/// assert_eq!(set.first(), Err(EmptySetError));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Error)]
#[error("sorted set is empty")]
pub struct EmptySetError;
