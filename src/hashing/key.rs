//! Tuple Key Module
//!
//! Defines what the cache can be keyed by: indexable tuples of arguments,
//! or a single scalar argument treated as a one-element tuple.

use std::sync::Arc;

use crate::hashing::Arg;

// == Tuple Key Trait ==
/// A key the hashing engine can walk position by position.
pub trait TupleKey {
    /// Declared number of positions.
    ///
    /// `None` marks a non-indexable key, hashed as a single-element tuple
    /// holding the key itself at position 0.
    fn arity(&self) -> Option<usize>;

    /// Argument at `index`, or `None` when the key cannot supply it.
    ///
    /// A key may declare more positions than it can serve; the missing
    /// ones are hashed as [`Arg::Undefined`].
    fn arg(&self, index: usize) -> Option<&Arg>;

    /// Shared allocation backing this key instance, if it has one.
    ///
    /// Only keys with an instance identity take part in the last-seen
    /// shortcut.
    fn instance(&self) -> Option<&Arc<[Arg]>> {
        None
    }
}

// == Tuple ==
/// An immutable, cheaply clonable tuple with instance identity.
///
/// Clones share the same allocation, so hashing a clone right after its
/// source tuple reuses the memoized hash.
#[derive(Debug, Clone)]
pub struct Tuple {
    args: Arc<[Arg]>,
}

impl Tuple {
    /// Creates a tuple from its arguments, in order.
    pub fn new<I>(args: I) -> Self
    where
        I: IntoIterator<Item = Arg>,
    {
        Self {
            args: args.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Returns true if both tuples are the same instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.args, &other.args)
    }
}

impl From<Vec<Arg>> for Tuple {
    fn from(args: Vec<Arg>) -> Self {
        Self { args: args.into() }
    }
}

impl FromIterator<Arg> for Tuple {
    fn from_iter<I: IntoIterator<Item = Arg>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Builds a [`Tuple`] from a list of values convertible into [`Arg`].
///
/// ```
/// use tuple_cache::{tuple, Arg};
///
/// let key = tuple![1, "one", Arg::Null];
/// assert_eq!(key.len(), 3);
/// ```
#[macro_export]
macro_rules! tuple {
    ($($arg:expr),* $(,)?) => {{
        let args: ::std::vec::Vec<$crate::Arg> = ::std::vec![$($crate::Arg::from($arg)),*];
        $crate::Tuple::from(args)
    }};
}

// == Trait Implementations ==
impl TupleKey for Tuple {
    fn arity(&self) -> Option<usize> {
        Some(self.args.len())
    }

    fn arg(&self, index: usize) -> Option<&Arg> {
        self.args.get(index)
    }

    fn instance(&self) -> Option<&Arc<[Arg]>> {
        Some(&self.args)
    }
}

impl TupleKey for Arg {
    fn arity(&self) -> Option<usize> {
        None
    }

    fn arg(&self, index: usize) -> Option<&Arg> {
        (index == 0).then_some(self)
    }
}

impl TupleKey for [Arg] {
    fn arity(&self) -> Option<usize> {
        Some(self.len())
    }

    fn arg(&self, index: usize) -> Option<&Arg> {
        self.get(index)
    }
}

impl TupleKey for Vec<Arg> {
    fn arity(&self) -> Option<usize> {
        Some(self.len())
    }

    fn arg(&self, index: usize) -> Option<&Arg> {
        self.get(index)
    }
}

impl<const N: usize> TupleKey for [Arg; N] {
    fn arity(&self) -> Option<usize> {
        Some(N)
    }

    fn arg(&self, index: usize) -> Option<&Arg> {
        self.get(index)
    }
}
