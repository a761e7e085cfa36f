use std::fmt::{self, Debug, Formatter};

use static_assertions::assert_eq_size;

/// Every KDD points to its root node in the storage table.
///
/// Handles are only meaningful for the [Storage](crate::Storage) that created
/// them; since nodes are never removed a handle stays valid for the lifetime
/// of its storage.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Kdd
{
    index: usize, // Index in the node table.
}

assert_eq_size!(Kdd, usize);

impl Kdd
{
    pub(crate) fn new(index: usize) -> Kdd
    {
        Kdd { index }
    }

    pub fn index(&self) -> usize
    {
        self.index
    }
}

impl Debug for Kdd
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result
    {
        match self.index {
            0 => write!(f, "empty set"),
            1 => write!(f, "empty map"),
            index => write!(f, "index: {}", index),
        }
    }
}
