use crate::{Kdd, Storage, iterators::*};

use std::fmt;
use std::hash::Hash;

// Return a formatter for the given Kdd.
pub fn fmt_node<K, V>(storage: &Storage<K, V>, kdd: Kdd) -> Display<'_, K, V>
{
    Display {
        storage,
        kdd,
    }
}

// Print the maps represented by the given Kdd.
pub struct Display<'a, K, V>
{
    storage: &'a Storage<K, V>,
    kdd: Kdd,
}

fn print<K, V>(storage: &Storage<K, V>, kdd: Kdd, f: &mut fmt::Formatter<'_>) -> fmt::Result
    where K: Ord + Hash + Clone + fmt::Display,
          V: Ord + Hash + Clone + fmt::Display
{
    for map in iter(storage, kdd)
    {
        // Here, we have found another map in the KDD.
        write!(f, "{{")?;
        for (index, (key, value)) in map.iter().enumerate()
        {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        writeln!(f, "}}")?;
    }

    Ok(())
}

impl<K, V> fmt::Display for Display<'_, K, V>
    where K: Ord + Hash + Clone + fmt::Display,
          V: Ord + Hash + Clone + fmt::Display
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        writeln!(f, "{{")?;
        print(self.storage, self.kdd, f)?;
        write!(f, "}}")
    }
}
