use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::ops::{Add, Sub};

/// A finite multiset. Every element that is present has a count of at least one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Multiset<T: Ord>
{
    elements: BTreeMap<T, usize>,
}

impl<T: Ord + Clone> Multiset<T>
{
    pub fn new() -> Self
    {
        Multiset { elements: BTreeMap::new() }
    }

    /// Adds the given number of occurrences of value.
    pub fn insert(&mut self, value: T, occurrences: usize)
    {
        if occurrences > 0 {
            *self.elements.entry(value).or_insert(0) += occurrences;
        }
    }

    /// Removes up to the given number of occurrences of value, returns the number actually removed.
    pub fn remove(&mut self, value: &T, occurrences: usize) -> usize
    {
        let count = self.count(value);
        if count > occurrences {
            if let Some(count) = self.elements.get_mut(value) {
                *count -= occurrences;
            }
            occurrences
        } else {
            self.elements.remove(value);
            count
        }
    }

    /// Returns the number of occurrences of value.
    pub fn count(&self, value: &T) -> usize
    {
        self.elements.get(value).copied().unwrap_or(0)
    }

    pub fn contains(&self, value: &T) -> bool
    {
        self.elements.contains_key(value)
    }

    /// Returns the total number of occurrences.
    pub fn len(&self) -> usize
    {
        self.elements.values().sum()
    }

    pub fn is_empty(&self) -> bool
    {
        self.elements.is_empty()
    }

    /// Returns the distinct elements in ascending order.
    pub fn distinct(&self) -> impl Iterator<Item = &T>
    {
        self.elements.keys()
    }

    /// Returns the (element, count) pairs in ascending order.
    pub fn iter(&self) -> btree_map::Iter<'_, T, usize>
    {
        self.elements.iter()
    }

    /// The union takes the maximum count of every element.
    pub fn union(&self, other: &Self) -> Self
    {
        let mut result = self.clone();
        for (value, count) in other.iter()
        {
            let entry = result.elements.entry(value.clone()).or_insert(0);
            *entry = (*entry).max(*count);
        }

        result
    }

    /// The sum adds the counts of every element.
    pub fn sum(&self, other: &Self) -> Self
    {
        let mut result = self.clone();
        for (value, count) in other.iter()
        {
            result.insert(value.clone(), *count);
        }

        result
    }

    /// The difference subtracts the counts of other, elements that drop to zero are removed.
    pub fn difference(&self, other: &Self) -> Self
    {
        let mut result = self.clone();
        for (value, count) in other.iter()
        {
            result.remove(value, *count);
        }

        result
    }

    /// Returns true iff every element occurs at most as often in self as in other.
    pub fn is_subset(&self, other: &Self) -> bool
    {
        self.iter().all(|(value, count)| *count <= other.count(value))
    }

    /// Returns true iff self is a subset of other and they differ.
    pub fn is_strict_subset(&self, other: &Self) -> bool
    {
        self != other && self.is_subset(other)
    }
}

impl<T: Ord + Clone> Default for Multiset<T>
{
    fn default() -> Self
    {
        Self::new()
    }
}

// The sub-multiset order, two multisets where neither is included in the other are incomparable.
impl<T: Ord + Clone> PartialOrd for Multiset<T>
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering>
    {
        if self == other {
            Some(Ordering::Equal)
        } else if self.is_subset(other) {
            Some(Ordering::Less)
        } else if other.is_subset(self) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

impl<T: Ord + Clone> FromIterator<T> for Multiset<T>
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self
    {
        let mut result = Multiset::new();
        result.extend(iter);
        result
    }
}

impl<T: Ord + Clone> Extend<T> for Multiset<T>
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I)
    {
        for value in iter
        {
            self.insert(value, 1);
        }
    }
}

impl<T: Ord + Clone> Add for &Multiset<T>
{
    type Output = Multiset<T>;

    fn add(self, other: Self) -> Multiset<T>
    {
        self.sum(other)
    }
}

impl<T: Ord + Clone> Sub for &Multiset<T>
{
    type Output = Multiset<T>;

    fn sub(self, other: Self) -> Multiset<T>
    {
        self.difference(other)
    }
}

impl<T: Ord + Clone + fmt::Display> fmt::Display for Multiset<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{{")?;
        let mut first = true;
        for (value, count) in self.iter()
        {
            for _ in 0..*count
            {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{}", value)?;
                first = false;
            }
        }
        write!(f, "}}")
    }
}
