use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

use crate::{Multiset, Value};

/// The tokens of every place of a net. Markings are values, firing produces a new marking.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Marking<P: Ord>
{
    places: BTreeMap<P, Multiset<Value>>,
}

impl<P: Ord + Clone> Marking<P>
{
    /// Returns the marking where the given places are empty.
    pub(crate) fn empty(places: impl IntoIterator<Item = P>) -> Self
    {
        Marking {
            places: places.into_iter().map(|place| (place, Multiset::new())).collect(),
        }
    }

    pub fn get(&self, place: &P) -> Option<&Multiset<Value>>
    {
        self.places.get(place)
    }

    pub(crate) fn get_mut(&mut self, place: &P) -> Option<&mut Multiset<Value>>
    {
        self.places.get_mut(place)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&P, &Multiset<Value>)>
    {
        self.places.iter()
    }

    /// Returns the total number of tokens.
    pub fn len(&self) -> usize
    {
        self.places.values().map(Multiset::len).sum()
    }

    pub fn is_empty(&self) -> bool
    {
        self.places.values().all(Multiset::is_empty)
    }
}

impl<P: Ord + Clone> Index<&P> for Marking<P>
{
    type Output = Multiset<Value>;

    fn index(&self, place: &P) -> &Multiset<Value>
    {
        match self.places.get(place) {
            Some(content) => content,
            None => panic!("The place is not part of the marking."),
        }
    }
}

impl<P: Ord + Clone + fmt::Debug> fmt::Display for Marking<P>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        for (index, (place, content)) in self.places.iter().enumerate()
        {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {}", place, content)?;
        }

        Ok(())
    }
}
