use crate::{Kdd, Storage};

use std::hash::Hash;

// Returns an iterator over all maps contained in the given KDD. Every map is returned as a list of (key, value) pairs sorted by key.
pub fn iter<K, V>(storage: &Storage<K, V>, kdd: Kdd) -> Iter<'_, K, V>
    where K: Ord + Hash + Clone,
          V: Ord + Hash + Clone
{
    if kdd == storage.empty_set() {
        Iter {
            storage,
            map: Vec::new(),
            stack: Vec::new(),
        }
    } else {
        Iter {
            storage,
            map: Vec::new(),
            stack: vec![Frame { kdd, position: 0, bound: false }],
        }
    }
}

// A node on the depth-first search stack.
struct Frame
{
    kdd: Kdd,
    position: usize, // The next branch to explore, the skip child comes after all take branches.
    bound: bool, // Whether entering this frame pushed a pair onto the map.
}

pub struct Iter<'a, K, V>
{
    storage: &'a Storage<K, V>,
    map: Vec<(K, V)>, // Stores the pairs of the returned map.
    stack: Vec<Frame>, // Stores the stack for the depth-first search.
}

impl<K, V> Iter<'_, K, V>
{
    // Leave the top frame, also forgetting its pair if it had one.
    fn pop(&mut self)
    {
        if let Some(frame) = self.stack.pop() {
            if frame.bound {
                self.map.pop();
            }
        }
    }
}

impl<K, V> Iterator for Iter<'_, K, V>
    where K: Ord + Hash + Clone,
          V: Ord + Hash + Clone
{
    type Item = Vec<(K, V)>;

    fn next(&mut self) -> Option<Self::Item>
    {
        loop
        {
            let frame = self.stack.last_mut()?;
            let kdd = frame.kdd;

            if kdd == self.storage.empty_set()
            {
                self.pop();
            }
            else if kdd == self.storage.empty_map()
            {
                // Here, we have found another map in the KDD.
                let result = self.map.clone();
                self.pop();
                return Some(result);
            }
            else
            {
                let position = frame.position;
                frame.position += 1;

                let take = self.storage.take(kdd);
                if position < take.len()
                {
                    let (value, child) = &take[position];
                    self.map.push((self.storage.key(kdd).clone(), value.clone()));
                    self.stack.push(Frame { kdd: *child, position: 0, bound: true });
                }
                else if position == take.len()
                {
                    let skip = self.storage.skip(kdd);
                    self.stack.push(Frame { kdd: skip, position: 0, bound: false });
                }
                else
                {
                    self.pop();
                }
            }
        }
    }
}
