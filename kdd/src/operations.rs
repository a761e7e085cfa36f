use crate::{Kdd, Storage, Data, cache_comm_binary_op, cache_unary_function, BinaryOperator, UnaryFunction};

use std::cmp::Ordering;
use std::hash::Hash;

use rustc_hash::FxHashMap;

// Returns a KDD containing only the given map, i.e., { map }. The keys of the map must be unique.
pub fn singleton<K, V>(storage: &mut Storage<K, V>, map: &[(K, V)]) -> Kdd
    where K: Ord + Hash + Clone,
          V: Ord + Hash + Clone
{
    let mut entries = map.to_vec();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut root = storage.empty_map();
    for (key, value) in entries.into_iter().rev()
    {
        root = storage.node(key, vec![(value, root)], storage.empty_set());
    }

    root
}

/// Returns a KDD containing all maps of the given iterator.
pub fn from_iter<'a, K, V, I>(storage: &mut Storage<K, V>, iter: I) -> Kdd
    where K: Ord + Hash + Clone + 'a,
          V: Ord + Hash + Clone + 'a,
          I: Iterator<Item = &'a Vec<(K, V)>>
{
    let mut result = storage.empty_set();

    for map in iter
    {
        let single = singleton(storage, map);
        result = union(storage, result, single);
    }

    result
}

// Returns the union of the given KDDs.
pub fn union<K, V>(storage: &mut Storage<K, V>, a: Kdd, b: Kdd) -> Kdd
    where K: Ord + Hash + Clone,
          V: Ord + Hash + Clone
{
    if a == b {
        a
    } else if a == storage.empty_set() {
        b
    } else if b == storage.empty_set() {
        a
    } else {
        cache_comm_binary_op(storage, BinaryOperator::Union, a, b, union_nodes)
    }
}

fn union_nodes<K, V>(storage: &mut Storage<K, V>, a: Kdd, b: Kdd) -> Kdd
    where K: Ord + Hash + Clone,
          V: Ord + Hash + Clone
{
    // The empty map is not on any path of a node, so it ends up in the skip child.
    if a == storage.empty_map() {
        let Data(key, take, skip) = storage.get(b);
        let skip = union(storage, a, skip);
        return storage.node(key, take, skip);
    } else if b == storage.empty_map() {
        return union_nodes(storage, b, a);
    }

    let Data(a_key, a_take, a_skip) = storage.get(a);
    let Data(b_key, b_take, b_skip) = storage.get(b);

    match a_key.cmp(&b_key) {
        Ordering::Less => {
            let skip = union(storage, a_skip, b);
            storage.node(a_key, a_take, skip)
        },
        Ordering::Equal => {
            let mut take = Vec::with_capacity(a_take.len().max(b_take.len()));
            for (value, a_child, b_child) in merge(a_take, b_take)
            {
                let child = match (a_child, b_child) {
                    (Some(x), Some(y)) => union(storage, x, y),
                    (Some(x), None) | (None, Some(x)) => x,
                    (None, None) => unreachable!("merge yields at least one child"),
                };
                take.push((value, child));
            }

            let skip = union(storage, a_skip, b_skip);
            storage.node(a_key, take, skip)
        },
        Ordering::Greater => {
            let skip = union(storage, a, b_skip);
            storage.node(b_key, b_take, skip)
        }
    }
}

/// Returns the join of the given KDDs.
///
/// The join contains m1 + m2 for every m1 in a and m2 in b that agree on every
/// key present in both maps. Keys present in only one of the two maps are
/// copied unchanged, pairs that disagree on a shared key are dropped.
pub fn join<K, V>(storage: &mut Storage<K, V>, a: Kdd, b: Kdd) -> Kdd
    where K: Ord + Hash + Clone,
          V: Ord + Hash + Clone
{
    if a == storage.empty_set() || b == storage.empty_set() {
        storage.empty_set()
    } else if a == storage.empty_map() {
        b
    } else if b == storage.empty_map() {
        a
    } else {
        cache_comm_binary_op(storage, BinaryOperator::Join, a, b, join_nodes)
    }
}

fn join_nodes<K, V>(storage: &mut Storage<K, V>, a: Kdd, b: Kdd) -> Kdd
    where K: Ord + Hash + Clone,
          V: Ord + Hash + Clone
{
    let Data(a_key, a_take, a_skip) = storage.get(a);
    let Data(b_key, b_take, b_skip) = storage.get(b);

    match a_key.cmp(&b_key) {
        Ordering::Less => {
            // No map of b has the key a_key, so every branch of a is kept.
            let mut take = Vec::with_capacity(a_take.len());
            for (value, child) in a_take
            {
                take.push((value, join(storage, child, b)));
            }

            let skip = join(storage, a_skip, b);
            storage.node(a_key, take, skip)
        },
        Ordering::Equal => {
            let mut take = Vec::with_capacity(a_take.len().max(b_take.len()));
            for (value, a_child, b_child) in merge(a_take, b_take)
            {
                let mut child = storage.empty_set();
                if let (Some(x), Some(y)) = (a_child, b_child) {
                    let both = join(storage, x, y);
                    child = union(storage, child, both);
                }

                // Maps that bind the key on one side only.
                if let Some(x) = a_child {
                    let left = join(storage, x, b_skip);
                    child = union(storage, child, left);
                }

                if let Some(y) = b_child {
                    let right = join(storage, a_skip, y);
                    child = union(storage, child, right);
                }

                take.push((value, child));
            }

            let skip = join(storage, a_skip, b_skip);
            storage.node(a_key, take, skip)
        },
        Ordering::Greater => join_nodes(storage, b, a),
    }
}

/// Removes every map of a for which the predicate does not hold.
///
/// The predicate is called once per path prefix as soon as all of the given
/// keys are bound, with the bound (key, value) pairs in key order. The rest of
/// that path is kept or removed as a whole. When a path can no longer bind
/// the remaining keys the predicate is called with the keys bound so far.
pub fn filter<K, V, E, F>(storage: &mut Storage<K, V>, a: Kdd, keys: &[K], predicate: F) -> Result<Kdd, E>
    where K: Ord + Hash + Clone,
          V: Ord + Hash + Clone,
          F: FnMut(&[(K, V)]) -> Result<bool, E>
{
    let mut filter = Filter {
        keys,
        predicate,
        assignment: Vec::new(),
        cache: FxHashMap::default(),
    };

    filter.apply(storage, a)
}

// The filter is a homomorphism with its own cache, since its result depends on the assignment of the path.
struct Filter<'a, K, V, F>
{
    keys: &'a [K],
    predicate: F,
    assignment: Vec<(K, V)>,
    cache: FxHashMap<(usize, Vec<(K, V)>), Kdd>,
}

impl<K, V, E, F> Filter<'_, K, V, F>
    where K: Ord + Hash + Clone,
          V: Ord + Hash + Clone,
          F: FnMut(&[(K, V)]) -> Result<bool, E>
{
    fn apply(&mut self, storage: &mut Storage<K, V>, a: Kdd) -> Result<Kdd, E>
    {
        if a == storage.empty_set() {
            return Ok(a);
        }

        let cache_key = (a.index(), self.assignment.clone());
        if let Some(result) = self.cache.get(&cache_key) {
            return Ok(*result);
        }

        let result = if storage.is_terminal(a) || self.decided(storage.key(a)) {
            if (self.predicate)(&self.assignment)? {
                a
            } else {
                storage.empty_set()
            }
        } else {
            let Data(key, take, skip) = storage.get(a);
            let bound = self.keys.contains(&key);

            let mut new_take = Vec::with_capacity(take.len());
            for (value, child) in take
            {
                if bound {
                    self.assignment.push((key.clone(), value.clone()));
                }

                let result = self.apply(storage, child);

                if bound {
                    self.assignment.pop();
                }

                new_take.push((value, result?));
            }

            let new_skip = self.apply(storage, skip)?;
            storage.node(key, new_take, new_skip)
        };

        self.cache.insert(cache_key, result);
        Ok(result)
    }

    // True iff no key that is still unbound can occur at or below a node with the given key.
    fn decided(&self, key: &K) -> bool
    {
        self.keys.iter().all(|k| k < key || self.assignment.iter().any(|(bound, _)| bound == k))
    }
}

// Returns the number of maps in the given KDD.
pub fn len<K, V>(storage: &mut Storage<K, V>, a: Kdd) -> usize
    where K: Ord + Hash + Clone,
          V: Ord + Hash + Clone
{
    if a == storage.empty_set() {
        0
    } else if a == storage.empty_map() {
        1
    } else {
        cache_unary_function(storage, UnaryFunction::Len, a, |storage, a| {
            let children: Vec<Kdd> = storage.take(a).iter().map(|(_, child)| *child).collect();
            let skip = storage.skip(a);

            children.into_iter().map(|child| len(storage, child)).sum::<usize>() + len(storage, skip)
        })
    }
}

// Returns true iff the given map is included in the KDD.
pub fn contains<K, V>(storage: &Storage<K, V>, a: Kdd, map: &[(K, V)]) -> bool
    where K: Ord + Hash + Clone,
          V: Ord + Hash + Clone
{
    let mut entries = map.to_vec();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    contains_sorted(storage, a, &entries)
}

fn contains_sorted<K, V>(storage: &Storage<K, V>, a: Kdd, entries: &[(K, V)]) -> bool
    where K: Ord + Hash + Clone,
          V: Ord + Hash + Clone
{
    if a == storage.empty_set() {
        return false;
    } else if a == storage.empty_map() {
        return entries.is_empty();
    }

    let key = storage.key(a);
    match entries.first() {
        Some((first, value)) if first == key => {
            match storage.take(a).binary_search_by(|(v, _)| v.cmp(value)) {
                Ok(position) => contains_sorted(storage, storage.take(a)[position].1, &entries[1..]),
                Err(_) => false,
            }
        },
        // The key cannot occur anywhere below this node.
        Some((first, _)) if first < key => false,
        _ => contains_sorted(storage, storage.skip(a), entries),
    }
}

// Merges two take lists that are sorted by value into (value, left child, right child) triples.
fn merge<V: Ord>(a: Vec<(V, Kdd)>, b: Vec<(V, Kdd)>) -> Vec<(V, Option<Kdd>, Option<Kdd>)>
{
    let mut result = Vec::with_capacity(a.len() + b.len());
    let mut a = a.into_iter().peekable();
    let mut b = b.into_iter().peekable();

    loop
    {
        let order = match (a.peek(), b.peek()) {
            (Some((x, _)), Some((y, _))) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };

        match order {
            Ordering::Less => {
                if let Some((value, child)) = a.next() {
                    result.push((value, Some(child), None));
                }
            },
            Ordering::Equal => {
                if let (Some((value, x)), Some((_, y))) = (a.next(), b.next()) {
                    result.push((value, Some(x), Some(y)));
                }
            },
            Ordering::Greater => {
                if let Some((value, child)) = b.next() {
                    result.push((value, None, Some(child)));
                }
            }
        }
    }

    result
}
