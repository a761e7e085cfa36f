use crate::{Kdd, Storage, operations::*};

use std::collections::HashSet;

use rand::Rng;

// These functions are only relevant for testing purposes.

/// Returns a map over a random subset of the keys 0..keys with values from 0..max_value.
pub fn random_map(keys: u64, max_value: u64) -> Vec<(u64, u64)>
{
    let mut rng = rand::thread_rng();
    let mut map: Vec<(u64, u64)> = Vec::new();
    for key in 0..keys
    {
        if rng.gen_bool(0.7) {
            map.push((key, rng.gen_range(0..max_value)));
        }
    }

    map
}

/// Returns a map over exactly the given keys with values from 0..max_value.
pub fn random_total_map(keys: &[u64], max_value: u64) -> Vec<(u64, u64)>
{
    let mut rng = rand::thread_rng();
    keys.iter().map(|key| (*key, rng.gen_range(0..max_value))).collect()
}

/// Returns a set of 'amount' random maps over the keys 0..keys.
pub fn random_map_set(amount: u64, keys: u64, max_value: u64) -> HashSet<Vec<(u64, u64)>>
{
    let mut result: HashSet<Vec<(u64, u64)>> = HashSet::new();

    // Insert 'amount' number of maps into the result.
    for _ in 0..amount
    {
        result.insert(random_map(keys, max_value));
    }

    result
}

/// Returns a set of 'amount' random maps over exactly the given keys.
pub fn random_total_map_set(amount: u64, keys: &[u64], max_value: u64) -> HashSet<Vec<(u64, u64)>>
{
    (0..amount).map(|_| random_total_map(keys, max_value)).collect()
}

/// Returns a KDD containing all maps of the given set.
pub fn from_set(storage: &mut Storage<u64, u64>, set: &HashSet<Vec<(u64, u64)>>) -> Kdd
{
    from_iter(storage, set.iter())
}

/// Returns m1 + m2 iff the two maps agree on their shared keys, the result is sorted by key.
pub fn join_maps(a: &[(u64, u64)], b: &[(u64, u64)]) -> Option<Vec<(u64, u64)>>
{
    let mut result = a.to_vec();
    for (key, value) in b
    {
        match a.iter().find(|(k, _)| k == key) {
            Some((_, v)) if v != value => return None,
            Some(_) => {},
            None => result.push((*key, *value)),
        }
    }

    result.sort();
    Some(result)
}
