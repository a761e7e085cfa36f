use crate::{storage::Storage, operations::*, iterators::*, format::*, test_utility::*};

use std::collections::HashSet;

// Compare the KDD contains implementation for random inputs.
#[test]
fn random_contains()
{
    let mut storage = Storage::new();

    let set = random_map_set(32, 10, 5);
    let kdd = from_set(&mut storage, &set);

    // All elements in the set should be contained in the kdd.
    for expected in &set
    {
        assert!(contains(&storage, kdd, expected));
    }

    // Try random maps with both the set and kdd.
    for _ in 0..32
    {
        let map = random_map(10, 5);
        assert_eq!(set.contains(&map), contains(&storage, kdd, &map));
    }
}

// Compare the HashSet implementation of union with the KDD union implementation for random inputs.
#[test]
fn random_union()
{
    let mut storage = Storage::new();

    let set_a = random_map_set(32, 8, 4);
    let set_b = random_map_set(32, 8, 4);

    let a = from_set(&mut storage, &set_a);
    let b = from_set(&mut storage, &set_b);
    let result = union(&mut storage, a, b);

    for expected in set_a.union(&set_b)
    {
        assert!(contains(&storage, result, expected));
    }

    for map in iter(&storage, result)
    {
        assert!(set_a.contains(&map) || set_b.contains(&map));
    }

    assert_eq!(len(&mut storage, result), set_a.union(&set_b).count());
}

// Test the iterator implementation.
#[test]
fn random_iter()
{
    let mut storage = Storage::new();

    let set = random_map_set(32, 10, 5);
    let kdd = from_set(&mut storage, &set);

    // Check that the number of iterations matches the number of elements in the set.
    assert_eq!(iter(&storage, kdd).count(), set.len());
    assert_eq!(len(&mut storage, kdd), set.len());

    // Every iterated element must be in the set.
    for map in iter(&storage, kdd)
    {
        assert!(set.contains(&map));
    }

    // The iterator can be restarted and yields the same maps.
    let first: Vec<_> = iter(&storage, kdd).collect();
    let second: Vec<_> = iter(&storage, kdd).collect();
    assert_eq!(first, second);
}

// Compare the KDD join with the pairwise join of two random sets of partial maps.
#[test]
fn random_join()
{
    let mut storage = Storage::new();

    let set_a = random_map_set(16, 6, 3);
    let set_b = random_map_set(16, 6, 3);

    let a = from_set(&mut storage, &set_a);
    let b = from_set(&mut storage, &set_b);
    let result = join(&mut storage, a, b);

    let mut expected = HashSet::new();
    for x in &set_a
    {
        for y in &set_b
        {
            if let Some(map) = join_maps(x, y) {
                expected.insert(map);
            }
        }
    }

    let actual: HashSet<_> = iter(&storage, result).collect();
    assert_eq!(actual, expected);

    // The join is commutative and memoized on the unordered pair.
    assert_eq!(join(&mut storage, b, a), result);
}

// Joining maps over disjoint keys produces their product.
#[test]
fn join_disjoint_keys()
{
    let mut storage = Storage::new();

    let set_a = random_total_map_set(8, &[0, 2], 4);
    let set_b = random_total_map_set(8, &[1, 3], 4);

    let a = from_set(&mut storage, &set_a);
    let b = from_set(&mut storage, &set_b);
    let result = join(&mut storage, a, b);

    assert_eq!(len(&mut storage, result), set_a.len() * set_b.len());
}

#[test]
fn join_identities()
{
    let mut storage = Storage::new();

    let set = random_map_set(16, 6, 3);
    let a = from_set(&mut storage, &set);

    let empty_set = storage.empty_set();
    let empty_map = storage.empty_map();

    assert_eq!(join(&mut storage, a, empty_set), empty_set);
    assert_eq!(join(&mut storage, empty_set, a), empty_set);
    assert_eq!(join(&mut storage, a, empty_map), a);
    assert_eq!(join(&mut storage, empty_map, a), a);
}

// Identical families are represented by the same node.
#[test]
fn maximal_sharing()
{
    let mut storage = Storage::new();

    let set = random_map_set(32, 8, 4);
    let a = from_set(&mut storage, &set);

    let mut reversed: Vec<_> = set.iter().cloned().collect();
    reversed.reverse();
    let b = from_iter(&mut storage, reversed.iter());

    assert_eq!(a, b);

    let nodes = storage.node_count();
    let c = from_set(&mut storage, &set);
    assert_eq!(a, c);
    assert_eq!(storage.node_count(), nodes, "Rebuilding the same family must not create nodes.");
}

// Compare the filter with a direct evaluation of the predicate on every map.
#[test]
fn random_filter()
{
    let mut storage = Storage::new();

    let set = random_total_map_set(64, &[0, 1, 2, 3, 4], 5);
    let kdd = from_set(&mut storage, &set);

    // Keep the maps where the values of keys 1 and 3 sum to an even number.
    let keys = [1, 3];
    let mut calls = 0;
    let result = filter(&mut storage, kdd, &keys, |assignment: &[(u64, u64)]| -> Result<bool, ()> {
        calls += 1;
        assert_eq!(assignment.len(), 2);
        Ok((assignment[0].1 + assignment[1].1) % 2 == 0)
    }).unwrap();

    let expected: HashSet<_> = set.iter().filter(|map| (map[1].1 + map[3].1) % 2 == 0).cloned().collect();
    let actual: HashSet<_> = iter(&storage, result).collect();

    assert_eq!(actual, expected);
    assert!(calls <= set.len());
}

#[test]
fn filter_propagates_errors()
{
    let mut storage = Storage::new();

    let kdd = singleton(&mut storage, &[(0, 1), (1, 2)]);
    let result = filter(&mut storage, kdd, &[1], |_: &[(u64, u64)]| Err("broken"));

    assert_eq!(result, Err("broken"));
}

// A predicate over keys that no map binds is evaluated with an empty assignment.
#[test]
fn filter_without_bound_keys()
{
    let mut storage = Storage::new();

    let kdd = singleton(&mut storage, &[(0, 1), (1, 2)]);
    let result = filter(&mut storage, kdd, &[], |assignment: &[(u64, u64)]| -> Result<bool, ()> {
        Ok(assignment.is_empty())
    });

    assert_eq!(result, Ok(kdd));
}

#[test]
fn empty_map_in_union()
{
    let mut storage = Storage::new();

    let empty_map = storage.empty_map();
    let a = singleton(&mut storage, &[(3, 1)]);
    let result = union(&mut storage, a, empty_map);

    let maps: HashSet<_> = iter(&storage, result).collect();
    assert_eq!(maps, HashSet::from([vec![], vec![(3, 1)]]));
    assert!(contains(&storage, result, &[]));
}

#[test]
fn display()
{
    let mut storage = Storage::new();

    let kdd = singleton(&mut storage, &[(1, 7), (0, 4)]);
    assert_eq!(format!("{}", fmt_node(&storage, kdd)), "{\n{0: 4, 1: 7}\n}");
}

// The operation cache counts lookups, and clearing it does not change results.
#[test]
fn cache_statistics()
{
    let mut storage = Storage::new();

    let set_a = random_map_set(32, 8, 4);
    let set_b = random_map_set(32, 8, 4);

    let a = from_set(&mut storage, &set_a);
    let b = from_set(&mut storage, &set_b);
    let result = join(&mut storage, a, b);

    let (hits, misses) = storage.cache().statistics();
    assert!(misses > 0);
    assert!(!storage.cache().is_empty());

    // The same join is answered from the cache.
    assert_eq!(join(&mut storage, b, a), result);
    assert!(storage.cache().statistics().0 > hits);

    storage.clear_caches();
    assert!(storage.cache().is_empty());
    assert_eq!(join(&mut storage, a, b), result);
}

