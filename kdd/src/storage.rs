use std::hash::Hash;

use rustc_hash::FxHashMap;

mod cache;
mod kdd;

pub use cache::*;
pub use kdd::*;

// This is the KDD node(key, take, skip). The take list is sorted by value and never contains the empty set.
#[derive(Clone, PartialEq, Eq, Hash)]
struct Node<K, V>
{
    key: K,
    take: Vec<(V, Kdd)>,
    skip: Kdd,
}

/// The contents of a node: its key, the (value, child) branches and the skip child.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Data<K, V>(pub K, pub Vec<(V, Kdd)>, pub Kdd);

// The storage that implements the maximal sharing behaviour. Meaning that identical nodes (same key, take and skip) have a unique index in the node table. Therefore Kdds n and m are identical iff their indices match.
pub struct Storage<K, V>
{
    index: FxHashMap<Node<K, V>, usize>,
    table: Vec<Option<Node<K, V>>>,
    cache: OperationCache,
}

impl<K, V> Storage<K, V>
    where K: Ord + Hash + Clone,
          V: Ord + Hash + Clone
{
    pub fn new() -> Self
    {
        Self {
            index: FxHashMap::default(),
            // Two slots representing 'empty set' and 'empty map' respectively; these cannot be created using node.
            table: vec![None, None],
            cache: OperationCache::new(),
        }
    }

    /// Create (or find) the node(key, take, skip).
    ///
    /// Branches leading to the empty set are dropped and the remaining branches
    /// are sorted by value. A node without any branch represents exactly the
    /// maps of skip, so skip itself is returned in that case.
    pub fn node(&mut self, key: K, mut take: Vec<(V, Kdd)>, skip: Kdd) -> Kdd
    {
        take.retain(|(_, child)| *child != self.empty_set());
        if take.is_empty() {
            return skip;
        }

        take.sort_by(|(a, _), (b, _)| a.cmp(b));
        debug_assert!(take.windows(2).all(|pair| pair[0].0 != pair[1].0), "Values of a node must be unique.");
        debug_assert!(take.iter().map(|(_, child)| *child).chain(std::iter::once(skip)).all(
            |child| self.is_terminal(child) || *self.key(child) > key
        ), "Keys must strictly increase towards the terminals.");

        let new_node = Node { key, take, skip };
        if let Some(index) = self.index.get(&new_node) {
            return Kdd::new(*index);
        }

        self.table.push(Some(new_node.clone()));
        let index = self.table.len() - 1;
        self.index.insert(new_node, index);
        Kdd::new(index)
    }

    // The 'false' KDD.
    pub fn empty_set(&self) -> Kdd
    {
        Kdd::new(0)
    }

    // The 'true' KDD.
    pub fn empty_map(&self) -> Kdd
    {
        Kdd::new(1)
    }

    /// Returns true iff the given KDD is one of the two terminals.
    pub fn is_terminal(&self, kdd: Kdd) -> bool
    {
        kdd.index() < 2
    }

    /// Returns the key of a non-terminal KDD.
    pub fn key(&self, kdd: Kdd) -> &K
    {
        &self.node_ref(kdd).key
    }

    /// Returns the branches of a non-terminal KDD.
    pub fn take(&self, kdd: Kdd) -> &[(V, Kdd)]
    {
        &self.node_ref(kdd).take
    }

    /// Returns the skip child of a non-terminal KDD.
    pub fn skip(&self, kdd: Kdd) -> Kdd
    {
        self.node_ref(kdd).skip
    }

    pub fn get(&self, kdd: Kdd) -> Data<K, V>
    {
        let node = self.node_ref(kdd);
        Data(node.key.clone(), node.take.clone(), node.skip)
    }

    /// Returns the number of nodes in the table, excluding the two terminals.
    pub fn node_count(&self) -> usize
    {
        self.table.len() - 2
    }

    pub fn operation_cache(&mut self) -> &mut OperationCache
    {
        &mut self.cache
    }

    /// Returns the operation cache, for its size and statistics.
    pub fn cache(&self) -> &OperationCache
    {
        &self.cache
    }

    /// Clear the operation caches, the node table is left untouched.
    pub fn clear_caches(&mut self)
    {
        self.cache.clear();
    }

    fn node_ref(&self, kdd: Kdd) -> &Node<K, V>
    {
        match &self.table[kdd.index()] {
            Some(node) => node,
            None => panic!("Terminal {:?} has no key or branches.", kdd),
        }
    }
}

impl<K, V> Default for Storage<K, V>
    where K: Ord + Hash + Clone,
          V: Ord + Hash + Clone
{
    fn default() -> Self
    {
        Self::new()
    }
}
