use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::{Kdd, Storage};

/// The operation cache can significantly speed up operations by caching
/// intermediate results. This is necessary since the maximal sharing means that
/// the same inputs can be encountered many times while evaluating the
/// operations.
///
/// For all operations defined in `operations.rs` where caching helps we
/// introduce a cache. The cache that belongs to one operation is identified by
/// the value of [UnaryFunction] or [BinaryOperator]. Since nodes are never
/// removed from the storage the cached results stay valid, clearing only
/// releases memory.
pub struct OperationCache
{
    caches1: Vec<FxHashMap<usize, usize>>,
    caches2: Vec<FxHashMap<(usize, usize), usize>>,
    hits: u64,
    misses: u64,
}

/// Any function from KDD -> usize.
pub enum UnaryFunction
{
    Len,
}

/// Any operator from KDD x KDD -> KDD.
pub enum BinaryOperator
{
    Union,
    Join,
}

impl OperationCache
{
    pub fn new() -> OperationCache
    {
        OperationCache {
            caches1: vec![FxHashMap::default()],
            caches2: vec![FxHashMap::default(); 2],
            hits: 0,
            misses: 0,
        }
    }

    /// Clear all existing caches.
    pub fn clear(&mut self)
    {
        for cache in self.caches1.iter_mut() {
            cache.clear();
        }

        for cache in self.caches2.iter_mut() {
            cache.clear();
        }
    }

    /// Returns the number of cache hits and misses since the cache was created.
    pub fn statistics(&self) -> (u64, u64)
    {
        (self.hits, self.misses)
    }

    /// Returns the total number of cached results.
    pub fn len(&self) -> usize
    {
        self.caches1.iter().map(|cache| cache.len()).sum::<usize>()
            + self.caches2.iter().map(|cache| cache.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }

    fn get_cache1(&mut self, operator: &UnaryFunction) -> &mut FxHashMap<usize, usize>
    {
        match operator {
            UnaryFunction::Len => &mut self.caches1[0],
        }
    }

    fn get_cache2(&mut self, operator: &BinaryOperator) -> &mut FxHashMap<(usize, usize), usize>
    {
        match operator {
            BinaryOperator::Union => &mut self.caches2[0],
            BinaryOperator::Join => &mut self.caches2[1],
        }
    }

    fn lookup1(&mut self, operator: &UnaryFunction, key: usize) -> Option<usize>
    {
        let result = self.get_cache1(operator).get(&key).copied();
        self.record(result.is_some());
        result
    }

    fn lookup2(&mut self, operator: &BinaryOperator, key: (usize, usize)) -> Option<usize>
    {
        let result = self.get_cache2(operator).get(&key).copied();
        self.record(result.is_some());
        result
    }

    fn record(&mut self, hit: bool)
    {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }
}

impl Default for OperationCache
{
    fn default() -> Self
    {
        Self::new()
    }
}

/// Implements an operation cache for a unary KDD operator.
pub fn cache_unary_function<K, V, F>(storage: &mut Storage<K, V>, operator: UnaryFunction, a: Kdd, f: F) -> usize
    where K: Ord + Hash + Clone,
          V: Ord + Hash + Clone,
          F: Fn(&mut Storage<K, V>, Kdd) -> usize
{
    let key = a.index();
    if let Some(result) = storage.operation_cache().lookup1(&operator, key)
    {
        result
    }
    else
    {
        let result = f(storage, a);
        storage.operation_cache().get_cache1(&operator).insert(key, result);
        result
    }
}

/// Implements an operation cache for a binary KDD operator.
pub fn cache_binary_op<K, V, F>(storage: &mut Storage<K, V>, operator: BinaryOperator, a: Kdd, b: Kdd, f: F) -> Kdd
    where K: Ord + Hash + Clone,
          V: Ord + Hash + Clone,
          F: Fn(&mut Storage<K, V>, Kdd, Kdd) -> Kdd
{
    let key = (a.index(), b.index());
    if let Some(result) = storage.operation_cache().lookup2(&operator, key)
    {
        Kdd::new(result)
    }
    else
    {
        let result = f(storage, a, b);
        storage.operation_cache().get_cache2(&operator).insert(key, result.index());
        result
    }
}

/// Implements an operation cache for a commutative binary KDD operator, i.e.,
/// an operator f such that f(a,b) = f(b,a) for all KDD a and b.
pub fn cache_comm_binary_op<K, V, F>(storage: &mut Storage<K, V>, operator: BinaryOperator, a: Kdd, b: Kdd, f: F) -> Kdd
    where K: Ord + Hash + Clone,
          V: Ord + Hash + Clone,
          F: Fn(&mut Storage<K, V>, Kdd, Kdd) -> Kdd
{
    // Reorder the inputs to improve caching behaviour (can potentially half the cache size)
    if a.index() < b.index() {
        cache_binary_op(storage, operator, a, b, f)
    } else {
        cache_binary_op(storage, operator, b, a, f)
    }
}
