//! # KDD
//!
//! A library to create and manipulate keyed decision diagrams, abbreviated as
//! KDDs. Keyed decision diagrams are data structures that can efficiently
//! represent families of finite maps from ordered keys to values, i.e., sets of
//! partial assignments such as the bindings of a transition.

//! # Representation
//!
//! A KDD is inductively defined as follows. First of all, constants 'empty
//! set' and 'empty map' are two distinct KDDs. Given a key k, a list of pairs
//! (value, KDD) called take and a KDD skip, then node(k, take, skip) is a KDD.
//! Every key occurring below a node must be strictly greater than the key of
//! that node, so along every path the keys appear in the one global order.
//!
//! Given a KDD n then \[n\] is inductively defined as:
//!   - \[empty set\] = {}
//!   - \[empty map\] = { {} }
//!   - \[node(k, take, skip)\] = { {k: v} + m | (v, c) in take, m in \[c\] }
//!     union \[skip\]
//!
//! Nodes are maximally shared: two KDDs represent the same family iff their
//! handles are equal. Operations such as [union], [join] and [filter] are
//! memoized on these handles.

mod storage;
mod operations;
mod format;
mod iterators;

#[cfg(test)]
mod test_utility;

#[cfg(test)]
mod tests;

pub use storage::*;
pub use operations::*;
pub use format::*;
pub use iterators::*;
