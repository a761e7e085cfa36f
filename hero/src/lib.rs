//! # Hero
//!
//! A library to compute the state space of Hero nets. Hero nets are high-level
//! Petri nets where the arcs are inscribed with variables, constants and
//! expressions over multisets of tokens, and where transitions carry equality
//! guards.

//! # Bindings
//!
//! The difficult part of the state space exploration is computing all enabled
//! bindings of a transition at a marking. Instead of trying every combination
//! of tokens we build a keyed decision diagram (see the kdd crate) of the
//! bindings. First the net is simplified by [optimize()] and
//! [optimize_for_marking], then one diagram per input place is built, these
//! are joined, filtered by the guards and finally joined with the diagrams of
//! the places that the guards cannot constrain.
//!
//! All state is kept in a [Session], there is no global state.

mod value;
mod multiset;
mod error;
mod inscription;
mod expression;
mod net;
mod marking;
mod key;
mod optimize;
mod binding;
mod firing;
mod reachability;
mod session;

#[cfg(test)]
mod test_utility;


pub use value::*;
pub use multiset::*;
pub use error::*;
pub use inscription::*;
pub use expression::*;
pub use net::*;
pub use marking::*;
pub use key::*;
pub use optimize::*;
pub use binding::*;
pub use firing::*;
pub use reachability::*;
pub use session::*;
