//! Rewrites of a net that keep its enabled bindings but make them cheaper to compute.
//!
//! The static optimization only depends on the structure of the net and is
//! done once, see [optimize]. The dynamic optimization depends on the marking
//! and is done for every transition at every marking, see [optimize_for_marking].

mod dynamic;
mod propagation;

pub use dynamic::*;
pub use propagation::*;
