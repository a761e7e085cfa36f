use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{EvaluationError, Evaluator, Guard, Variable};

/// The variable order of one transition, stored as the set of facts "a is ordered before b".
///
/// The order is frozen once it is computed, all keys of the transition share it.
pub struct KeyOrder
{
    sequence: Vec<Variable>,
    before: FxHashMap<Variable, FxHashSet<Variable>>,
}

impl KeyOrder
{
    /// Freezes the given sequence, the first variable is the smallest.
    pub fn new(sequence: Vec<Variable>) -> Self
    {
        let mut before: FxHashMap<Variable, FxHashSet<Variable>> = FxHashMap::default();
        for (index, variable) in sequence.iter().enumerate()
        {
            before.insert(variable.clone(), sequence[index + 1..].iter().cloned().collect());
        }

        KeyOrder { sequence, before }
    }

    /// Returns the variables from smallest to largest.
    pub fn sequence(&self) -> &[Variable]
    {
        &self.sequence
    }

    /// Returns true iff the fact "a before b" holds.
    pub fn is_before(&self, a: &Variable, b: &Variable) -> bool
    {
        self.before.get(a).is_some_and(|after| after.contains(b))
    }
}

impl PartialEq for KeyOrder
{
    fn eq(&self, other: &Self) -> bool
    {
        self.sequence == other.sequence
    }
}

impl Eq for KeyOrder {}

impl Hash for KeyOrder
{
    fn hash<H: Hasher>(&self, state: &mut H)
    {
        self.sequence.hash(state);
    }
}

impl fmt::Debug for KeyOrder
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_list().entries(self.sequence.iter()).finish()
    }
}

/// A variable that indexes a level of a decision diagram.
///
/// Keys compare through the facts of their order, not by the name of the
/// variable. Keys of different orders are never equal, so diagrams built for
/// different variable orders do not share nodes.
#[derive(Clone)]
pub struct Key
{
    variable: Variable,
    order: Rc<KeyOrder>,
}

impl Key
{
    pub fn new(variable: Variable, order: Rc<KeyOrder>) -> Self
    {
        Key { variable, order }
    }

    pub fn variable(&self) -> &Variable
    {
        &self.variable
    }

    pub fn order(&self) -> &Rc<KeyOrder>
    {
        &self.order
    }

    fn same_order(&self, other: &Key) -> bool
    {
        Rc::ptr_eq(&self.order, &other.order) || self.order == other.order
    }
}

impl PartialEq for Key
{
    fn eq(&self, other: &Self) -> bool
    {
        self.variable == other.variable && self.same_order(other)
    }
}

impl Eq for Key {}

impl Hash for Key
{
    fn hash<H: Hasher>(&self, state: &mut H)
    {
        self.variable.hash(state);
    }
}

impl Ord for Key
{
    fn cmp(&self, other: &Self) -> Ordering
    {
        if !self.same_order(other) {
            return self.order.sequence.cmp(&other.order.sequence)
                .then_with(|| self.variable.cmp(&other.variable));
        }

        if self.variable == other.variable {
            Ordering::Equal
        } else if self.order.is_before(&self.variable, &other.variable) {
            Ordering::Less
        } else if self.order.is_before(&other.variable, &self.variable) {
            Ordering::Greater
        } else {
            // Variables outside of the order come last, by name.
            let known = |key: &Key| key.order.before.contains_key(&key.variable);
            known(other).cmp(&known(self)).then_with(|| self.variable.cmp(&other.variable))
        }
    }
}

impl PartialOrd for Key
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering>
    {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Key
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.variable)
    }
}

impl fmt::Display for Key
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.variable)
    }
}

/// Computes the variable order of a transition.
///
/// Every guard that refers to n distinct variables adds `2 << (n - 1)` to the
/// weight of each of them. Variables are sorted by increasing weight, and
/// variables of equal weight keep their declaration order: the given input
/// variables first, then the variables that only occur in guards.
pub fn order(input_variables: &[Variable], guards: &[Guard], evaluator: &mut impl Evaluator) -> Result<Rc<KeyOrder>, EvaluationError>
{
    let mut declared: Vec<Variable> = input_variables.to_vec();
    let mut weights: FxHashMap<Variable, u64> = FxHashMap::default();

    for guard in guards
    {
        let variables = guard.variables(evaluator)?;
        if variables.is_empty() {
            continue;
        }

        let penalty = 2u64 << (variables.len() - 1).min(62);
        for variable in variables
        {
            let weight = weights.entry(variable.clone()).or_default();
            *weight = weight.saturating_add(penalty);
            if !declared.contains(&variable) {
                declared.push(variable);
            }
        }
    }

    // The sort is stable, which keeps the declaration order for equal weights.
    declared.sort_by_key(|variable| weights.get(variable).copied().unwrap_or(0));
    Ok(Rc::new(KeyOrder::new(declared)))
}
