use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use kdd::{Kdd, Storage};
use log::trace;

use crate::{order, optimize_for_marking, Binding, Error, EvaluationError, Evaluator, Guard, Key, KeyOrder, Label, Marking, Multiset, Net, Value, Variable};

/// Returns the diagram of all enabled bindings of the transition at the marking.
///
/// A binding is enabled when the tokens it takes from every input place are
/// available and every guard holds. The net is normally optimized by
/// [crate::optimize()] first, the result is correct for any net however.
pub fn enabled_bindings<P: Label, T: Label>(
    storage: &mut Storage<Key, Value>,
    evaluator: &mut impl Evaluator,
    net: &Net<P, T>,
    transition: &T,
    marking: &Marking<P>,
) -> Result<Kdd, Error>
{
    let prepared = match optimize_for_marking(net, transition, marking)? {
        Some(prepared) => prepared,
        None => {
            trace!("Transition {:?} is disabled by a missing literal token.", transition);
            return Ok(storage.empty_set());
        }
    };

    // Every token of a place is a candidate value of its variables.
    if prepared.input.keys().any(|place| prepared.marking[place].is_empty()) {
        return Ok(storage.empty_set());
    }

    let guards = net.guards(transition);
    let mut guard_variables = Vec::with_capacity(guards.len());
    for guard in guards
    {
        let variables = guard.variables(evaluator)?;

        // A guard without variables holds everywhere or nowhere.
        if variables.is_empty() && !guard.holds(&Binding::new(), evaluator)? {
            return Ok(storage.empty_set());
        }
        guard_variables.push(variables);
    }

    let key_order = order(&net.input_variables(transition), guards, evaluator)?;

    let mut occurrences: BTreeMap<&Variable, usize> = BTreeMap::new();
    for variable in prepared.input.values().flatten()
    {
        *occurrences.entry(variable).or_default() += 1;
    }

    let guarded: BTreeSet<&Variable> = guard_variables.iter().flatten().collect();
    let independent = |variable: &Variable| occurrences.get(variable) == Some(&1) && !guarded.contains(variable);

    // Places that only carry independent variables cannot be constrained, they are joined after filtering.
    let mut result = storage.empty_map();
    let mut deferred = Vec::new();
    for (place, variables) in prepared.input.iter()
    {
        let chain = place_chain(storage, &key_order, variables, &prepared.marking[place]);
        if variables.iter().all(independent) {
            deferred.push(chain);
        } else {
            result = kdd::join(storage, result, chain);
        }
    }

    for (guard, variables) in guards.iter().zip(guard_variables.iter())
    {
        if variables.is_empty() || result == storage.empty_set() {
            continue;
        }

        result = apply_guard(storage, evaluator, &key_order, guard, variables, result)?;
    }

    for chain in deferred
    {
        result = kdd::join(storage, result, chain);
    }

    trace!("Transition {:?} has {} enabled bindings.", transition, kdd::len(storage, result));
    Ok(result)
}

/// Returns the bindings of the diagram, lazily and in a fixed order.
pub fn bindings(storage: &Storage<Key, Value>, kdd: Kdd) -> impl Iterator<Item = Binding> + '_
{
    kdd::iter(storage, kdd).map(|map| {
        map.into_iter().map(|(key, value)| (key.variable().clone(), value)).collect()
    })
}

// Removes the paths of the diagram on which the guard does not hold.
fn apply_guard(
    storage: &mut Storage<Key, Value>,
    evaluator: &mut impl Evaluator,
    key_order: &Rc<KeyOrder>,
    guard: &Guard,
    variables: &BTreeSet<Variable>,
    root: Kdd,
) -> Result<Kdd, EvaluationError>
{
    let mut keys: Vec<Key> = variables.iter().map(|variable| Key::new(variable.clone(), key_order.clone())).collect();
    keys.sort();

    kdd::filter(storage, root, &keys, |assignment: &[(Key, Value)]| {
        let binding: Binding = assignment.iter().map(|(key, value)| (key.variable().clone(), value.clone())).collect();
        guard.holds(&binding, evaluator)
    })
}

// Returns the diagram of the ways to take the variables of one arc from the tokens of its place.
//
// The chain branches on every distinct variable in key order. A variable that
// occurs c times on the arc can only take a value that is still available c
// times, and those c occurrences are no longer available further down.
fn place_chain(storage: &mut Storage<Key, Value>, key_order: &Rc<KeyOrder>, variables: &[Variable], tokens: &Multiset<Value>) -> Kdd
{
    let mut counts: BTreeMap<Key, usize> = BTreeMap::new();
    for variable in variables
    {
        *counts.entry(Key::new(variable.clone(), key_order.clone())).or_default() += 1;
    }

    let levels: Vec<(Key, usize)> = counts.into_iter().collect();
    chain(storage, &levels, tokens)
}

fn chain(storage: &mut Storage<Key, Value>, levels: &[(Key, usize)], tokens: &Multiset<Value>) -> Kdd
{
    match levels.split_first() {
        None => storage.empty_map(),
        Some(((key, count), rest)) => {
            let mut take = Vec::new();
            for (value, available) in tokens.iter()
            {
                if available >= count {
                    let mut remaining = tokens.clone();
                    remaining.remove(value, *count);
                    take.push((value.clone(), chain(storage, rest, &remaining)));
                }
            }

            let empty = storage.empty_set();
            storage.node(key.clone(), take, empty)
        }
    }
}
