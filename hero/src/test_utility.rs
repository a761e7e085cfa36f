use crate::{ArcSpec, Binding, Evaluator, Guard, Inscription, Label, Marking, Multiset, Net, NetBuilder, Value, Variable};

use std::collections::BTreeSet;

use rand::Rng;

// These functions are only relevant for testing purposes.

/// Returns every binding of the input variables of the transition that satisfies the token and guard constraints, by trying all combinations.
pub fn brute_force_bindings<P: Label, T: Label>(net: &Net<P, T>, transition: &T, marking: &Marking<P>, evaluator: &mut impl Evaluator) -> BTreeSet<Binding>
{
    let variables = net.input_variables(transition);
    let arcs = net.input(transition).cloned().unwrap_or_default();

    // The candidates of a variable are the tokens of the places where it occurs.
    let domains: Vec<Vec<Value>> = variables.iter().map(|variable| {
        let mut domain = BTreeSet::new();
        for (place, inscriptions) in arcs.iter()
        {
            if inscriptions.contains(&Inscription::Variable(variable.clone())) {
                domain.extend(marking[place].distinct().cloned());
            }
        }
        domain.into_iter().collect()
    }).collect();

    let mut result = BTreeSet::new();
    if domains.iter().any(|domain| domain.is_empty()) {
        return result;
    }

    let mut positions = vec![0; variables.len()];
    loop
    {
        let binding: Binding = variables.iter()
            .zip(positions.iter())
            .zip(domains.iter())
            .map(|((variable, position), domain)| (variable.clone(), domain[*position].clone()))
            .collect();

        let available = arcs.iter().all(|(place, inscriptions)| {
            let tokens: Multiset<Value> = inscriptions.iter()
                .map(|inscription| inscription.evaluate(&binding, evaluator).unwrap())
                .collect();
            tokens.is_subset(&marking[place])
        });

        if available && net.guards(transition).iter().all(|guard| guard.holds(&binding, evaluator).unwrap()) {
            result.insert(binding);
        }

        // Advance to the next combination, or stop after the last one.
        let mut index = 0;
        loop
        {
            if index == positions.len() {
                return result;
            }

            positions[index] += 1;
            if positions[index] < domains[index].len() {
                break;
            }

            positions[index] = 0;
            index += 1;
        }
    }
}

/// Restricts the binding to the given variables.
pub fn restrict(binding: &Binding, variables: &[Variable]) -> Binding
{
    binding.iter()
        .filter(|(variable, _)| variables.contains(variable))
        .map(|(variable, value)| (variable.clone(), value.clone()))
        .collect()
}

/// Returns a multiset of integer tokens.
pub fn tokens(values: &[i64]) -> Multiset<Value>
{
    values.iter().map(|value| Value::Int(*value)).collect()
}

const VARIABLES: [&str; 4] = ["a", "b", "c", "d"];
const PLACES: [&str; 3] = ["p1", "p2", "p3"];

/// Returns a net with a single transition "t" that has random input arcs and guards over the variables a, b, c and d.
pub fn random_net() -> Net<&'static str, &'static str>
{
    let mut rng = rand::thread_rng();

    let mut arcs = Vec::new();
    let mut used: Vec<&str> = Vec::new();
    for place in PLACES
    {
        if !rng.gen_bool(0.8) {
            continue;
        }

        let mut inscriptions = Vec::new();
        for _ in 0..rng.gen_range(1..=3)
        {
            if rng.gen_bool(0.2) {
                inscriptions.push(Inscription::constant(rng.gen_range(0..3i64)));
            } else {
                let name = VARIABLES[rng.gen_range(0..VARIABLES.len())];
                if !used.contains(&name) {
                    used.push(name);
                }
                inscriptions.push(Inscription::var(name));
            }
        }

        arcs.push(ArcSpec::input(place, inscriptions));
    }

    // Guards only refer to variables that are bound by the input arcs.
    let mut guards = Vec::new();
    if !used.is_empty() {
        for _ in 0..rng.gen_range(0..=2)
        {
            let x = used[rng.gen_range(0..used.len())];
            let y = used[rng.gen_range(0..used.len())];

            guards.push(match rng.gen_range(0..3) {
                0 => Guard::new(Inscription::var(x), Inscription::var(y)),
                1 => Guard::new(Inscription::var(x), Inscription::constant(rng.gen_range(0..3i64))),
                _ => Guard::new(Inscription::expr(format!("{} + {}", x, y)), Inscription::expr(format!("{} * 2", y))),
            });
        }
    }

    NetBuilder::new(PLACES)
        .transition("t", arcs, guards)
        .build()
        .unwrap()
}

/// Returns a random marking of the places of [random_net] with values from 0..max_value.
pub fn random_marking(net: &Net<&'static str, &'static str>, max_value: i64) -> Marking<&'static str>
{
    let mut rng = rand::thread_rng();

    net.marking(PLACES.iter().map(|place| {
        let amount = rng.gen_range(0..5);
        (*place, (0..amount).map(|_| Value::Int(rng.gen_range(0..max_value))).collect())
    })).unwrap()
}

/// The net of the binding scenario: t1 takes [x, y] from p1 and [z] from p2 under the guard x = z.
pub fn guarded_net() -> Net<&'static str, &'static str>
{
    NetBuilder::new(["p1", "p2", "p3"])
        .transition("t1", vec![
            ArcSpec::input("p1", vec![Inscription::var("x"), Inscription::var("y")]),
            ArcSpec::input("p2", vec![Inscription::var("z")]),
        ], vec![Guard::new(Inscription::var("x"), Inscription::var("z"))])
        .build()
        .unwrap()
}

/// The net where t1 moves a token x from p1 to p2 as [x, x] and t2 moves it back.
pub fn loop_net() -> Net<&'static str, &'static str>
{
    NetBuilder::new(["p1", "p2"])
        .transition("t1", vec![
            ArcSpec::input("p1", vec![Inscription::var("x")]),
            ArcSpec::output("p2", vec![Inscription::var("x"), Inscription::var("x")]),
        ], vec![])
        .transition("t2", vec![
            ArcSpec::input("p2", vec![Inscription::var("x"), Inscription::var("x")]),
            ArcSpec::output("p1", vec![Inscription::var("x")]),
        ], vec![])
        .build()
        .unwrap()
}
