use std::collections::BTreeMap;

use log::trace;

use crate::{is_identifier, Arcs, Binding, ConstantConflict, Error, EvaluationError, Evaluator, Guard, Inscription, Label, Net, Value, Variable};

/// A statically optimized net, together with the variables that the optimization eliminated.
#[derive(Clone, Debug)]
pub struct Optimized<P, T>
{
    pub net: Net<P, T>,
    // Per transition, the eliminated variables and their replacements in the order of elimination.
    eliminated: BTreeMap<T, Vec<(Variable, Inscription)>>,
}

impl<P: Label, T: Label> Optimized<P, T>
{
    /// Returns the eliminated variables of the transition and what they were replaced by.
    pub fn eliminated(&self, transition: &T) -> &[(Variable, Inscription)]
    {
        self.eliminated.get(transition).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Extends a binding of the optimized transition with the values of the eliminated variables.
    pub fn restore(&self, transition: &T, binding: &Binding, evaluator: &mut impl Evaluator) -> Result<Binding, EvaluationError>
    {
        let mut result = binding.clone();

        // A replacement can only refer to variables that were eliminated later, or that survived.
        for (variable, replacement) in self.eliminated(transition).iter().rev()
        {
            let value = replacement.evaluate(&result, evaluator)?;
            result.insert(variable.clone(), value);
        }

        Ok(result)
    }
}

/// Applies equality propagation and then constant propagation once to every transition.
///
/// A guard x = y between two variables is removed and x is replaced by y
/// everywhere in the transition. A guard x = v between a variable and a
/// constant is removed and x is replaced by v. Two guards that assign
/// different constants to one variable are a [ConstantConflict].
pub fn optimize<P: Label, T: Label>(net: &Net<P, T>, evaluator: &mut impl Evaluator) -> Result<Optimized<P, T>, Error>
{
    let mut result = net.clone();
    let mut eliminated = BTreeMap::new();

    for transition in net.transitions.iter()
    {
        let mut input = result.input.remove(transition).unwrap_or_default();
        let mut output = result.output.remove(transition).unwrap_or_default();
        let mut guards = result.guards.remove(transition).unwrap_or_default();
        let mut variables = Vec::new();

        let mut rewrite = Rewrite {
            input: &mut input,
            output: &mut output,
            guards: &mut guards,
            eliminated: &mut variables,
        };

        rewrite.propagate_equalities(evaluator)?;
        rewrite.propagate_constants(transition, evaluator)?;

        if !variables.is_empty() {
            trace!("Eliminated {} variables of transition {:?}.", variables.len(), transition);
        }

        result.input.insert(transition.clone(), input);
        result.output.insert(transition.clone(), output);
        result.guards.insert(transition.clone(), guards);
        eliminated.insert(transition.clone(), variables);
    }

    Ok(Optimized { net: result, eliminated })
}

/// Repeats [optimize] until the net no longer changes.
pub fn optimize_to_fixpoint<P: Label, T: Label>(net: &Net<P, T>, evaluator: &mut impl Evaluator) -> Result<Optimized<P, T>, Error>
{
    let mut current = optimize(net, evaluator)?;

    loop
    {
        let next = optimize(&current.net, evaluator)?;
        if next.net == current.net {
            return Ok(current);
        }

        for (transition, variables) in next.eliminated
        {
            current.eliminated.entry(transition).or_default().extend(variables);
        }
        current.net = next.net;
    }
}

// The parts of one transition that are rewritten.
struct Rewrite<'a, P>
{
    input: &'a mut Arcs<P>,
    output: &'a mut Arcs<P>,
    guards: &'a mut Vec<Guard>,
    eliminated: &'a mut Vec<(Variable, Inscription)>,
}

impl<P: Label> Rewrite<'_, P>
{
    fn propagate_equalities(&mut self, evaluator: &mut impl Evaluator) -> Result<(), Error>
    {
        // The substitution also applies to the guards that have not been examined yet.
        let mut index = 0;
        while index < self.guards.len()
        {
            let equality = match &self.guards[index] {
                Guard { left: Inscription::Variable(a), right: Inscription::Variable(b) } => Some((a.clone(), b.clone())),
                _ => None,
            };

            match equality {
                Some((a, b)) => {
                    self.guards.remove(index);

                    // Only identifiers can be written into expressions, so the other variable is eliminated.
                    let (a, b) = if is_identifier(a.name()) && !is_identifier(b.name()) { (b, a) } else { (a, b) };
                    if a != b {
                        self.substitute(a, Inscription::Variable(b), evaluator)?;
                    }
                },
                None => index += 1,
            }
        }

        Ok(())
    }

    fn propagate_constants<T: Label>(&mut self, transition: &T, evaluator: &mut impl Evaluator) -> Result<(), Error>
    {
        let mut constants: BTreeMap<Variable, Value> = BTreeMap::new();
        let mut remaining = Vec::with_capacity(self.guards.len());

        for guard in self.guards.drain(..)
        {
            let assignment = match (&guard.left, &guard.right) {
                (Inscription::Variable(variable), Inscription::Constant(value))
                | (Inscription::Constant(value), Inscription::Variable(variable)) => Some((variable.clone(), value.clone())),
                _ => None,
            };

            let (variable, value) = match assignment {
                Some(assignment) => assignment,
                None => {
                    remaining.push(guard);
                    continue;
                }
            };

            match constants.get(&variable) {
                Some(first) if *first != value => {
                    return Err(ConstantConflict {
                        transition: format!("{:?}", transition),
                        variable,
                        first: first.clone(),
                        second: value,
                    }.into());
                },
                Some(_) => {},
                None => {
                    constants.insert(variable, value);
                },
            }
        }

        *self.guards = remaining;
        for (variable, value) in constants
        {
            self.substitute(variable, Inscription::Constant(value), evaluator)?;
        }

        Ok(())
    }

    // Replaces the variable in all arcs and guards, and records the elimination.
    fn substitute(&mut self, variable: Variable, replacement: Inscription, evaluator: &mut impl Evaluator) -> Result<(), EvaluationError>
    {
        for inscription in self.input.values_mut().chain(self.output.values_mut()).flatten()
        {
            *inscription = inscription.substitute(&variable, &replacement, evaluator)?;
        }

        for guard in self.guards.iter_mut()
        {
            *guard = guard.substitute(&variable, &replacement, evaluator)?;
        }

        self.eliminated.push((variable, replacement));
        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    use crate::{ArcSpec, ExplorationConfig, Interpreter, Marking, Multiset, NetBuilder, Session};

    fn var(name: &str) -> Inscription
    {
        Inscription::var(name)
    }

    fn net(guards: Vec<Guard>) -> Net<&'static str, &'static str>
    {
        NetBuilder::new(["p1", "p2"])
            .transition("t1", vec![
                ArcSpec::input("p1", vec![var("a"), var("b")]),
                ArcSpec::input("p2", vec![var("c")]),
                ArcSpec::output("p2", vec![Inscription::expr("a + b + c")]),
            ], guards)
            .build()
            .unwrap()
    }

    #[test]
    fn equality_propagation()
    {
        let mut interpreter = Interpreter::new();
        let original = net(vec![Guard::new(var("a"), var("c"))]);
        let optimized = optimize(&original, &mut interpreter).unwrap();

        let input = optimized.net.input(&"t1").unwrap();
        assert_eq!(input[&"p1"], vec![var("c"), var("b")]);
        assert_eq!(input[&"p2"], vec![var("c")]);
        assert_eq!(optimized.net.output(&"t1").unwrap()[&"p2"], vec![Inscription::expr("((c + b) + c)")]);
        assert!(optimized.net.guards(&"t1").is_empty());

        // The input net is left untouched.
        assert_eq!(original.guards(&"t1").len(), 1);
    }

    #[test]
    fn constant_propagation()
    {
        let mut interpreter = Interpreter::new();
        let original = net(vec![
            Guard::new(Inscription::constant(4), var("b")),
            Guard::new(var("a"), Inscription::constant(3)),
            Guard::new(Inscription::expr("a + c"), Inscription::constant(10)),
        ]);
        let optimized = optimize(&original, &mut interpreter).unwrap();

        let input = optimized.net.input(&"t1").unwrap();
        assert_eq!(input[&"p1"], vec![Inscription::constant(3), Inscription::constant(4)]);
        assert_eq!(optimized.net.guards(&"t1"), &[Guard::new(Inscription::expr("(3 + c)"), Inscription::constant(10))]);

        let restored = optimized.restore(&"t1", &Binding::from([(Variable::new("c"), Value::Int(7))]), &mut interpreter).unwrap();
        assert_eq!(restored[&Variable::new("a")], Value::Int(3));
        assert_eq!(restored[&Variable::new("b")], Value::Int(4));
    }

    #[test]
    fn constant_conflict()
    {
        let mut interpreter = Interpreter::new();
        let original = net(vec![
            Guard::new(var("a"), Inscription::constant(3)),
            Guard::new(var("a"), Inscription::constant(5)),
        ]);

        match optimize(&original, &mut interpreter) {
            Err(Error::ConstantConflict(conflict)) => {
                assert_eq!(conflict.variable, Variable::new("a"));
                assert_eq!((conflict.first, conflict.second), (Value::Int(3), Value::Int(5)));
            },
            other => panic!("Expected a constant conflict, found {:?}", other.map(|o| o.net)),
        }

        // Equal constants are not a conflict.
        let same = net(vec![
            Guard::new(var("a"), Inscription::constant(3)),
            Guard::new(Inscription::constant(3), var("a")),
        ]);
        assert!(optimize(&same, &mut interpreter).is_ok());
    }

    // Conflicts are also found when equality propagation merges two variables first.
    #[test]
    fn constant_conflict_after_equality()
    {
        let mut interpreter = Interpreter::new();
        let original = net(vec![
            Guard::new(var("a"), Inscription::constant(3)),
            Guard::new(var("b"), Inscription::constant(5)),
            Guard::new(var("a"), var("b")),
        ]);

        assert!(matches!(optimize(&original, &mut interpreter), Err(Error::ConstantConflict(_))));
    }

    // A chain of equalities is resolved by a single pass, a second pass changes nothing.
    #[test]
    fn chained_equalities_single_pass()
    {
        let mut interpreter = Interpreter::new();
        let original = net(vec![
            Guard::new(var("a"), var("b")),
            Guard::new(var("b"), var("c")),
            Guard::new(var("c"), Inscription::constant(2)),
        ]);

        let once = optimize(&original, &mut interpreter).unwrap();
        let input = once.net.input(&"t1").unwrap();
        assert_eq!(input[&"p1"], vec![Inscription::constant(2), Inscription::constant(2)]);
        assert_eq!(input[&"p2"], vec![Inscription::constant(2)]);
        assert!(once.net.guards(&"t1").is_empty());

        let twice = optimize(&once.net, &mut interpreter).unwrap();
        assert_eq!(twice.net, once.net);

        let fixpoint = optimize_to_fixpoint(&original, &mut interpreter).unwrap();
        assert_eq!(fixpoint.net, once.net);

        // All three variables are restored from the constant.
        let restored = once.restore(&"t1", &Binding::new(), &mut interpreter).unwrap();
        assert_eq!(restored.values().collect::<Vec<_>>(), vec![&Value::Int(2); 3]);
    }

    #[test]
    fn malformed_expression()
    {
        let mut interpreter = Interpreter::new();
        let original = net(vec![
            Guard::new(var("a"), var("c")),
            Guard::new(Inscription::expr("a +"), Inscription::constant(1)),
        ]);

        assert!(matches!(optimize(&original, &mut interpreter), Err(Error::Evaluation(EvaluationError::Parse { .. }))));
    }

    // A propagated string constant is written into the output expression and read back when firing.
    #[test]
    fn quoted_string_constant()
    {
        let net = NetBuilder::new(["p1", "p2"])
            .transition("t1", vec![
                ArcSpec::input("p1", vec![var("x")]),
                ArcSpec::output("p2", vec![Inscription::expr(r#"x + "!""#)]),
            ], vec![Guard::new(var("x"), Inscription::constant(r#"say "hi""#))])
            .build()
            .unwrap();
        let initial = net.marking([("p1", [Value::from(r#"say "hi""#)].into_iter().collect())]).unwrap();

        let mut session = Session::new();
        let optimized = session.optimize(&net).unwrap();
        assert_eq!(optimized.net.output(&"t1").unwrap()[&"p2"], vec![Inscription::expr(r#"("say \"hi\"" + "!")"#)]);

        let successors: Vec<Marking<&str>> = session.successors(&optimized.net, &"t1", &initial).unwrap();
        assert_eq!(successors.len(), 1);
        let expected: Multiset<Value> = [Value::from(r#"say "hi"!"#)].into_iter().collect();
        assert_eq!(successors[0][&"p2"], expected);

        let states = session.explore(&net, &initial, &ExplorationConfig::default()).unwrap();
        assert_eq!(states.len(), 2);
    }

    // An equality with a variable that is not an identifier eliminates that variable.
    #[test]
    fn equality_with_non_identifier()
    {
        let mut interpreter = Interpreter::new();
        let net = NetBuilder::new(["p1", "p2"])
            .transition("t1", vec![
                ArcSpec::input("p1", vec![var("c"), var("a b")]),
                ArcSpec::output("p2", vec![Inscription::expr("c + 1")]),
            ], vec![Guard::new(var("c"), var("a b"))])
            .build()
            .unwrap();

        let optimized = optimize(&net, &mut interpreter).unwrap();
        assert_eq!(optimized.net.input(&"t1").unwrap()[&"p1"], vec![var("c"), var("c")]);
        assert_eq!(optimized.net.output(&"t1").unwrap()[&"p2"], vec![Inscription::expr("c + 1")]);
        assert_eq!(optimized.eliminated(&"t1"), &[(Variable::new("a b"), var("c"))]);
    }
}
