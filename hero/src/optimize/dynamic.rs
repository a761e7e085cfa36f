use std::collections::BTreeMap;

use crate::{Inscription, Label, Marking, Net, StructuralError, Variable};

/// A transition at a marking after the literal tokens on its input arcs have been consumed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prepared<P: Ord>
{
    /// Per input place, the variables of the remaining inscriptions. Places without variables are left out.
    pub input: BTreeMap<P, Vec<Variable>>,
    /// The marking without the consumed literal tokens.
    pub marking: Marking<P>,
}

/// Consumes the literal constants on the input arcs of the transition from a copy of the marking.
///
/// Returns None when one of the literals is not available, then the transition
/// is disabled regardless of its other arcs and guards.
pub fn optimize_for_marking<P: Label, T: Label>(net: &Net<P, T>, transition: &T, marking: &Marking<P>) -> Result<Option<Prepared<P>>, StructuralError>
{
    let arcs = net.input(transition).ok_or_else(|| StructuralError::UnknownTransition(format!("{:?}", transition)))?;

    let mut working = marking.clone();
    let mut input = BTreeMap::new();

    for (place, inscriptions) in arcs
    {
        let content = working.get_mut(place).ok_or_else(|| StructuralError::UnknownPlace(format!("{:?}", place)))?;

        let mut variables = Vec::new();
        for inscription in inscriptions
        {
            match inscription {
                Inscription::Constant(value) => {
                    if content.remove(value, 1) == 0 {
                        return Ok(None);
                    }
                },
                Inscription::Variable(variable) => variables.push(variable.clone()),
                Inscription::Expression(text) => {
                    return Err(StructuralError::ExpressionOnInputArc {
                        place: format!("{:?}", place),
                        transition: format!("{:?}", transition),
                        expression: text.clone(),
                    });
                },
            }
        }

        if !variables.is_empty() {
            input.insert(place.clone(), variables);
        }
    }

    Ok(Some(Prepared { input, marking: working }))
}

#[cfg(test)]
mod tests
{
    use super::*;

    use crate::{ArcSpec, Multiset, NetBuilder, Value};

    fn net() -> Net<&'static str, &'static str>
    {
        NetBuilder::new(["p1", "p2"])
            .transition("t1", vec![
                ArcSpec::input("p1", vec![Inscription::constant(1), Inscription::var("x"), Inscription::constant(1)]),
                ArcSpec::input("p2", vec![Inscription::constant("a")]),
            ], vec![])
            .build()
            .unwrap()
    }

    fn tokens(values: &[i64]) -> Multiset<Value>
    {
        values.iter().map(|v| Value::Int(*v)).collect()
    }

    #[test]
    fn literals_are_consumed()
    {
        let net = net();
        let marking = net.marking([
            ("p1", tokens(&[1, 1, 1, 2])),
            ("p2", [Value::from("a")].into_iter().collect()),
        ]).unwrap();

        let prepared = optimize_for_marking(&net, &"t1", &marking).unwrap().unwrap();
        assert_eq!(prepared.input, BTreeMap::from([("p1", vec![Variable::new("x")])]));
        assert_eq!(prepared.marking[&"p1"], tokens(&[1, 2]));
        assert!(prepared.marking[&"p2"].is_empty());

        // The marking of the caller is left untouched.
        assert_eq!(marking[&"p1"].len(), 4);
    }

    #[test]
    fn missing_literal_disables()
    {
        let net = net();

        // Only one occurrence of 1, but two are required.
        let marking = net.marking([
            ("p1", tokens(&[1, 2, 3])),
            ("p2", [Value::from("a")].into_iter().collect()),
        ]).unwrap();
        assert_eq!(optimize_for_marking(&net, &"t1", &marking), Ok(None));

        let marking = net.marking([("p1", tokens(&[1, 1, 2]))]).unwrap();
        assert_eq!(optimize_for_marking(&net, &"t1", &marking), Ok(None));
    }

    #[test]
    fn unknown_transition()
    {
        let net = net();
        let marking = net.marking([]).unwrap();
        assert!(matches!(optimize_for_marking(&net, &"t9", &marking), Err(StructuralError::UnknownTransition(_))));
    }
}
