use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::hash::Hash;

use crate::{Direction, Guard, Inscription, Marking, Multiset, StructuralError, Value, Variable};

/// The requirements on place and transition identifiers.
pub trait Label: Clone + Ord + Hash + Debug {}

impl<X: Clone + Ord + Hash + Debug> Label for X {}

/// The arcs of one transition, per place.
pub type Arcs<P> = BTreeMap<P, Vec<Inscription>>;

/// An arc declared while building a net.
#[derive(Clone, Debug)]
pub struct ArcSpec<P>
{
    pub place: P,
    pub direction: Direction,
    pub inscriptions: Vec<Inscription>,
}

impl<P> ArcSpec<P>
{
    /// An arc from the place to the transition, consuming the tokens of the inscriptions.
    pub fn input(place: P, inscriptions: Vec<Inscription>) -> Self
    {
        ArcSpec { place, direction: Direction::Input, inscriptions }
    }

    /// An arc from the transition to the place, producing the tokens of the inscriptions.
    pub fn output(place: P, inscriptions: Vec<Inscription>) -> Self
    {
        ArcSpec { place, direction: Direction::Output, inscriptions }
    }
}

/// Collects the declarations of a net, see [NetBuilder::build].
pub struct NetBuilder<P, T>
{
    places: BTreeSet<P>,
    transitions: Vec<(T, Vec<ArcSpec<P>>, Vec<Guard>)>,
}

impl<P: Label, T: Label> NetBuilder<P, T>
{
    pub fn new(places: impl IntoIterator<Item = P>) -> Self
    {
        NetBuilder {
            places: places.into_iter().collect(),
            transitions: Vec::new(),
        }
    }

    /// Declares a transition with its arcs and guards.
    pub fn transition(mut self, transition: T, arcs: Vec<ArcSpec<P>>, guards: Vec<Guard>) -> Self
    {
        self.transitions.push((transition, arcs, guards));
        self
    }

    /// Returns the net, or the first structural problem of the declarations.
    pub fn build(self) -> Result<Net<P, T>, StructuralError>
    {
        let mut net = Net {
            places: self.places,
            transitions: BTreeSet::new(),
            input: BTreeMap::new(),
            output: BTreeMap::new(),
            guards: BTreeMap::new(),
        };

        for (transition, arcs, guards) in self.transitions
        {
            if !net.transitions.insert(transition.clone()) {
                return Err(StructuralError::DuplicateTransition(format!("{:?}", transition)));
            }

            let mut input = Arcs::new();
            let mut output = Arcs::new();
            for arc in arcs
            {
                if !net.places.contains(&arc.place) {
                    return Err(StructuralError::UnknownPlace(format!("{:?}", arc.place)));
                }

                if arc.direction == Direction::Input {
                    if let Some(Inscription::Expression(text)) = arc.inscriptions.iter().find(|i| matches!(i, Inscription::Expression(_))) {
                        return Err(StructuralError::ExpressionOnInputArc {
                            place: format!("{:?}", arc.place),
                            transition: format!("{:?}", transition),
                            expression: text.clone(),
                        });
                    }
                }

                let target = match arc.direction {
                    Direction::Input => &mut input,
                    Direction::Output => &mut output,
                };

                if target.contains_key(&arc.place) {
                    return Err(StructuralError::DuplicateArc {
                        place: format!("{:?}", arc.place),
                        transition: format!("{:?}", transition),
                        direction: arc.direction,
                    });
                }

                target.insert(arc.place, arc.inscriptions);
            }

            net.input.insert(transition.clone(), input);
            net.output.insert(transition.clone(), output);
            net.guards.insert(transition, guards);
        }

        Ok(net)
    }
}

/// A Hero net. Nets are immutable, the optimizers return new nets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Net<P, T>
{
    pub(crate) places: BTreeSet<P>,
    pub(crate) transitions: BTreeSet<T>,
    pub(crate) input: BTreeMap<T, Arcs<P>>,
    pub(crate) output: BTreeMap<T, Arcs<P>>,
    pub(crate) guards: BTreeMap<T, Vec<Guard>>,
}

impl<P: Label, T: Label> Net<P, T>
{
    pub fn places(&self) -> impl Iterator<Item = &P>
    {
        self.places.iter()
    }

    pub fn transitions(&self) -> impl Iterator<Item = &T>
    {
        self.transitions.iter()
    }

    /// Returns the input arcs of the transition, or None if the transition is not part of the net.
    pub fn input(&self, transition: &T) -> Option<&Arcs<P>>
    {
        self.input.get(transition)
    }

    /// Returns the output arcs of the transition, or None if the transition is not part of the net.
    pub fn output(&self, transition: &T) -> Option<&Arcs<P>>
    {
        self.output.get(transition)
    }

    pub fn guards(&self, transition: &T) -> &[Guard]
    {
        self.guards.get(transition).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the variables on the input arcs of the transition in declaration order, i.e., in the order of their first occurrence.
    pub fn input_variables(&self, transition: &T) -> Vec<Variable>
    {
        let mut result: Vec<Variable> = Vec::new();
        for inscriptions in self.input(transition).into_iter().flat_map(|arcs| arcs.values())
        {
            for inscription in inscriptions
            {
                if let Inscription::Variable(variable) = inscription {
                    if !result.contains(variable) {
                        result.push(variable.clone());
                    }
                }
            }
        }

        result
    }

    /// Returns the marking with the given tokens, places that are not mentioned are empty.
    pub fn marking(&self, tokens: impl IntoIterator<Item = (P, Multiset<Value>)>) -> Result<Marking<P>, StructuralError>
    {
        let mut result = Marking::empty(self.places.iter().cloned());
        for (place, multiset) in tokens
        {
            match result.get_mut(&place) {
                Some(content) => *content = content.sum(&multiset),
                None => return Err(StructuralError::UnknownPlace(format!("{:?}", place))),
            }
        }

        Ok(result)
    }

    pub(crate) fn check_transition(&self, transition: &T) -> Result<(), StructuralError>
    {
        if self.transitions.contains(transition) {
            Ok(())
        } else {
            Err(StructuralError::UnknownTransition(format!("{:?}", transition)))
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn places() -> Vec<&'static str>
    {
        vec!["p1", "p2"]
    }

    #[test]
    fn duplicate_arc()
    {
        let result = NetBuilder::new(places())
            .transition("t1", vec![
                ArcSpec::input("p1", vec![Inscription::var("x")]),
                ArcSpec::input("p1", vec![Inscription::var("y")]),
            ], vec![])
            .build();

        assert_eq!(result, Err(StructuralError::DuplicateArc {
            place: "\"p1\"".to_string(),
            transition: "\"t1\"".to_string(),
            direction: Direction::Input,
        }));
    }

    #[test]
    fn same_place_in_both_directions()
    {
        let net = NetBuilder::new(places())
            .transition("t1", vec![
                ArcSpec::input("p1", vec![Inscription::var("x")]),
                ArcSpec::output("p1", vec![Inscription::var("x")]),
            ], vec![])
            .build()
            .unwrap();

        assert_eq!(net.input(&"t1").unwrap().len(), 1);
        assert_eq!(net.output(&"t1").unwrap().len(), 1);
        assert!(net.guards(&"t1").is_empty());
    }

    #[test]
    fn structural_errors()
    {
        let unknown = NetBuilder::new(places())
            .transition("t1", vec![ArcSpec::input("p3", vec![])], vec![])
            .build();
        assert!(matches!(unknown, Err(StructuralError::UnknownPlace(_))));

        let twice = NetBuilder::<_, &str>::new(places())
            .transition("t1", vec![], vec![])
            .transition("t1", vec![], vec![])
            .build();
        assert!(matches!(twice, Err(StructuralError::DuplicateTransition(_))));

        let expression = NetBuilder::new(places())
            .transition("t1", vec![ArcSpec::input("p1", vec![Inscription::expr("x + 1")])], vec![])
            .build();
        assert!(matches!(expression, Err(StructuralError::ExpressionOnInputArc { .. })));
    }

    #[test]
    fn input_variables_in_declaration_order()
    {
        let net = NetBuilder::new(places())
            .transition("t1", vec![
                ArcSpec::input("p2", vec![Inscription::var("b"), Inscription::constant(1)]),
                ArcSpec::input("p1", vec![Inscription::var("c"), Inscription::var("a"), Inscription::var("c")]),
            ], vec![])
            .build()
            .unwrap();

        // Arcs are kept per place, so p1 comes first.
        assert_eq!(net.input_variables(&"t1"), vec![Variable::new("c"), Variable::new("a"), Variable::new("b")]);
    }

    #[test]
    fn total_marking()
    {
        let net = NetBuilder::<_, &str>::new(places()).build().unwrap();

        let marking = net.marking([("p1", [Value::Int(1)].into_iter().collect())]).unwrap();
        assert_eq!(marking[&"p1"].len(), 1);
        assert!(marking[&"p2"].is_empty());

        assert!(net.marking([("p9", Multiset::new())]).is_err());
    }
}
