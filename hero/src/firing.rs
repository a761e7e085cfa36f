use crate::{Arcs, Binding, Error, Evaluator, Label, Marking, Multiset, Net, StructuralError, Value};

/// Fires the transition under the binding, returns the successor marking.
///
/// Returns None if the binding requires more tokens than the marking
/// provides. The successor is only built after every input and output
/// inscription has been evaluated, so a failure never yields a partially
/// updated marking.
pub fn fire<P: Label, T: Label>(
    net: &Net<P, T>,
    transition: &T,
    marking: &Marking<P>,
    binding: &Binding,
    evaluator: &mut impl Evaluator,
) -> Result<Option<Marking<P>>, Error>
{
    net.check_transition(transition)?;

    let removed = evaluate_arcs(net.input(transition), binding, evaluator)?;
    for (place, tokens) in removed.iter()
    {
        let available = marking.get(place).ok_or_else(|| StructuralError::UnknownPlace(format!("{:?}", place)))?;
        if !tokens.is_subset(available) {
            return Ok(None);
        }
    }

    let added = evaluate_arcs(net.output(transition), binding, evaluator)?;

    let mut result = marking.clone();
    for (place, tokens) in removed
    {
        if let Some(content) = result.get_mut(place) {
            *content = content.difference(&tokens);
        }
    }

    for (place, tokens) in added
    {
        match result.get_mut(place) {
            Some(content) => *content = content.sum(&tokens),
            None => return Err(StructuralError::UnknownPlace(format!("{:?}", place)).into()),
        }
    }

    Ok(Some(result))
}

// Evaluates the inscriptions of every arc into the multiset of tokens they denote.
fn evaluate_arcs<'a, P: Label>(arcs: Option<&'a Arcs<P>>, binding: &Binding, evaluator: &mut impl Evaluator) -> Result<Vec<(&'a P, Multiset<Value>)>, Error>
{
    let mut result = Vec::new();
    for (place, inscriptions) in arcs.into_iter().flatten()
    {
        let mut tokens = Multiset::new();
        for inscription in inscriptions
        {
            tokens.insert(inscription.evaluate(binding, evaluator)?, 1);
        }

        result.push((place, tokens));
    }

    Ok(result)
}
