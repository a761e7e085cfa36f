use ahash::AHashSet;
use kdd::{Kdd, Storage};

use crate::{Binding, Error, ExplorationConfig, Interpreter, Key, Label, Marking, Net, Optimized, Value};

/// Owns the decision diagram storage and the expression interpreter of one computation.
///
/// Diagrams returned by a session are only meaningful for that session.
/// Sessions are independent of each other, so separate explorations can use
/// separate sessions.
///
/// The diagram storage of a session only grows: nodes created by one call stay
/// allocated for later calls. Long running users should use a fresh session
/// per net.
#[derive(Default)]
pub struct Session
{
    storage: Storage<Key, Value>,
    interpreter: Interpreter,
}

impl Session
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// See [crate::optimize()].
    pub fn optimize<P: Label, T: Label>(&mut self, net: &Net<P, T>) -> Result<Optimized<P, T>, Error>
    {
        crate::optimize(net, &mut self.interpreter)
    }

    /// See [crate::enabled_bindings].
    pub fn enabled_bindings<P: Label, T: Label>(&mut self, net: &Net<P, T>, transition: &T, marking: &Marking<P>) -> Result<Kdd, Error>
    {
        crate::enabled_bindings(&mut self.storage, &mut self.interpreter, net, transition, marking)
    }

    /// Returns the bindings of a diagram returned by [Session::enabled_bindings]. Every call starts from the first binding.
    pub fn bindings(&self, kdd: Kdd) -> impl Iterator<Item = Binding> + '_
    {
        crate::bindings(&self.storage, kdd)
    }

    /// Returns the number of bindings of the diagram.
    pub fn count(&mut self, kdd: Kdd) -> usize
    {
        kdd::len(&mut self.storage, kdd)
    }

    /// Returns true iff the transition has at least one enabled binding, without enumerating them.
    pub fn is_enabled<P: Label, T: Label>(&mut self, net: &Net<P, T>, transition: &T, marking: &Marking<P>) -> Result<bool, Error>
    {
        let root = self.enabled_bindings(net, transition, marking)?;
        Ok(root != self.storage.empty_set())
    }

    /// See [crate::fire].
    pub fn fire<P: Label, T: Label>(&mut self, net: &Net<P, T>, transition: &T, marking: &Marking<P>, binding: &Binding) -> Result<Option<Marking<P>>, Error>
    {
        crate::fire(net, transition, marking, binding, &mut self.interpreter)
    }

    /// See [crate::explore].
    pub fn explore<P: Label, T: Label>(&mut self, net: &Net<P, T>, initial: &Marking<P>, config: &ExplorationConfig) -> Result<AHashSet<Marking<P>>, Error>
    {
        crate::explore(&mut self.storage, &mut self.interpreter, net, initial, config)
    }

    /// Returns the successors of the marking by every enabled binding of the transition.
    pub fn successors<P: Label, T: Label>(&mut self, net: &Net<P, T>, transition: &T, marking: &Marking<P>) -> Result<Vec<Marking<P>>, Error>
    {
        let root = self.enabled_bindings(net, transition, marking)?;

        // Split the borrow, the storage is iterated while the interpreter evaluates.
        let Session { storage, interpreter } = self;

        let mut result = Vec::new();
        for binding in crate::bindings(storage, root)
        {
            if let Some(successor) = crate::fire(net, transition, marking, &binding, interpreter)? {
                result.push(successor);
            }
        }

        Ok(result)
    }

    /// Returns the diagram storage, for instance to inspect its size.
    pub fn storage(&self) -> &Storage<Key, Value>
    {
        &self.storage
    }

    pub fn interpreter(&mut self) -> &mut Interpreter
    {
        &mut self.interpreter
    }
}
