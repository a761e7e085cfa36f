use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::{EvaluationError, Evaluator, Value};

/// A variable of a transition. Variables of different transitions are unrelated, even when their names coincide.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(String);

impl Variable
{
    pub fn new(name: impl Into<String>) -> Self
    {
        Variable(name.into())
    }

    pub fn name(&self) -> &str
    {
        &self.0
    }
}

impl fmt::Display for Variable
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Variable
{
    fn from(name: &str) -> Self
    {
        Variable::new(name)
    }
}

/// An assignment of values to (some of) the variables of a transition.
pub type Binding = BTreeMap<Variable, Value>;

/// The label of an arc, or one side of a guard.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Inscription
{
    Variable(Variable),
    Constant(Value),
    Expression(String),
}

impl Inscription
{
    pub fn var(name: &str) -> Self
    {
        Inscription::Variable(Variable::new(name))
    }

    pub fn constant(value: impl Into<Value>) -> Self
    {
        Inscription::Constant(value.into())
    }

    pub fn expr(text: impl Into<String>) -> Self
    {
        Inscription::Expression(text.into())
    }

    /// Returns the variables that this inscription refers to.
    pub fn variables(&self, evaluator: &mut impl Evaluator) -> Result<BTreeSet<Variable>, EvaluationError>
    {
        match self {
            Inscription::Variable(variable) => Ok(BTreeSet::from([variable.clone()])),
            Inscription::Constant(_) => Ok(BTreeSet::new()),
            Inscription::Expression(text) => evaluator.variables(text),
        }
    }

    /// Returns the value of this inscription under the given binding.
    pub fn evaluate(&self, binding: &Binding, evaluator: &mut impl Evaluator) -> Result<Value, EvaluationError>
    {
        match self {
            Inscription::Variable(variable) => binding.get(variable)
                .cloned()
                .ok_or_else(|| EvaluationError::UnboundVariable(variable.clone())),
            Inscription::Constant(value) => Ok(value.clone()),
            Inscription::Expression(text) => evaluator.evaluate(text, binding),
        }
    }

    /// Replaces every occurrence of variable by the replacement.
    pub fn substitute(&self, variable: &Variable, replacement: &Inscription, evaluator: &mut impl Evaluator) -> Result<Inscription, EvaluationError>
    {
        match self {
            Inscription::Variable(name) if name == variable => Ok(replacement.clone()),
            Inscription::Variable(_) | Inscription::Constant(_) => Ok(self.clone()),
            Inscription::Expression(text) => {
                Ok(Inscription::Expression(evaluator.substitute(text, variable, replacement)?))
            }
        }
    }
}

impl fmt::Display for Inscription
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Inscription::Variable(variable) => write!(f, "{}", variable),
            Inscription::Constant(value) => write!(f, "{}", value),
            Inscription::Expression(text) => write!(f, "{}", text),
        }
    }
}

/// An equality constraint between two inscriptions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Guard
{
    pub left: Inscription,
    pub right: Inscription,
}

impl Guard
{
    pub fn new(left: Inscription, right: Inscription) -> Self
    {
        Guard { left, right }
    }

    /// Returns the variables that either side of the guard refers to.
    pub fn variables(&self, evaluator: &mut impl Evaluator) -> Result<BTreeSet<Variable>, EvaluationError>
    {
        let mut result = self.left.variables(evaluator)?;
        result.extend(self.right.variables(evaluator)?);
        Ok(result)
    }

    /// Returns true iff both sides evaluate to the same value. Textually identical sides are equal without evaluation.
    pub fn holds(&self, binding: &Binding, evaluator: &mut impl Evaluator) -> Result<bool, EvaluationError>
    {
        if self.left.to_string() == self.right.to_string() {
            return Ok(true);
        }

        Ok(self.left.evaluate(binding, evaluator)? == self.right.evaluate(binding, evaluator)?)
    }

    pub fn substitute(&self, variable: &Variable, replacement: &Inscription, evaluator: &mut impl Evaluator) -> Result<Guard, EvaluationError>
    {
        Ok(Guard {
            left: self.left.substitute(variable, replacement, evaluator)?,
            right: self.right.substitute(variable, replacement, evaluator)?,
        })
    }
}

impl fmt::Display for Guard
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{} = {}", self.left, self.right)
    }
}
