use cancel_this::Cancelled;
use thiserror::Error;

use crate::{Value, Variable};

/// The direction of an arc relative to its transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction
{
    Input,
    Output,
}

/// A net that cannot be built. Places and transitions are reported with their debug representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError
{
    #[error("duplicate {direction:?} arc between place {place} and transition {transition}")]
    DuplicateArc {
        place: String,
        transition: String,
        direction: Direction,
    },
    #[error("transition {0} is declared more than once")]
    DuplicateTransition(String),
    #[error("place {0} is not part of the net")]
    UnknownPlace(String),
    #[error("transition {0} is not part of the net")]
    UnknownTransition(String),
    #[error("input arc from place {place} to transition {transition} carries expression `{expression}`")]
    ExpressionOnInputArc {
        place: String,
        transition: String,
        expression: String,
    },
}

/// Two guards of one transition assign different constants to the same variable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transition {transition} assigns both {first} and {second} to variable {variable}")]
pub struct ConstantConflict
{
    pub transition: String,
    pub variable: Variable,
    pub first: Value,
    pub second: Value,
}

/// Failures of the expression interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError
{
    #[error("cannot parse `{expression}`: {reason}")]
    Parse {
        expression: String,
        reason: String,
    },
    #[error("variable {0} is not bound")]
    UnboundVariable(Variable),
    #[error("variable `{0}` cannot be written in an expression")]
    NotAnIdentifier(Variable),
    #[error("operator `{operator}` cannot be applied to {found}")]
    TypeMismatch {
        operator: String,
        found: String,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    Overflow,
}

/// Every error that the library can report.
#[derive(Debug, Error)]
pub enum Error
{
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    ConstantConflict(#[from] ConstantConflict),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error("exploration cancelled: {0:?}")]
    Cancelled(Cancelled),
}

impl From<Cancelled> for Error
{
    fn from(value: Cancelled) -> Self
    {
        Error::Cancelled(value)
    }
}
