use std::fmt;

/// A token, or the result of evaluating an inscription.
///
/// Values are totally ordered so that they can label the branches of a
/// decision diagram node in a canonical order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value
{
    /// The black token.
    Dot,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Value
{
    /// Returns the name of the kind of value, used in error messages.
    pub fn kind(&self) -> &'static str
    {
        match self {
            Value::Dot => "dot",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
        }
    }
}

// Values print as the literal that the expression parser reads back.
impl fmt::Display for Value
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Value::Dot => write!(f, "()"),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Int(value) => write!(f, "{}", value),
            Value::Str(value) => {
                write!(f, "\"")?;
                for c in value.chars()
                {
                    if c == '"' || c == '\\' {
                        write!(f, "\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                write!(f, "\"")
            },
        }
    }
}

impl From<i64> for Value
{
    fn from(value: i64) -> Self
    {
        Value::Int(value)
    }
}

impl From<bool> for Value
{
    fn from(value: bool) -> Self
    {
        Value::Bool(value)
    }
}

impl From<&str> for Value
{
    fn from(value: &str) -> Self
    {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value
{
    fn from(value: String) -> Self
    {
        Value::Str(value)
    }
}

impl From<()> for Value
{
    fn from(_: ()) -> Self
    {
        Value::Dot
    }
}
