//! The expression language used in guards and on output arcs.
//!
//! Expressions are parsed with `nom` into an [Expression] tree. The grammar,
//! from the loosest to the tightest binding operator, is
//!
//! ```text
//! or         := and ("||" and)*
//! and        := comparison ("&&" comparison)*
//! comparison := additive (("==" | "!=" | "<=" | ">=" | "<" | ">") additive)?
//! additive   := multiplicative (("+" | "-") multiplicative)*
//! multiplicative := unary (("*" | "/" | "%") unary)*
//! unary      := atom | "-" unary | "!" unary
//! atom       := "()" | integer | "true" | "false" | string | identifier | "(" or ")"
//! string     := "\"" (char | "\\\"" | "\\\\")* "\""
//! ```
//!
//! All binary operators are left associative, comparisons do not chain.
//! Quotes and backslashes in strings are escaped by a backslash.

use std::collections::BTreeSet;
use std::fmt;

use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not, tag};
use nom::character::complete::{alpha1, alphanumeric1, char, digit1, multispace0};
use nom::combinator::{all_consuming, map, map_res, opt, recognize, value};
use nom::multi::{fold_many0, many0_count};
use nom::sequence::{delimited, pair, preceded};
use nom::{IResult, Parser};
use rustc_hash::FxHashMap;

use crate::{Binding, EvaluationError, Inscription, Value, Variable};

/// The interface of the expression interpreter as used by the optimizers, the binding engine and firing.
pub trait Evaluator
{
    /// Evaluates the expression, every variable it refers to must be bound.
    fn evaluate(&mut self, expression: &str, binding: &Binding) -> Result<Value, EvaluationError>;

    /// Returns the variables that the expression refers to.
    fn variables(&mut self, expression: &str) -> Result<BTreeSet<Variable>, EvaluationError>;

    /// Returns the text of the expression where every occurrence of variable is replaced.
    fn substitute(&mut self, expression: &str, variable: &Variable, replacement: &Inscription) -> Result<String, EvaluationError>;
}

/// An [Evaluator] that caches the parsed expressions.
#[derive(Default)]
pub struct Interpreter
{
    cache: FxHashMap<String, Expression>,
}

impl Interpreter
{
    pub fn new() -> Self
    {
        Self::default()
    }

    fn parsed(&mut self, text: &str) -> Result<&Expression, EvaluationError>
    {
        if !self.cache.contains_key(text) {
            let expression = Expression::parse(text)?;
            self.cache.insert(text.to_string(), expression);
        }

        self.cache.get(text).ok_or_else(|| EvaluationError::Parse {
            expression: text.to_string(),
            reason: "missing from the cache".to_string(),
        })
    }
}

impl Evaluator for Interpreter
{
    fn evaluate(&mut self, expression: &str, binding: &Binding) -> Result<Value, EvaluationError>
    {
        self.parsed(expression)?.evaluate(binding)
    }

    fn variables(&mut self, expression: &str) -> Result<BTreeSet<Variable>, EvaluationError>
    {
        Ok(self.parsed(expression)?.variables())
    }

    fn substitute(&mut self, expression: &str, variable: &Variable, replacement: &Inscription) -> Result<String, EvaluationError>
    {
        if !self.parsed(expression)?.variables().contains(variable) {
            return Ok(expression.to_string());
        }

        let replacement = match replacement {
            Inscription::Variable(name) if !is_identifier(name.name()) => {
                return Err(EvaluationError::NotAnIdentifier(name.clone()));
            },
            Inscription::Variable(name) => Expression::Variable(name.clone()),
            Inscription::Constant(value) => Expression::Literal(value.clone()),
            Inscription::Expression(text) => self.parsed(text)?.clone(),
        };

        Ok(self.parsed(expression)?.substitute(variable, &replacement).to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOperator
{
    Negate,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator
{
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

impl fmt::Display for BinaryOperator
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let symbol = match self {
            BinaryOperator::Or => "||",
            BinaryOperator::And => "&&",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression
{
    Literal(Value),
    Variable(Variable),
    Unary(UnaryOperator, Box<Expression>),
    Binary(BinaryOperator, Box<Expression>, Box<Expression>),
}

impl Expression
{
    pub fn parse(text: &str) -> Result<Expression, EvaluationError>
    {
        match all_consuming(ws(or)).parse(text) {
            Ok((_, expression)) => Ok(expression),
            Err(error) => Err(EvaluationError::Parse {
                expression: text.to_string(),
                reason: error.to_string(),
            }),
        }
    }

    pub fn evaluate(&self, binding: &Binding) -> Result<Value, EvaluationError>
    {
        match self {
            Expression::Literal(value) => Ok(value.clone()),
            Expression::Variable(variable) => binding.get(variable)
                .cloned()
                .ok_or_else(|| EvaluationError::UnboundVariable(variable.clone())),
            Expression::Unary(operator, operand) => {
                match (operator, operand.evaluate(binding)?) {
                    (UnaryOperator::Negate, Value::Int(x)) => x.checked_neg().map(Value::Int).ok_or(EvaluationError::Overflow),
                    (UnaryOperator::Not, Value::Bool(x)) => Ok(Value::Bool(!x)),
                    (operator, value) => Err(EvaluationError::TypeMismatch {
                        operator: format!("{:?}", operator),
                        found: value.kind().to_string(),
                    }),
                }
            },
            Expression::Binary(BinaryOperator::And, left, right) => {
                if expect_bool(BinaryOperator::And, left.evaluate(binding)?)? {
                    Ok(Value::Bool(expect_bool(BinaryOperator::And, right.evaluate(binding)?)?))
                } else {
                    Ok(Value::Bool(false))
                }
            },
            Expression::Binary(BinaryOperator::Or, left, right) => {
                if expect_bool(BinaryOperator::Or, left.evaluate(binding)?)? {
                    Ok(Value::Bool(true))
                } else {
                    Ok(Value::Bool(expect_bool(BinaryOperator::Or, right.evaluate(binding)?)?))
                }
            },
            Expression::Binary(operator, left, right) => {
                apply(*operator, left.evaluate(binding)?, right.evaluate(binding)?)
            },
        }
    }

    /// Returns the variables occurring in the expression.
    pub fn variables(&self) -> BTreeSet<Variable>
    {
        let mut result = BTreeSet::new();
        self.collect_variables(&mut result);
        result
    }

    fn collect_variables(&self, result: &mut BTreeSet<Variable>)
    {
        match self {
            Expression::Literal(_) => {},
            Expression::Variable(variable) => {
                result.insert(variable.clone());
            },
            Expression::Unary(_, operand) => operand.collect_variables(result),
            Expression::Binary(_, left, right) => {
                left.collect_variables(result);
                right.collect_variables(result);
            },
        }
    }

    /// Replaces every occurrence of variable by the replacement.
    pub fn substitute(&self, variable: &Variable, replacement: &Expression) -> Expression
    {
        match self {
            Expression::Variable(name) if name == variable => replacement.clone(),
            Expression::Literal(_) | Expression::Variable(_) => self.clone(),
            Expression::Unary(operator, operand) => {
                Expression::Unary(*operator, Box::new(operand.substitute(variable, replacement)))
            },
            Expression::Binary(operator, left, right) => Expression::Binary(
                *operator,
                Box::new(left.substitute(variable, replacement)),
                Box::new(right.substitute(variable, replacement)),
            ),
        }
    }
}

// Compound expressions are fully parenthesized so that the text parses back to the same tree.
impl fmt::Display for Expression
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Variable(variable) => write!(f, "{}", variable),
            Expression::Unary(UnaryOperator::Negate, operand) => write!(f, "(- {})", operand),
            Expression::Unary(UnaryOperator::Not, operand) => write!(f, "(! {})", operand),
            Expression::Binary(operator, left, right) => write!(f, "({} {} {})", left, operator, right),
        }
    }
}

fn expect_bool(operator: BinaryOperator, value: Value) -> Result<bool, EvaluationError>
{
    match value {
        Value::Bool(x) => Ok(x),
        other => Err(EvaluationError::TypeMismatch {
            operator: operator.to_string(),
            found: other.kind().to_string(),
        }),
    }
}

fn apply(operator: BinaryOperator, left: Value, right: Value) -> Result<Value, EvaluationError>
{
    use BinaryOperator::*;

    match (operator, left, right) {
        (Equal, x, y) => Ok(Value::Bool(x == y)),
        (NotEqual, x, y) => Ok(Value::Bool(x != y)),
        (Less, Value::Int(x), Value::Int(y)) => Ok(Value::Bool(x < y)),
        (LessEqual, Value::Int(x), Value::Int(y)) => Ok(Value::Bool(x <= y)),
        (Greater, Value::Int(x), Value::Int(y)) => Ok(Value::Bool(x > y)),
        (GreaterEqual, Value::Int(x), Value::Int(y)) => Ok(Value::Bool(x >= y)),
        (Less, Value::Str(x), Value::Str(y)) => Ok(Value::Bool(x < y)),
        (LessEqual, Value::Str(x), Value::Str(y)) => Ok(Value::Bool(x <= y)),
        (Greater, Value::Str(x), Value::Str(y)) => Ok(Value::Bool(x > y)),
        (GreaterEqual, Value::Str(x), Value::Str(y)) => Ok(Value::Bool(x >= y)),
        (Add, Value::Int(x), Value::Int(y)) => x.checked_add(y).map(Value::Int).ok_or(EvaluationError::Overflow),
        (Add, Value::Str(x), Value::Str(y)) => Ok(Value::Str(x + &y)),
        (Subtract, Value::Int(x), Value::Int(y)) => x.checked_sub(y).map(Value::Int).ok_or(EvaluationError::Overflow),
        (Multiply, Value::Int(x), Value::Int(y)) => x.checked_mul(y).map(Value::Int).ok_or(EvaluationError::Overflow),
        (Divide | Remainder, Value::Int(_), Value::Int(0)) => Err(EvaluationError::DivisionByZero),
        (Divide, Value::Int(x), Value::Int(y)) => x.checked_div(y).map(Value::Int).ok_or(EvaluationError::Overflow),
        (Remainder, Value::Int(x), Value::Int(y)) => x.checked_rem(y).map(Value::Int).ok_or(EvaluationError::Overflow),
        (operator, x, y) => Err(EvaluationError::TypeMismatch {
            operator: operator.to_string(),
            found: format!("{} and {}", x.kind(), y.kind()),
        }),
    }
}

// Surrounds a parser with optional whitespace.
fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
    where F: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
{
    delimited(multispace0, inner, multispace0)
}

fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Expression
{
    Expression::Binary(operator, Box::new(left), Box::new(right))
}

fn or(input: &str) -> IResult<&str, Expression>
{
    let (input, first) = and(input)?;
    fold_many0(
        preceded(ws(tag("||")), and),
        move || first.clone(),
        |left, right| binary(BinaryOperator::Or, left, right),
    ).parse(input)
}

fn and(input: &str) -> IResult<&str, Expression>
{
    let (input, first) = comparison(input)?;
    fold_many0(
        preceded(ws(tag("&&")), comparison),
        move || first.clone(),
        |left, right| binary(BinaryOperator::And, left, right),
    ).parse(input)
}

fn comparison(input: &str) -> IResult<&str, Expression>
{
    let operator = alt((
        map(tag("=="), |_| BinaryOperator::Equal),
        map(tag("!="), |_| BinaryOperator::NotEqual),
        map(tag("<="), |_| BinaryOperator::LessEqual),
        map(tag(">="), |_| BinaryOperator::GreaterEqual),
        map(tag("<"), |_| BinaryOperator::Less),
        map(tag(">"), |_| BinaryOperator::Greater),
    ));

    map(
        pair(additive, opt(pair(ws(operator), additive))),
        |(left, rest)| match rest {
            Some((operator, right)) => binary(operator, left, right),
            None => left,
        },
    ).parse(input)
}

fn additive(input: &str) -> IResult<&str, Expression>
{
    let operator = alt((
        map(char('+'), |_| BinaryOperator::Add),
        map(char('-'), |_| BinaryOperator::Subtract),
    ));

    let (input, first) = multiplicative(input)?;
    fold_many0(
        pair(ws(operator), multiplicative),
        move || first.clone(),
        |left, (operator, right)| binary(operator, left, right),
    ).parse(input)
}

fn multiplicative(input: &str) -> IResult<&str, Expression>
{
    let operator = alt((
        map(char('*'), |_| BinaryOperator::Multiply),
        map(char('/'), |_| BinaryOperator::Divide),
        map(char('%'), |_| BinaryOperator::Remainder),
    ));

    let (input, first) = unary(input)?;
    fold_many0(
        pair(ws(operator), unary),
        move || first.clone(),
        |left, (operator, right)| binary(operator, left, right),
    ).parse(input)
}

fn unary(input: &str) -> IResult<&str, Expression>
{
    alt((
        atom,
        map(preceded(ws(char('-')), unary), |operand| Expression::Unary(UnaryOperator::Negate, Box::new(operand))),
        map(preceded(ws(char('!')), unary), |operand| Expression::Unary(UnaryOperator::Not, Box::new(operand))),
    )).parse(input)
}

fn atom(input: &str) -> IResult<&str, Expression>
{
    ws(alt((
        map(tag("()"), |_| Expression::Literal(Value::Dot)),
        delimited(char('('), or, char(')')),
        map_res(recognize(pair(opt(char('-')), digit1)), |text: &str| {
            text.parse::<i64>().map(|value| Expression::Literal(Value::Int(value)))
        }),
        map(string, |text| Expression::Literal(Value::Str(text))),
        map(identifier, |name: &str| match name {
            "true" => Expression::Literal(Value::Bool(true)),
            "false" => Expression::Literal(Value::Bool(false)),
            _ => Expression::Variable(Variable::new(name)),
        }),
    ))).parse(input)
}

fn string(input: &str) -> IResult<&str, String>
{
    let contents = escaped_transform(
        is_not("\"\\"),
        '\\',
        alt((value('"', char('"')), value('\\', char('\\')))),
    );

    // The contents parser fails on the empty string.
    map(delimited(char('"'), opt(contents), char('"')), Option::unwrap_or_default).parse(input)
}

/// Returns true iff the name can occur as a variable in an expression.
pub fn is_identifier(name: &str) -> bool
{
    !matches!(name, "true" | "false") && all_consuming(identifier).parse(name).is_ok()
}

fn identifier(input: &str) -> IResult<&str, &str>
{
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    )).parse(input)
}
