//! Rule evaluator

use crate::config::FieldSchema;
use crate::error::EvalError;
use crate::rule::ast::Node;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Runs of comparison characters; an operand must contain exactly one
static COMPARISON_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[><=!]+").expect("comparison pattern is valid"));

/// Record field values, also used for parsed literals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

/// Key/value input a rule is evaluated against
pub type Record = HashMap<String, Value>;

/// Build a record from optional values; absent values are left out
///
/// A rule on a field whose value is null then fails with `MissingField`.
pub fn record_from_optional<I, K>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, Option<Value>)>,
    K: Into<String>,
{
    pairs
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field.into(), v)))
        .collect()
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Greater than (>)
    Greater,
    /// Less than (<)
    Less,
    /// Equal (=)
    Equal,
    /// Not equal (!=)
    NotEqual,
}

impl Comparison {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(Comparison::Greater),
            "<" => Some(Comparison::Less),
            "=" => Some(Comparison::Equal),
            "!=" => Some(Comparison::NotEqual),
            _ => None,
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "string",
        }
    }

    /// Quoted text becomes a string literal, anything else must be a number
    fn from_literal(literal: &str) -> Result<Self, EvalError> {
        if literal.len() >= 2 && literal.starts_with('\'') && literal.ends_with('\'') {
            return Ok(Value::Text(literal[1..literal.len() - 1].to_string()));
        }

        let parsed = if literal.contains('_') {
            strip_digit_separators(literal).and_then(|digits| digits.parse::<f64>().ok())
        } else {
            literal.parse::<f64>().ok()
        };
        parsed
            .map(Value::Number)
            .ok_or_else(|| EvalError::InvalidLiteral(literal.to_string()))
    }
}

/// Remove `_` separators, each of which must sit between two digits
fn strip_digit_separators(literal: &str) -> Option<String> {
    let mut digits = String::with_capacity(literal.len());
    let mut previous: Option<char> = None;
    let mut chars = literal.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' {
            let between_digits = previous.is_some_and(|p| p.is_ascii_digit())
                && chars.peek().is_some_and(char::is_ascii_digit);
            if !between_digits {
                return None;
            }
        } else {
            digits.push(c);
        }
        previous = Some(c);
    }
    Some(digits)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Evaluate an AST against a record
///
/// Both children of an operator node are always evaluated, so an error on
/// the right side surfaces even when the left side already decides the
/// result.
pub fn evaluate(node: &Node, record: &Record, schema: &FieldSchema) -> Result<bool, EvalError> {
    match node {
        Node::Operand { expression } => evaluate_operand(expression, record, schema),
        Node::Operator { op, left, right } => {
            let left_result = evaluate(left, record, schema)?;
            let right_result = evaluate(right, record, schema)?;
            tracing::trace!(
                operator = %op,
                left = left_result,
                right = right_result,
                "evaluated operator"
            );
            Ok(op.apply(left_result, right_result))
        }
    }
}

fn evaluate_operand(
    expression: &str,
    record: &Record,
    schema: &FieldSchema,
) -> Result<bool, EvalError> {
    let (field, symbol, literal) = split_operand(expression)?;

    if !schema.contains(field) {
        return Err(EvalError::UnknownField {
            field: field.to_string(),
            allowed: schema.describe(),
        });
    }

    let actual = record
        .get(field)
        .ok_or_else(|| EvalError::MissingField(field.to_string()))?;
    let expected = Value::from_literal(literal)?;

    tracing::trace!(field, operator = symbol, %expected, %actual, "evaluating operand");

    let comparison = Comparison::from_symbol(symbol)
        .ok_or_else(|| EvalError::UnknownOperator(symbol.to_string()))?;
    compare(field, symbol, actual, comparison, &expected)
}

/// Split "field op literal" around its single run of comparison characters
fn split_operand(expression: &str) -> Result<(&str, &str, &str), EvalError> {
    let mut runs = COMPARISON_PATTERN.find_iter(expression);

    match (runs.next(), runs.next()) {
        (Some(op), None) => Ok((
            expression[..op.start()].trim(),
            op.as_str(),
            expression[op.end()..].trim(),
        )),
        _ => Err(EvalError::MalformedOperand(expression.to_string())),
    }
}

fn compare(
    field: &str,
    symbol: &str,
    actual: &Value,
    comparison: Comparison,
    expected: &Value,
) -> Result<bool, EvalError> {
    match (actual, expected, comparison) {
        // Equality is defined across types: mismatched values are never equal
        (_, _, Comparison::Equal) => Ok(actual == expected),
        (_, _, Comparison::NotEqual) => Ok(actual != expected),

        (Value::Number(a), Value::Number(b), Comparison::Greater) => Ok(a > b),
        (Value::Number(a), Value::Number(b), Comparison::Less) => Ok(a < b),
        (Value::Text(a), Value::Text(b), Comparison::Greater) => Ok(a > b),
        (Value::Text(a), Value::Text(b), Comparison::Less) => Ok(a < b),

        _ => Err(EvalError::TypeMismatch {
            field: field.to_string(),
            operator: symbol.to_string(),
            actual: actual.type_name(),
            expected: expected.type_name(),
        }),
    }
}
