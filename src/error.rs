//! Error types for the eligibility rule engine
//!
//! Each stage of the pipeline has its own error enum so callers can tell a
//! structurally broken rule (parse time) from a rule that does not fit the
//! schema or the record (evaluation time).

use crate::rule::LogicOp;
use thiserror::Error;

/// Structural failures raised while turning rule text into a tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Rule is empty")]
    EmptyRule,

    #[error("Expected an operator (AND/OR) but found '{found}'")]
    MissingOperator { found: String },

    #[error("Expected a right operand after operator {operator}")]
    MissingRightOperand { operator: LogicOp },

    #[error("Expected closing parenthesis ')' but reached the end of the rule")]
    MissingClosingParen,

    #[error("Invalid operand format: '{token}'. Expected format: 'field operator value'.")]
    MalformedOperand { token: String },

    #[error("Unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("Cannot mix {first} and {second} without parentheses")]
    MixedOperators { first: LogicOp, second: LogicOp },

    #[error("Rule nesting exceeds the maximum depth of {limit}")]
    NestingTooDeep { limit: usize },
}

/// Semantic failures raised while applying a tree to a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("Invalid operand format: '{0}'. Expected format: 'field operator value'.")]
    MalformedOperand(String),

    #[error("Invalid field '{field}' in rule. Allowed fields are: {allowed}")]
    UnknownField { field: String, allowed: String },

    #[error("Field '{0}' not found in provided data.")]
    MissingField(String),

    #[error("Invalid value format: '{0}'. Must be a number or a string.")]
    InvalidLiteral(String),

    #[error("Cannot compare {actual} field '{field}' with {expected} literal using '{operator}'")]
    TypeMismatch {
        field: String,
        operator: String,
        actual: &'static str,
        expected: &'static str,
    },

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
}

/// Failures raised while folding several trees into one
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CombineError {
    #[error("No rules provided for combination.")]
    EmptyRuleSet,

    #[error("Unknown logical operator: {0}")]
    UnknownOperator(String),
}

/// Main error type for the rule engine
#[derive(Error, Debug)]
pub enum RuleEngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Combine(#[from] CombineError),

    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Evaluation task failed: {0}")]
    Task(String),
}

#[cfg(feature = "python")]
impl From<RuleEngineError> for pyo3::PyErr {
    fn from(err: RuleEngineError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};

        match err {
            RuleEngineError::RuleNotFound(name) => {
                PyKeyError::new_err(format!("Rule not found: {}", name))
            }
            RuleEngineError::Parse(_)
            | RuleEngineError::Eval(_)
            | RuleEngineError::Combine(_)
            | RuleEngineError::InvalidConfig(_)
            | RuleEngineError::Json(_) => PyValueError::new_err(err.to_string()),
            RuleEngineError::Logging(_) | RuleEngineError::Task(_) => {
                PyRuntimeError::new_err(err.to_string())
            }
        }
    }
}

/// Result type alias for the rule engine
pub type Result<T> = std::result::Result<T, RuleEngineError>;
