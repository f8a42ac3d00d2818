//! Eligibility Rules Core - boolean rule language for eligibility checks
//!
//! Rules such as `(age > 30) AND (department = 'Sales')` are tokenized,
//! parsed into a binary tree, evaluated against a record and combined with
//! other rules. Structure is validated when parsing; fields, operators and
//! literal types are validated when evaluating.
//!
//! With the `python` feature the engine is also exposed as a Python module
//! via PyO3.

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod rule;
pub mod store;

#[cfg(feature = "python")]
mod python;

pub use config::{EngineConfig, FieldSchema};
pub use engine::{CombinedRule, RuleEngine};
pub use error::{CombineError, EvalError, ParseError, Result, RuleEngineError};
pub use rule::{combine, evaluate, parse, render, LogicOp, Node, Record, Value};
pub use store::{MemoryRuleStore, RuleStore};
