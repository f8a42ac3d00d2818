//! Rule engine module
//!
//! Ties rule text storage, the parse cache and the field schema together
//! behind named-rule operations.

mod rule_engine;

pub use rule_engine::*;
