//! Rule language module
//!
//! This module handles tokenizing and parsing rule strings like
//! "(age > 30) AND (department = 'Sales')", evaluating the resulting tree
//! against a record, and combining several trees into one.

mod ast;
pub mod cache;
mod combiner;
mod evaluator;
pub mod parser;
pub mod tokenizer;

#[cfg(test)]
mod property_tests;

pub use ast::*;
pub use cache::*;
pub use combiner::*;
pub use evaluator::*;
pub use parser::*;
