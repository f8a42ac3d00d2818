//! Rule string tokenizer

use crate::rule::ast::LogicOp;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Parentheses, or a maximal run of word characters. The keywords are split
/// out of the word runs afterwards so that `ORDERS` stays one word.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(|\)|[A-Za-z0-9_><=!']+").expect("token pattern is valid")
});

/// Lexical atom of a rule string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    OpenParen,
    CloseParen,
    Logic(LogicOp),
    /// Field name, comparison operator or literal; indistinguishable here
    Word(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::OpenParen => f.write_str("("),
            Token::CloseParen => f.write_str(")"),
            Token::Logic(op) => write!(f, "{}", op),
            Token::Word(word) => f.write_str(word),
        }
    }
}

/// Split a rule string into tokens, left to right
///
/// Total over all input: characters outside the token class act as
/// separators, so whitespace-only input yields no tokens at all.
pub fn tokenize(rule: &str) -> Vec<Token> {
    TOKEN_PATTERN
        .find_iter(rule)
        .map(|m| match m.as_str() {
            "(" => Token::OpenParen,
            ")" => Token::CloseParen,
            "AND" => Token::Logic(LogicOp::And),
            "OR" => Token::Logic(LogicOp::Or),
            word => Token::Word(word.to_string()),
        })
        .collect()
}
